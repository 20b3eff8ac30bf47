//! Turn alternate-unicode references into glyphs of their own.
//!
//! A glyph can render several codepoints through alternate-unicode entries
//! without owning an outline for each. Downstream merging wants one glyph per
//! codepoint, so every selector-less entry gets a real copy.

use log::debug;
use wabun_font_ops::{AltUnicode, Font, FontError, Result};

/// Materialize the selector-less alternates of every glyph. Returns the
/// number of glyphs written.
///
/// Entries are compared with the one immediately before them only; a repeat
/// further down the list is materialized again.
pub fn resolve_alt_unicodes(font: &mut Font) -> Result<usize> {
    let mut materialized = 0;

    // Glyphs created below never carry alternates, so the original count
    // bounds the scan.
    for index in 0..font.glyph_count() {
        let Some(glyph) = font.glyph_at(index) else { continue };
        if glyph.alt_unicodes().is_empty() {
            continue;
        }
        let entries = glyph.alt_unicodes().to_vec();
        let source = glyph.clone();

        let mut previous: Option<AltUnicode> = None;
        for entry in entries {
            if entry.selector.is_none() && previous != Some(entry) {
                if let Some(glyph) = font.glyph_at_mut(index) {
                    glyph.clear_alt_unicodes();
                }
                let target = materialize(font, entry.codepoint)?;
                if let Some(target) = font.glyph_at_mut(target) {
                    target.clear();
                    target.copy_from(&source);
                }
                materialized += 1;
            }
            previous = Some(entry);
        }
    }

    debug!("materialized {materialized} alternate-unicode glyphs");
    Ok(materialized)
}

/// Index of a fresh `uniXXXXcopy` glyph at `codepoint`, or of the glyph
/// already mapped there.
fn materialize(font: &mut Font, codepoint: u32) -> Result<usize> {
    match font.create_glyph(codepoint, format!("uni{codepoint:X}copy")) {
        Err(FontError::GlyphExists(_)) => font
            .glyph_index(codepoint)?
            .ok_or(FontError::GlyphExists(codepoint)),
        other => other,
    }
}
