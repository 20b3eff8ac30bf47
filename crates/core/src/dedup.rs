//! Drop East-Asian glyphs that the Latin font already provides.

use std::collections::BTreeSet;

use log::{debug, warn};
use wabun_font_ops::Font;

/// Codepoints rendered by glyphs that are worth outputting.
pub fn codepoints_worth_outputting(font: &Font) -> BTreeSet<u32> {
    font.glyphs()
        .iter()
        .filter(|glyph| glyph.is_worth_outputting())
        .flat_map(|glyph| glyph.codepoints())
        .collect()
}

/// Clear every glyph of `east_asian` whose codepoint is worth outputting in
/// `latin`. Codepoints outside the encoding range are skipped.
pub fn remove_duplicates(east_asian: &mut Font, latin: &Font) -> usize {
    let mut cleared = 0;
    for codepoint in codepoints_worth_outputting(latin) {
        match east_asian.glyph_index(codepoint) {
            Ok(Some(index)) => {
                if let Some(glyph) = east_asian.glyph_at_mut(index) {
                    glyph.clear();
                    cleared += 1;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("skipping codepoint: {e}"),
        }
    }
    debug!("cleared {cleared} duplicate glyphs");
    cleared
}

#[cfg(test)]
mod tests {
    use wabun_font_ops::{Glyph, Outline};

    use super::*;

    fn font(glyphs: &[(u32, bool)]) -> Font {
        let mut font = Font::new(1000);
        for &(codepoint, visible) in glyphs {
            let mut glyph = Glyph::new(format!("uni{codepoint:04X}"), Some(codepoint))
                .with_width(600)
                .with_outline(Outline::rect(0.0, 0.0, 500.0, 500.0));
            if !visible {
                glyph.clear();
            }
            font.push_glyph(glyph).unwrap();
        }
        font
    }

    fn visible(font: &Font) -> BTreeSet<u32> {
        codepoints_worth_outputting(font)
    }

    #[test]
    fn test_dedup_is_set_difference() {
        let latin = font(&[(0x41, true), (0x42, true), (0xA7, false)]);
        let mut east_asian = font(&[(0x41, true), (0xA7, true), (0x3042, true)]);
        let before = visible(&east_asian);

        assert_eq!(remove_duplicates(&mut east_asian, &latin), 1);

        let expected: BTreeSet<u32> = before.difference(&visible(&latin)).copied().collect();
        assert_eq!(visible(&east_asian), expected);
        assert_eq!(expected, BTreeSet::from([0xA7, 0x3042]));
    }

    #[test]
    fn test_missing_codepoints_are_ignored() {
        let latin = font(&[(0x41, true), (0x1F600, true)]);
        let mut east_asian = font(&[(0x3042, true)]);

        assert_eq!(remove_duplicates(&mut east_asian, &latin), 0);
        assert!(east_asian.glyph(0x3042).unwrap().is_worth_outputting());
    }
}
