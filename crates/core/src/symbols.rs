//! Symbols that read better in the East-Asian design in Japanese documents.

use std::ops::RangeInclusive;

use log::debug;
use wabun_font_ops::Font;

pub const JPDOC_SYMBOLS: &[RangeInclusive<u32>] = &[
    0x00A7..=0x00A7, // §
    0x00B1..=0x00B1, // ±
    0x00B6..=0x00B6, // ¶
    0x00F7..=0x00F7, // ÷
    0x00D7..=0x00D7, // ×
    0x21D2..=0x21D2, // ⇒
    0x21D4..=0x21D4, // ⇔
    0x25A0..=0x25A1, // ■□
    0x25A0..=0x25B3, // ▲△, and everything from ■ up to them
    0x25BC..=0x25BD, // ▼▽
    0x25C6..=0x25C7, // ◆◇
    0x25CB..=0x25CB, // ○
    0x25CE..=0x25CF, // ◎●
    0x25E5..=0x25E5, // ◥
    0x25EF..=0x25EF, // ◯
    0x221A..=0x221A, // √
    0x221E..=0x221E, // ∞
    0x2010..=0x2010, // ‐
    0x2018..=0x201A, // ‘’‚
    0x201C..=0x201E, // “”„
    0x2020..=0x2021, // †‡
    0x2026..=0x2026, // …
    0x2030..=0x2030, // ‰
    0x2190..=0x2193, // ←↑→↓
    0x2200..=0x2200, // ∀
    0x2202..=0x2203, // ∂∃
    0x2208..=0x2208, // ∈
    0x220B..=0x220B, // ∋
    0x2211..=0x2211, // ∑
    0x2225..=0x2225, // ∥
    0x2227..=0x222C, // ∧∨∩∪∫∬
    0x2260..=0x2261, // ≠≡
    0x2282..=0x2283, // ⊂⊃
    0x2286..=0x2287, // ⊆⊇
    0x2500..=0x257F, // box drawing
];

pub fn is_jpdoc_symbol(codepoint: u32) -> bool {
    JPDOC_SYMBOLS.iter().any(|range| range.contains(&codepoint))
}

/// Indices of glyphs that render a listed symbol and are worth outputting.
pub fn jpdoc_symbol_glyphs(font: &Font) -> Vec<usize> {
    font.glyphs()
        .iter()
        .enumerate()
        .filter(|(_, glyph)| glyph.is_worth_outputting())
        .filter(|(_, glyph)| glyph.codepoints().any(is_jpdoc_symbol))
        .map(|(index, _)| index)
        .collect()
}

/// Clear every listed symbol from `font`. Returns the number of glyphs
/// cleared; a second call clears nothing.
pub fn remove_jpdoc_symbols(font: &mut Font) -> usize {
    let targets = jpdoc_symbol_glyphs(font);
    for &index in &targets {
        if let Some(glyph) = font.glyph_at_mut(index) {
            glyph.clear();
        }
    }
    debug!("cleared {} document symbols", targets.len());
    targets.len()
}

#[cfg(test)]
mod tests {
    use wabun_font_ops::{AltUnicode, Glyph, Outline};

    use super::*;

    fn glyph(name: &str, codepoint: u32) -> Glyph {
        Glyph::new(name, Some(codepoint))
            .with_width(600)
            .with_outline(Outline::rect(50.0, 0.0, 550.0, 700.0))
    }

    fn latin_font() -> Font {
        let mut font = Font::new(1000);
        font.push_glyph(glyph("A", 0x41)).unwrap();
        font.push_glyph(glyph("section", 0xA7)).unwrap();
        font.push_glyph(glyph("uni2502", 0x2502)).unwrap();
        font.push_glyph(glyph("uni25A5", 0x25A5)).unwrap();
        font.push_glyph(
            glyph("quotes", 0x22).with_alt_unicodes(vec![AltUnicode::new(0x201C, None)]),
        )
        .unwrap();
        font
    }

    #[test]
    fn test_membership() {
        assert!(is_jpdoc_symbol(0xA7));
        assert!(is_jpdoc_symbol(0x257F));
        assert!(is_jpdoc_symbol(0x25A7));
        assert!(!is_jpdoc_symbol(0x41));
        assert!(!is_jpdoc_symbol(0x2580));
        assert!(!is_jpdoc_symbol(0x2201));
    }

    #[test]
    fn test_remove_clears_listed_glyphs_only() {
        let mut font = latin_font();

        assert_eq!(remove_jpdoc_symbols(&mut font), 4);
        assert!(font.glyph(0x41).unwrap().is_worth_outputting());
        for codepoint in [0xA7, 0x2502, 0x25A5, 0x22] {
            assert!(!font.glyph(codepoint).unwrap().is_worth_outputting());
        }
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut font = latin_font();
        remove_jpdoc_symbols(&mut font);
        assert_eq!(remove_jpdoc_symbols(&mut font), 0);
    }
}
