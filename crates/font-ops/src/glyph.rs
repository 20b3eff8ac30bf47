//! Glyph entities.

use kurbo::Affine;

use crate::outline::Outline;

/// An extra codepoint rendered by a glyph that does not own a separate
/// outline for it, optionally scoped to a Unicode variation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AltUnicode {
    pub codepoint: u32,
    pub selector: Option<u32>,
}

impl AltUnicode {
    pub const fn new(codepoint: u32, selector: Option<u32>) -> Self {
        Self { codepoint, selector }
    }
}

/// Capability the geometry policies operate on: an advance width and an
/// outline that can be moved with an affine transform.
pub trait PositionedGlyph {
    fn width(&self) -> u16;
    fn set_width(&mut self, width: u16);
    fn transform(&mut self, affine: Affine);
}

#[derive(Debug, Clone)]
pub struct Glyph {
    name: String,
    unicode: Option<u32>,
    width: u16,
    width_set: bool,
    outline: Outline,
    alt_unicodes: Vec<AltUnicode>,
}

impl Glyph {
    pub fn new(name: impl Into<String>, unicode: Option<u32>) -> Self {
        Self {
            name: name.into(),
            unicode,
            width: 0,
            width_set: false,
            outline: Outline::default(),
            alt_unicodes: Vec::new(),
        }
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.set_width(width);
        self
    }

    pub fn with_outline(mut self, outline: Outline) -> Self {
        self.outline = outline;
        self
    }

    pub fn with_alt_unicodes(mut self, alt_unicodes: Vec<AltUnicode>) -> Self {
        self.alt_unicodes = alt_unicodes;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn unicode(&self) -> Option<u32> {
        self.unicode
    }

    pub(crate) fn set_unicode(&mut self, unicode: Option<u32>) {
        self.unicode = unicode;
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = width;
        self.width_set = true;
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn outline_mut(&mut self) -> &mut Outline {
        &mut self.outline
    }

    pub fn alt_unicodes(&self) -> &[AltUnicode] {
        &self.alt_unicodes
    }

    pub fn clear_alt_unicodes(&mut self) {
        self.alt_unicodes.clear();
    }

    /// Primary codepoint followed by every alternate that has no variation
    /// selector.
    pub fn codepoints(&self) -> impl Iterator<Item = u32> + '_ {
        self.unicode.into_iter().chain(
            self.alt_unicodes
                .iter()
                .filter(|alt| alt.selector.is_none())
                .map(|alt| alt.codepoint),
        )
    }

    /// A glyph is written out when it draws something or carries an explicit
    /// advance width. Cleared glyphs are neither.
    pub fn is_worth_outputting(&self) -> bool {
        !self.outline.is_empty() || self.width_set
    }

    /// Drop the outline and forget the advance width. The glyph keeps its
    /// slot, name and codepoint.
    pub fn clear(&mut self) {
        self.outline.clear();
        self.width_set = false;
    }

    /// Paste the outline and advance width of `source` into this glyph.
    pub fn copy_from(&mut self, source: &Glyph) {
        self.outline = source.outline.clone();
        self.set_width(source.width);
    }

    /// Transform the outline. Pure scale/translate matrices with positive
    /// scale factors carry the advance width along (`w * xx + dx`); any
    /// rotation or skew leaves it untouched.
    pub fn transform(&mut self, affine: Affine) {
        self.outline.apply(affine);

        let [xx, yx, xy, yy, dx, _] = affine.as_coeffs();
        if xx > 0.0 && yy > 0.0 && yx == 0.0 && xy == 0.0 {
            let width = (f64::from(self.width) * xx + dx).round();
            self.width = width.clamp(0.0, f64::from(u16::MAX)) as u16;
        }
    }

    /// Scale outline and advance width for a new units-per-em. Component
    /// placements are adjusted so referenced glyphs are not scaled twice.
    pub(crate) fn rescale(&mut self, factor: f64) {
        self.outline.rescale(factor);
        let width = (f64::from(self.width) * factor).round();
        self.width = width.clamp(0.0, f64::from(u16::MAX)) as u16;
    }
}

impl PositionedGlyph for Glyph {
    fn width(&self) -> u16 {
        Glyph::width(self)
    }

    fn set_width(&mut self, width: u16) {
        Glyph::set_width(self, width);
    }

    fn transform(&mut self, affine: Affine) {
        Glyph::transform(self, affine);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_glyph(width: u16) -> Glyph {
        Glyph::new("a", Some(0x61))
            .with_width(width)
            .with_outline(Outline::rect(50.0, 0.0, 450.0, 500.0))
    }

    #[test]
    fn test_translate_carries_width() {
        let mut glyph = box_glyph(500);
        glyph.transform(Affine::translate((-353.0, 0.0)));
        assert_eq!(glyph.width(), 147);
        assert_eq!(glyph.outline().bounds().unwrap().x0, -303.0);
    }

    #[test]
    fn test_scale_carries_width() {
        let mut glyph = box_glyph(600);
        glyph.transform(Affine::scale_non_uniform(0.9, 1.0));
        assert_eq!(glyph.width(), 540);
    }

    #[test]
    fn test_skew_keeps_width() {
        let mut glyph = box_glyph(600);
        glyph.transform(Affine::skew(0.15, 0.0));
        assert_eq!(glyph.width(), 600);
    }

    #[test]
    fn test_translate_below_zero_clamps() {
        let mut glyph = box_glyph(100);
        glyph.transform(Affine::translate((-300.0, 0.0)));
        assert_eq!(glyph.width(), 0);
    }

    #[test]
    fn test_clear_stops_output() {
        let mut glyph = box_glyph(600);
        assert!(glyph.is_worth_outputting());
        glyph.clear();
        assert!(!glyph.is_worth_outputting());
        assert_eq!(glyph.unicode(), Some(0x61));
    }

    #[test]
    fn test_space_is_worth_outputting() {
        let space = Glyph::new("space", Some(0x20)).with_width(600);
        assert!(space.is_worth_outputting());
        assert!(!Glyph::new("blank", None).is_worth_outputting());
    }

    #[test]
    fn test_codepoints_skip_variation_sequences() {
        let glyph = Glyph::new("a", Some(0x61)).with_alt_unicodes(vec![
            AltUnicode::new(0xFF41, None),
            AltUnicode::new(0x61, Some(0xFE00)),
        ]);
        assert_eq!(glyph.codepoints().collect::<Vec<_>>(), vec![0x61, 0xFF41]);
    }

    #[test]
    fn test_copy_from() {
        let source = box_glyph(1000);
        let mut target = Glyph::new("b", Some(0x62));
        target.copy_from(&source);
        assert_eq!(target.width(), 1000);
        assert_eq!(target.outline(), source.outline());
    }
}
