//! Glyph geometry policies.
//!
//! Every policy is a function over [`PositionedGlyph`]: it only moves an
//! outline and sets an advance width. Transforms apply one at a time, so a
//! translate that follows a scale sees the width the scale produced.

use std::ops::RangeInclusive;

use log::debug;
use wabun_font_ops::{Affine, Font, PositionedGlyph};

use crate::error::BuildError;

pub const ITALIC_SLOPE_DEGREES: f64 = 9.0;

/// Canonical East-Asian widths before the half-width transform.
pub const HALF_WIDTH: u16 = 600;
pub const FULL_WIDTH: u16 = 1000;
/// Glyphs up to this much wider than [`HALF_WIDTH`] still count as half width.
pub const HALF_WIDTH_TOLERANCE: u16 = 20;

/// Width the Latin outlines are scaled to inside a half-width cell.
pub const HALF_WIDTH_BODY: f64 = 540.0;
pub const DIGIT_ZERO: u32 = 0x30;

/// Reference glyph for the full width (あ).
pub const FULL_WIDTH_REFERENCE: u32 = 0x3042;
/// （ ［ ｛
pub const OPENING_BRACKETS: [u32; 3] = [0xFF08, 0xFF3B, 0xFF5B];
/// ） ］ ｝
pub const CLOSING_BRACKETS: [u32; 3] = [0xFF09, 0xFF3D, 0xFF5D];

pub const POWERLINE: RangeInclusive<u32> = 0xE0B0..=0xE0D4;
/// Horizontal corrections for right-pointing Powerline glyphs, in units of a
/// 1000 em.
pub const POWERLINE_OFFSETS: [(u32, f64); 5] = [
    (0xE0B2, -353.0),
    (0xE0B6, -414.0),
    (0xE0C5, -137.0),
    (0xE0C7, -214.0),
    (0xE0D4, -314.0),
];
pub const ICON_VERTICAL_SCALE: f64 = 1.21;
pub const ICON_VERTICAL_SHIFT: f64 = -24.0;

/// Affine transforms composed left to right: `a.translate(..).scale(..)`
/// translates first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform(Affine);

impl Default for Transform {
    fn default() -> Self {
        Self(Affine::IDENTITY)
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self(Affine::translate((dx, dy)) * self.0)
    }

    pub fn scale(self, sx: f64, sy: f64) -> Self {
        Self(Affine::scale_non_uniform(sx, sy) * self.0)
    }

    /// Shear x by `tan(degrees)` per unit of y.
    pub fn skew(self, degrees: f64) -> Self {
        Self(Affine::skew(degrees.to_radians().tan(), 0.0) * self.0)
    }

    pub fn affine(&self) -> Affine {
        self.0
    }

    pub fn apply<G: PositionedGlyph + ?Sized>(&self, glyph: &mut G) {
        glyph.transform(self.0);
    }
}

fn translate_x<G: PositionedGlyph + ?Sized>(glyph: &mut G, dx: f64) {
    Transform::new().translate(dx, 0.0).apply(glyph);
}

/// Move the outline to the middle of a `target`-wide advance.
pub fn center_to<G: PositionedGlyph + ?Sized>(glyph: &mut G, target: u16) {
    translate_x(glyph, (f64::from(target) - f64::from(glyph.width())) / 2.0);
    glyph.set_width(target);
}

/// Canonical width for `width`, or `None` when it is left alone.
pub fn width_bucket(width: u16) -> Option<u16> {
    match width {
        0 => None,
        w if w <= HALF_WIDTH + HALF_WIDTH_TOLERANCE => Some(HALF_WIDTH),
        w if w < FULL_WIDTH => Some(FULL_WIDTH),
        _ => None,
    }
}

pub fn normalize_width<G: PositionedGlyph + ?Sized>(glyph: &mut G) {
    match width_bucket(glyph.width()) {
        Some(target) if target != glyph.width() => center_to(glyph, target),
        _ => {}
    }
}

/// Snap every glyph of `font` to a half or full width. Cleared glyphs are
/// left alone so they stay out of the output.
pub fn normalize_widths(font: &mut Font) {
    for glyph in font.glyphs_mut().filter(|glyph| glyph.is_worth_outputting()) {
        normalize_width(glyph);
    }
}

/// Widen the opening and closing full-width brackets by a sixth of the full
/// width, read from あ. Missing bracket glyphs are skipped.
pub fn widen_brackets(font: &mut Font) -> Result<(), BuildError> {
    let full_width = font
        .glyph(FULL_WIDTH_REFERENCE)
        .map(|glyph| glyph.width())
        .ok_or(BuildError::MissingGlyph {
            codepoint: FULL_WIDTH_REFERENCE,
            purpose: "bracket widening",
        })?;
    let adjust = (f64::from(full_width) / 6.0).round_ties_even();

    let moves = OPENING_BRACKETS
        .iter()
        .map(|&cp| (cp, -adjust))
        .chain(CLOSING_BRACKETS.iter().map(|&cp| (cp, adjust)));
    for (codepoint, dx) in moves {
        match font.glyph_mut(codepoint) {
            Some(glyph) if glyph.is_worth_outputting() => {
                translate_x(glyph, dx);
                glyph.set_width(full_width);
            }
            _ => debug!("bracket U+{codepoint:04X} not present"),
        }
    }
    Ok(())
}

pub fn italicize(font: &mut Font) {
    font.set_italic_angle(-ITALIC_SLOPE_DEGREES);
    let skew = Transform::new().skew(ITALIC_SLOPE_DEGREES);
    for glyph in font.glyphs_mut() {
        skew.apply(glyph);
    }
}

/// Width of a Latin glyph `width` units wide once narrowed: `unit` times
/// the number of 600-unit cells it spans, at least one.
pub fn half_width_target(width: u16, unit: u16) -> u16 {
    let cells = (f64::from(width) / f64::from(HALF_WIDTH)).round_ties_even().max(1.0);
    (cells * f64::from(unit)).min(f64::from(u16::MAX)) as u16
}

pub fn half_width_latin<G: PositionedGlyph + ?Sized>(glyph: &mut G, scale_x: f64, unit: u16) {
    if glyph.width() == 0 {
        return;
    }
    let target = half_width_target(glyph.width(), unit);
    Transform::new().scale(scale_x, 1.0).apply(glyph);
    center_to(glyph, target);
}

pub fn half_width_east_asian<G: PositionedGlyph + ?Sized>(glyph: &mut G, unit: u16) {
    match glyph.width() {
        HALF_WIDTH => center_to(glyph, unit),
        FULL_WIDTH => center_to(glyph, unit.saturating_mul(2)),
        _ => {}
    }
}

/// Narrow both fonts to the 1:2 cell. Latin outlines are scaled so that
/// `0` is [`HALF_WIDTH_BODY`] wide. Returns the horizontal scale used.
pub fn transform_half_width(
    east_asian: &mut Font,
    latin: &mut Font,
    unit: u16,
) -> Result<f64, BuildError> {
    let digit_width = latin
        .glyph(DIGIT_ZERO)
        .map(|glyph| glyph.width())
        .filter(|&width| width > 0)
        .ok_or(BuildError::MissingGlyph { codepoint: DIGIT_ZERO, purpose: "half-width scale" })?;
    let scale_x = HALF_WIDTH_BODY / f64::from(digit_width);
    debug!("half-width: x scale {scale_x:.4}, unit {unit}");

    for glyph in latin.glyphs_mut().filter(|glyph| glyph.is_worth_outputting()) {
        half_width_latin(glyph, scale_x, unit);
    }
    for glyph in east_asian.glyphs_mut().filter(|glyph| glyph.is_worth_outputting()) {
        half_width_east_asian(glyph, unit);
    }
    Ok(scale_x)
}

/// Fit an icon glyph into a `cell`-wide advance.
///
/// Powerline glyphs get their offset correction, keep their width, are
/// centered when narrow or squeezed when wide, then stretched vertically.
/// Other icons narrower than [`HALF_WIDTH`] are centered.
pub fn fit_icon_glyph<G: PositionedGlyph + ?Sized>(
    glyph: &mut G,
    codepoint: Option<u32>,
    cell: u16,
) {
    let width = glyph.width();
    match codepoint {
        Some(cp) if POWERLINE.contains(&cp) => {
            if let Some(&(_, dx)) = POWERLINE_OFFSETS.iter().find(|(c, _)| *c == cp) {
                translate_x(glyph, dx);
            }
            glyph.set_width(width);
            if width < cell {
                translate_x(glyph, (f64::from(cell) - f64::from(width)) / 2.0);
            } else if width > cell {
                Transform::new().scale(f64::from(cell) / f64::from(width), 1.0).apply(glyph);
            }
            Transform::new().scale(1.0, ICON_VERTICAL_SCALE).apply(glyph);
            Transform::new().translate(0.0, ICON_VERTICAL_SHIFT).apply(glyph);
        }
        _ if width < HALF_WIDTH => {
            translate_x(glyph, (f64::from(cell) - f64::from(width)) / 2.0);
        }
        _ => {}
    }
    glyph.set_width(cell);
}
