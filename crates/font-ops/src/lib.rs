//! In-memory glyph model with OpenType reading and TrueType writing.
//!
//! This is the font engine the wabun pipeline drives: open a font, edit
//! glyphs and font-wide fields in place, merge fonts, and generate a
//! TrueType file.

mod error;
mod font;
mod glyph;
mod outline;
mod reader;
mod writer;

pub use error::{FontError, Result};
pub use font::{
    Font, NAME_ID_COPYRIGHT, NAME_ID_FAMILY, NAME_ID_FULL_NAME, NAME_ID_LICENSE,
    NAME_ID_LICENSE_URL, NAME_ID_POSTSCRIPT, NAME_ID_SUBFAMILY, NAME_ID_TYPO_FAMILY,
    NAME_ID_TYPO_SUBFAMILY, NAME_ID_UNIQUE_ID, NAME_ID_VERSION, StyleFlags, VerticalMetrics,
};
pub use glyph::{AltUnicode, Glyph, PositionedGlyph};
pub use outline::{Component, Outline};

/// Re-exported so callers can build transforms without naming kurbo.
pub use kurbo::Affine;
