use std::{io, path::PathBuf, result};

use read_fonts::ReadError;
use write_fonts::{BuilderError, error};

/// Error types for font-ops.
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("failed to parse font: {0}")]
    Read(#[from] ReadError),

    #[error("failed to write table: {0}")]
    Write(#[from] error::Error),

    #[error("failed to build font: {0}")]
    Builder(#[from] BuilderError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("font has neither glyf nor CFF outlines")]
    NoOutlines,

    #[error("failed to load font for charmap and outline access: {0}")]
    GlyphAccess(String),

    #[error("failed to draw outline for glyph {gid}: {reason}")]
    Draw { gid: u32, reason: String },

    #[error("a glyph is already mapped to U+{0:04X}")]
    GlyphExists(u32),

    #[error("codepoint 0x{0:X} is outside the Unicode encoding range")]
    EncodingOutOfRange(u32),

    #[error("outline of glyph '{glyph}' cannot be written: {reason}")]
    MalformedOutline { glyph: String, reason: String },

    #[error("{0} glyphs do not fit in a TrueType font")]
    TooManyGlyphs(usize),

    #[error("failed to build cmap: {0}")]
    CmapConflict(String),
}

pub type Result<T> = result::Result<T, FontError>;
