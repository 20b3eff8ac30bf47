//! Build errors that abort a style run or the whole build.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("missing configuration key `{0}`")]
    MissingConfigKey(&'static str),

    #[error("invalid value for `{key}`: {value:?} ({reason})")]
    InvalidConfigValue { key: &'static str, value: String, reason: String },

    #[error("failed to load configuration {path}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },

    #[error("source font not found: {0}")]
    MissingSource(PathBuf),

    #[error("glyph U+{codepoint:04X} is required for {purpose} but missing")]
    MissingGlyph { codepoint: u32, purpose: &'static str },
}
