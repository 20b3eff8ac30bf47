//! Wabun Core - the composition pipeline that merges an East-Asian font and a
//! Latin font into the Wabun families.

pub mod altuni;
pub mod config;
pub mod dedup;
pub mod error;
pub mod geometry;
pub mod icons;
pub mod io;
pub mod metadata;
pub mod pipeline;
pub mod styles;
pub mod symbols;
pub mod variant;

pub use config::Config;
pub use error::BuildError;
pub use icons::IconCache;
pub use io::{FileSource, FontSource};
pub use pipeline::{BuildReport, PipelineContext, PipelineStage, build, build_variant, run_style};
pub use styles::{STYLES, StyleDescriptor};
pub use variant::{BuildOptions, VariantConfig, VariantNames};
