//! Font loading, output and build directory helpers.

use std::{
    fs::{create_dir_all, remove_dir_all, remove_file, write},
    path::Path,
};

use anyhow::{Context, Result, bail};
use log::{error, info, warn};
use wabun_font_ops::Font;

use crate::error::BuildError;

/// Where the pipeline gets its fonts from.
pub trait FontSource: Sync {
    fn load(&self, path: &Path) -> Result<Font>;
}

/// Reads fonts from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl FontSource for FileSource {
    fn load(&self, path: &Path) -> Result<Font> {
        if !path.is_file() {
            return Err(BuildError::MissingSource(path.to_path_buf()).into());
        }
        Font::open(path).with_context(|| format!("Failed to read font: {}", path.display()))
    }
}

/// Write a set of fonts that belong together.
///
/// Every font is serialized before any file is written, and files already
/// written are removed again if a later write fails, so either all of the
/// outputs exist or none do.
pub fn write_fonts(outputs: &[(&Font, &Path)]) -> Result<()> {
    let encoded = outputs
        .iter()
        .map(|(font, path)| {
            font.to_bytes()
                .with_context(|| format!("Failed to serialize font: {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    for (i, ((_, path), data)) in outputs.iter().zip(&encoded).enumerate() {
        if let Err(err) = write(path, data) {
            for (_, written) in &outputs[..i] {
                if let Err(cleanup) = remove_file(written) {
                    warn!("Failed to remove {}: {cleanup}", written.display());
                }
            }
            return Err(err).with_context(|| format!("Failed to write font: {}", path.display()));
        }
    }
    Ok(())
}

/// Recreate `dir`, or only make sure it exists when `keep` is set.
pub fn prepare_build_dir(dir: &Path, keep: bool) -> Result<()> {
    if dir.exists() && !keep {
        remove_dir_all(dir)
            .with_context(|| format!("Failed to remove directory: {}", dir.display()))?;
        info!("Removed {}", dir.display());
    }
    create_dir_all(dir).with_context(|| format!("Failed to create directory: {}", dir.display()))
}

/// Log every failure in `results` and bail if there was any.
pub fn check_results<T>(results: &[Result<T>], operation: &str) -> Result<()> {
    let errors: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();

    if !errors.is_empty() {
        for err in &errors {
            error!("{operation}: {err:#}");
        }
        bail!("{operation} failed for {} styles", errors.len());
    }
    Ok(())
}
