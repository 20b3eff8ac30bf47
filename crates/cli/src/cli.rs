//! CLI definitions and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use wabun_core::{BuildOptions, Config, FileSource, VariantConfig, build};

#[derive(Debug, Parser)]
#[command(name = "wabun-fonts")]
#[command(about = "Compose the Wabun fonts from an East-Asian and a Latin font")]
pub struct Cli {
    /// Build configuration
    #[arg(long, default_value = "build.ini")]
    pub config: PathBuf,

    /// Keep the existing build directory instead of recreating it
    #[arg(long)]
    pub do_not_delete_build_dir: bool,

    /// Leave the ideographic space (U+3000) blank
    #[arg(long)]
    pub invisible_zenkaku_space: bool,

    /// Use 1:2 instead of 3:5 half-width cells
    #[arg(long)]
    pub half_width: bool,

    /// Prefer East-Asian glyphs for symbols common in Japanese documents
    #[arg(long)]
    pub jpdoc: bool,

    /// Merge Nerd Font icons
    #[arg(long)]
    pub nerd_font: bool,

    /// Build every combination of the variant flags
    #[arg(long)]
    pub all_variants: bool,
}

impl Cli {
    pub fn options(&self) -> BuildOptions {
        BuildOptions {
            variant: VariantConfig {
                half_width: self.half_width,
                invisible_zenkaku_space: self.invisible_zenkaku_space,
                jpdoc: self.jpdoc,
                nerd_font: self.nerd_font,
            },
            keep_build_dir: self.do_not_delete_build_dir,
            all_variants: self.all_variants,
        }
    }

    pub fn run(self) -> Result<()> {
        let config = Config::load(&self.config)
            .with_context(|| format!("Failed to load configuration: {}", self.config.display()))?;
        let report = build(&config, &self.options(), &FileSource)?;
        for path in &report.outputs {
            info!("wrote {}", path.display());
        }
        Ok(())
    }
}
