//! Build pipeline: per-style steps and the driver that runs them for every
//! variant.

mod steps;

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use rayon::prelude::*;

pub use steps::{IDEOGRAPHIC_SPACE, PipelineStage, STYLE_STEPS, StyleRun, StyleStep};

use crate::{
    config::Config,
    icons::IconCache,
    io::{FontSource, check_results, prepare_build_dir},
    styles::{STYLES, StyleDescriptor},
    variant::{BuildOptions, VariantConfig},
};

const BANNER: &str =
    "═══════════════════════════════════════════════════════════════════════════════";

/// Everything a style run reads. Fonts themselves live in [`StyleRun`].
pub struct PipelineContext<'a> {
    pub config: &'a Config,
    pub variant: VariantConfig,
    pub source: &'a dyn FontSource,
    pub icons: &'a IconCache,
}

impl<'a> PipelineContext<'a> {
    pub fn new(
        config: &'a Config,
        variant: VariantConfig,
        source: &'a dyn FontSource,
        icons: &'a IconCache,
    ) -> Self {
        Self { config, variant, source, icons }
    }
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub outputs: Vec<PathBuf>,
    pub elapsed: Duration,
}

fn run_step<T>(
    style: &StyleDescriptor,
    stage: PipelineStage,
    step_num: usize,
    total: usize,
    f: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let start = Instant::now();
    let value = f().with_context(|| format!("{style}: {stage} failed"))?;
    println!("  [{style}] [{step_num}/{total}] ✓ {stage} ({:.2}s)", start.elapsed().as_secs_f64());
    Ok(value)
}

/// Run every enabled stage for one style and return the two files written.
pub fn run_style(ctx: &PipelineContext, style: &StyleDescriptor) -> Result<Vec<PathBuf>> {
    println!("=== Generate {style} ===");

    let steps: Vec<_> = STYLE_STEPS
        .iter()
        .filter(|(stage, _)| stage.is_enabled(&ctx.variant, style))
        .collect();
    let total = steps.len() + 1;

    let mut run = run_step(style, PipelineStage::Load, 1, total, || StyleRun::load(ctx, *style))?;
    for (i, (stage, step_fn)) in steps.into_iter().enumerate() {
        run_step(style, *stage, i + 2, total, || step_fn(ctx, &mut run))?;
    }
    Ok(run.outputs)
}

/// Build the four styles of one variant in parallel.
pub fn build_variant(ctx: &PipelineContext) -> Result<Vec<PathBuf>> {
    let results: Vec<Result<Vec<PathBuf>>> =
        STYLES.par_iter().map(|style| run_style(ctx, style)).collect();
    check_results(&results, "Generate")?;
    Ok(results.into_iter().filter_map(Result::ok).flatten().collect())
}

/// Prepare the build directory and build every requested variant.
pub fn build(
    config: &Config,
    options: &BuildOptions,
    source: &dyn FontSource,
) -> Result<BuildReport> {
    let start = Instant::now();

    println!("{BANNER}");
    println!("Wabun Fonts Build Pipeline");
    println!("{BANNER}");

    prepare_build_dir(&config.build_fonts_dir, options.keep_build_dir)?;

    let icons = IconCache::new();
    let mut outputs = Vec::new();
    for variant in options.variants() {
        let family = variant.names(config).family();
        println!("\n{family}");
        let ctx = PipelineContext::new(config, variant, source, &icons);
        let files = build_variant(&ctx).with_context(|| format!("Failed to build {family}"))?;
        outputs.extend(files);
    }

    let elapsed = start.elapsed();
    println!("\n{BANNER}");
    println!("✨ Build complete in {:.2}s", elapsed.as_secs_f64());
    println!("  {} files in {}", outputs.len(), config.build_fonts_dir.display());
    println!("{BANNER}");

    Ok(BuildReport { outputs, elapsed })
}
