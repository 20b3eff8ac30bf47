//! Pipeline step definitions.

use std::{fmt, path::PathBuf};

use anyhow::Result;
use log::info;
use wabun_font_ops::Font;

use super::PipelineContext;
use crate::{
    altuni::resolve_alt_unicodes,
    dedup::remove_duplicates,
    geometry::{italicize, normalize_widths, transform_half_width, widen_brackets},
    icons::{icon_cell_width, merge_icons},
    io::write_fonts,
    metadata::apply_metadata,
    styles::StyleDescriptor,
    symbols::remove_jpdoc_symbols,
    variant::VariantConfig,
};

/// U+3000 IDEOGRAPHIC SPACE
pub const IDEOGRAPHIC_SPACE: u32 = 0x3000;

/// The fonts of one style while they move through the pipeline.
#[derive(Debug)]
pub struct StyleRun {
    pub style: StyleDescriptor,
    pub east_asian: Font,
    pub latin: Font,
    pub outputs: Vec<PathBuf>,
}

impl StyleRun {
    /// Open both source fonts of `style` and decompose their references.
    pub fn load(ctx: &PipelineContext, style: StyleDescriptor) -> Result<Self> {
        let config = ctx.config;
        let mut east_asian = ctx.source.load(&config.jp_font_path(style.east_asian))?;
        let mut latin = ctx.source.load(&config.eng_font_path(style.latin))?;
        east_asian.unlink_references();
        latin.unlink_references();
        info!(
            "{style}: {} East-Asian and {} Latin glyphs",
            east_asian.glyph_count(),
            latin.glyph_count()
        );
        Ok(Self { style, east_asian, latin, outputs: Vec::new() })
    }
}

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Load,
    ResolveAltUnicode,
    FilterSymbols,
    Deduplicate,
    NormalizeEm,
    AdjustGlyphs,
    Italicize,
    NormalizeWidths,
    HalfWidth,
    StripLookups,
    VisualizeSpace,
    MergeIcons,
    WriteMetadata,
    Emit,
}

impl PipelineStage {
    pub fn is_enabled(&self, variant: &VariantConfig, style: &StyleDescriptor) -> bool {
        match self {
            Self::FilterSymbols => variant.jpdoc,
            Self::Italicize => style.italic,
            Self::HalfWidth => variant.half_width,
            Self::VisualizeSpace => !variant.invisible_zenkaku_space,
            Self::MergeIcons => variant.nerd_font,
            _ => true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::ResolveAltUnicode => "resolve-alt-unicode",
            Self::FilterSymbols => "filter-symbols",
            Self::Deduplicate => "dedup",
            Self::NormalizeEm => "normalize-em",
            Self::AdjustGlyphs => "adjust-glyphs",
            Self::Italicize => "italicize",
            Self::NormalizeWidths => "normalize-widths",
            Self::HalfWidth => "half-width",
            Self::StripLookups => "strip-lookups",
            Self::VisualizeSpace => "visualize-space",
            Self::MergeIcons => "merge-icons",
            Self::WriteMetadata => "write-metadata",
            Self::Emit => "emit",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type StyleStep = (PipelineStage, fn(&PipelineContext, &mut StyleRun) -> Result<()>);

pub const STYLE_STEPS: &[StyleStep] = &[
    (PipelineStage::ResolveAltUnicode, step_resolve_alt_unicode),
    (PipelineStage::FilterSymbols, step_filter_symbols),
    (PipelineStage::Deduplicate, step_dedup),
    (PipelineStage::NormalizeEm, step_normalize_em),
    (PipelineStage::AdjustGlyphs, step_adjust_glyphs),
    (PipelineStage::Italicize, step_italicize),
    (PipelineStage::NormalizeWidths, step_normalize_widths),
    (PipelineStage::HalfWidth, step_half_width),
    (PipelineStage::StripLookups, step_strip_lookups),
    (PipelineStage::VisualizeSpace, step_visualize_space),
    (PipelineStage::MergeIcons, step_merge_icons),
    (PipelineStage::WriteMetadata, step_write_metadata),
    (PipelineStage::Emit, step_emit),
];

fn step_resolve_alt_unicode(_ctx: &PipelineContext, run: &mut StyleRun) -> Result<()> {
    resolve_alt_unicodes(&mut run.east_asian)?;
    Ok(())
}

fn step_filter_symbols(_ctx: &PipelineContext, run: &mut StyleRun) -> Result<()> {
    remove_jpdoc_symbols(&mut run.latin);
    Ok(())
}

fn step_dedup(_ctx: &PipelineContext, run: &mut StyleRun) -> Result<()> {
    remove_duplicates(&mut run.east_asian, &run.latin);
    Ok(())
}

fn step_normalize_em(ctx: &PipelineContext, run: &mut StyleRun) -> Result<()> {
    let em = ctx.config.em();
    run.east_asian.set_em(em);
    run.latin.set_em(em);
    Ok(())
}

fn step_adjust_glyphs(_ctx: &PipelineContext, run: &mut StyleRun) -> Result<()> {
    widen_brackets(&mut run.east_asian)?;
    Ok(())
}

fn step_italicize(_ctx: &PipelineContext, run: &mut StyleRun) -> Result<()> {
    italicize(&mut run.east_asian);
    Ok(())
}

fn step_normalize_widths(_ctx: &PipelineContext, run: &mut StyleRun) -> Result<()> {
    normalize_widths(&mut run.east_asian);
    Ok(())
}

fn step_half_width(ctx: &PipelineContext, run: &mut StyleRun) -> Result<()> {
    transform_half_width(&mut run.east_asian, &mut run.latin, ctx.config.half_width_12)?;
    Ok(())
}

fn step_strip_lookups(_ctx: &PipelineContext, run: &mut StyleRun) -> Result<()> {
    run.east_asian.remove_lookups();
    Ok(())
}

fn step_visualize_space(ctx: &PipelineContext, run: &mut StyleRun) -> Result<()> {
    let space = ctx.source.load(&ctx.config.ideographic_space_path())?;
    if let Some(glyph) = run.east_asian.glyph_mut(IDEOGRAPHIC_SPACE) {
        glyph.clear();
    }
    run.east_asian.merge_fonts(&space);
    Ok(())
}

fn step_merge_icons(ctx: &PipelineContext, run: &mut StyleRun) -> Result<()> {
    let cell = icon_cell_width(&run.latin)?;
    let icons = ctx.icons.load(ctx.source, &ctx.config.icon_font_path(), ctx.config.em(), cell)?;
    merge_icons(&mut run.east_asian, &mut run.latin, &icons);
    Ok(())
}

fn step_write_metadata(ctx: &PipelineContext, run: &mut StyleRun) -> Result<()> {
    let names = ctx.variant.names(ctx.config);
    for font in [&mut run.latin, &mut run.east_asian] {
        apply_metadata(font, ctx.config, &ctx.variant, &names, &run.style);
    }
    Ok(())
}

fn step_emit(ctx: &PipelineContext, run: &mut StyleRun) -> Result<()> {
    let [eng, jp] = ctx.variant.names(ctx.config).output_paths(&run.style);
    write_fonts(&[(&run.latin, eng.as_path()), (&run.east_asian, jp.as_path())])?;
    run.outputs.extend([eng, jp]);
    Ok(())
}
