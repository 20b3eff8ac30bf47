//! Variant toggles and the names derived from them.

use std::path::PathBuf;

use crate::{config::Config, styles::StyleDescriptor};

/// Feature toggles of one build. Each combination yields one family of four
/// styles, told apart by a tag appended to the family name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VariantConfig {
    /// Narrow Latin glyphs to the 1:2 cell.
    pub half_width: bool,
    /// Keep U+3000 blank instead of merging the visible ideographic space.
    pub invisible_zenkaku_space: bool,
    /// Leave common Japanese-document symbols to the East-Asian font.
    pub jpdoc: bool,
    /// Merge the icon font.
    pub nerd_font: bool,
}

impl VariantConfig {
    /// All 16 toggle combinations, plain variant first.
    pub fn all() -> Vec<Self> {
        (0u8..16)
            .map(|bits| Self {
                half_width: bits & 0b0001 != 0,
                invisible_zenkaku_space: bits & 0b0010 != 0,
                jpdoc: bits & 0b0100 != 0,
                nerd_font: bits & 0b1000 != 0,
            })
            .collect()
    }

    /// Tag appended to the family name. Tags are concatenated in a fixed
    /// order regardless of how the toggles were given.
    pub fn tag(&self, config: &Config) -> String {
        [
            (self.half_width, config.half_width_str.as_str()),
            (self.invisible_zenkaku_space, config.invisible_zenkaku_space_str.as_str()),
            (self.jpdoc, config.jpdoc_str.as_str()),
            (self.nerd_font, config.nerd_fonts_str.as_str()),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, tag)| tag)
        .collect()
    }

    pub fn names<'a>(&self, config: &'a Config) -> VariantNames<'a> {
        VariantNames { config, tag: self.tag(config) }
    }
}

/// Family, full, PostScript and file names of one variant.
#[derive(Debug, Clone)]
pub struct VariantNames<'a> {
    config: &'a Config,
    tag: String,
}

impl VariantNames<'_> {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn family(&self) -> String {
        format!("{} {}", self.config.font_name, self.tag).trim().to_string()
    }

    pub fn full_name(&self, style: &StyleDescriptor) -> String {
        format!("{} {}", self.family(), style.merged)
    }

    pub fn postscript_name(&self, style: &StyleDescriptor) -> String {
        format!("{}{}-{}", self.compact_name(), self.tag, style.merged)
    }

    /// `<prefix><name without spaces><tag>-<style>`
    pub fn file_stem(&self, style: &StyleDescriptor) -> String {
        format!("{}{}{}-{}", self.config.fontforge_prefix, self.compact_name(), self.tag, style.merged)
    }

    /// Latin and East-Asian output paths, in that order.
    pub fn output_paths(&self, style: &StyleDescriptor) -> [PathBuf; 2] {
        let stem = self.file_stem(style);
        let dir = &self.config.build_fonts_dir;
        [dir.join(format!("{stem}-eng.ttf")), dir.join(format!("{stem}-jp.ttf"))]
    }

    fn compact_name(&self) -> String {
        self.config.font_name.replace(' ', "")
    }
}

/// Everything the command line decides about a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub variant: VariantConfig,
    /// Reuse an existing build directory instead of recreating it.
    pub keep_build_dir: bool,
    /// Build every toggle combination instead of `variant` alone.
    pub all_variants: bool,
}

impl BuildOptions {
    pub fn variants(&self) -> Vec<VariantConfig> {
        if self.all_variants { VariantConfig::all() } else { vec![self.variant] }
    }
}
