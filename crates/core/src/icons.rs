//! Icon font preparation and merging.

use std::{
    collections::{BTreeMap, HashSet},
    path::Path,
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use wabun_font_ops::Font;

use crate::{
    geometry::{DIGIT_ZERO, fit_icon_glyph},
    io::FontSource,
};

/// Prepared icon fonts shared by every style run of a build.
///
/// Preparation depends on the cell width, so one font is kept per width.
/// The lock is held while a font is prepared: the first run for a width
/// does the work and every other run waits for it and reuses the result.
#[derive(Debug, Default)]
pub struct IconCache {
    fonts: Mutex<BTreeMap<u16, Arc<Font>>>,
}

impl IconCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_init(&self, cell: u16, init: impl FnOnce() -> Result<Font>) -> Result<Arc<Font>> {
        let mut fonts = self.fonts.lock().map_err(|_| anyhow!("icon font cache poisoned"))?;
        if let Some(font) = fonts.get(&cell) {
            return Ok(Arc::clone(font));
        }
        let font = Arc::new(init()?);
        fonts.insert(cell, Arc::clone(&font));
        Ok(font)
    }

    /// Load and prepare the icon font at `path` unless a font for `cell` is
    /// already cached.
    pub fn load(
        &self,
        source: &dyn FontSource,
        path: &Path,
        em: u16,
        cell: u16,
    ) -> Result<Arc<Font>> {
        self.get_or_init(cell, || {
            let font = source.load(path)?;
            info!("Preparing icon font {} for a {cell}-unit cell", path.display());
            Ok(prepare_icon_font(font, em, cell))
        })
    }
}

/// Decompose and rescale `icons` to `em`, give repeated glyph names a
/// `-<encoding>` suffix and fit every glyph into a `cell`-wide advance.
///
/// Fitting moves each glyph on its own, so references are decomposed first.
pub fn prepare_icon_font(mut icons: Font, em: u16, cell: u16) -> Font {
    icons.unlink_references();
    icons.set_em(em);

    let mut seen: HashSet<String> = HashSet::new();
    let mut renamed = 0;
    for (index, glyph) in icons.glyphs_mut().enumerate() {
        if seen.contains(glyph.name()) {
            let encoding = glyph.unicode().map_or(index as u64, u64::from);
            let name = format!("{}-{encoding}", glyph.name());
            glyph.set_name(name);
            renamed += 1;
        }
        seen.insert(glyph.name().to_owned());

        let codepoint = glyph.unicode();
        fit_icon_glyph(glyph, codepoint, cell);
    }
    debug!("icon font: {renamed} duplicate glyph names renamed");
    icons
}

/// Clear the icon codepoints in both fonts and merge the icons into the
/// East-Asian font. Returns the number of codepoints cleared.
pub fn merge_icons(east_asian: &mut Font, latin: &mut Font, icons: &Font) -> usize {
    let mut cleared = 0;
    for codepoint in icons.glyphs().iter().filter_map(|glyph| glyph.unicode()) {
        for font in [&mut *east_asian, &mut *latin] {
            if let Some(glyph) = font.glyph_mut(codepoint) {
                glyph.clear();
                cleared += 1;
            }
        }
    }
    east_asian.merge_fonts(icons);
    debug!("icons: {cleared} existing glyphs cleared before merge");
    cleared
}

/// Cell width for icons: the advance of the Latin `0`.
pub fn icon_cell_width(latin: &Font) -> Result<u16> {
    latin
        .glyph(DIGIT_ZERO)
        .map(|glyph| glyph.width())
        .context("Latin font has no `0` to size icons against")
}
