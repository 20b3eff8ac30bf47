//! The in-memory font.
//!
//! A [`Font`] is an ordered list of [`Glyph`]s plus the font-wide fields the
//! composition pipeline edits: EM size, vertical metrics, naming entries,
//! vendor and style flags. Glyph order is preserved through every operation
//! so that layout tables carried over from the source stay valid.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fs,
    path::Path,
};

use kurbo::{Affine, BezPath};
use log::{debug, warn};
use write_fonts::{
    tables::{head::Head, hhea::Hhea, os2::Os2, post::Post},
    types::Tag,
};

use crate::{
    error::{FontError, Result},
    glyph::Glyph,
    outline::Outline,
    reader, writer,
};

pub const NAME_ID_COPYRIGHT: u16 = 0;
pub const NAME_ID_FAMILY: u16 = 1;
pub const NAME_ID_SUBFAMILY: u16 = 2;
pub const NAME_ID_UNIQUE_ID: u16 = 3;
pub const NAME_ID_FULL_NAME: u16 = 4;
pub const NAME_ID_VERSION: u16 = 5;
pub const NAME_ID_POSTSCRIPT: u16 = 6;
pub const NAME_ID_LICENSE: u16 = 13;
pub const NAME_ID_LICENSE_URL: u16 = 14;
pub const NAME_ID_TYPO_FAMILY: u16 = 16;
pub const NAME_ID_TYPO_SUBFAMILY: u16 = 17;

pub(crate) const GDEF: Tag = Tag::new(b"GDEF");
pub(crate) const GSUB: Tag = Tag::new(b"GSUB");
pub(crate) const GPOS: Tag = Tag::new(b"GPOS");

/// Component nesting deeper than this is treated as a cycle.
const MAX_COMPONENT_DEPTH: usize = 16;

/// Ascent/descent values written to `OS/2` and `hhea`.
///
/// Descenders are negative, as stored in the tables; Windows metrics are
/// positive distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerticalMetrics {
    pub typo_ascender: i16,
    pub typo_descender: i16,
    pub typo_line_gap: i16,
    pub win_ascent: u16,
    pub win_descent: u16,
    pub hhea_ascender: i16,
    pub hhea_descender: i16,
    pub hhea_line_gap: i16,
}

impl VerticalMetrics {
    /// Metrics where every ascent/descent pair equals the given EM split.
    pub fn from_em(ascent: u16, descent: u16) -> Self {
        let (asc, desc) = (ascent as i16, -(descent as i16));
        Self {
            typo_ascender: asc,
            typo_descender: desc,
            typo_line_gap: 0,
            win_ascent: ascent,
            win_descent: descent,
            hhea_ascender: asc,
            hhea_descender: desc,
            hhea_line_gap: 0,
        }
    }

    fn scaled(self, factor: f64) -> Self {
        let i = |v: i16| (f64::from(v) * factor).round() as i16;
        let u = |v: u16| (f64::from(v) * factor).round() as u16;
        Self {
            typo_ascender: i(self.typo_ascender),
            typo_descender: i(self.typo_descender),
            typo_line_gap: i(self.typo_line_gap),
            win_ascent: u(self.win_ascent),
            win_descent: u(self.win_descent),
            hhea_ascender: i(self.hhea_ascender),
            hhea_descender: i(self.hhea_descender),
            hhea_line_gap: i(self.hhea_line_gap),
        }
    }
}

/// Bold/italic selection and weight class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleFlags {
    pub bold: bool,
    pub italic: bool,
    pub weight_class: u16,
}

impl Default for StyleFlags {
    fn default() -> Self {
        Self { bold: false, italic: false, weight_class: 400 }
    }
}

/// Source tables kept to seed the fields the writer does not recompute.
#[derive(Debug, Clone, Default)]
pub(crate) struct SourceTables {
    pub head: Option<Head>,
    pub hhea: Option<Hhea>,
    pub os2: Option<Os2>,
    pub post: Option<Post>,
}

#[derive(Debug, Clone)]
pub struct Font {
    pub(crate) glyphs: Vec<Glyph>,
    pub(crate) cmap: HashMap<u32, usize>,
    pub(crate) em: u16,
    pub(crate) ascent: u16,
    pub(crate) descent: u16,
    pub(crate) italic_angle: f64,
    pub(crate) metrics: VerticalMetrics,
    pub(crate) names: BTreeMap<u16, String>,
    pub(crate) vendor: Tag,
    pub(crate) style: StyleFlags,
    pub(crate) source: SourceTables,
    pub(crate) layout: BTreeMap<Tag, Vec<u8>>,
}

impl Font {
    /// An empty font with the given EM, split 80/20 between ascent and descent.
    pub fn new(em: u16) -> Self {
        let ascent = (f64::from(em) * 0.8).round() as u16;
        let descent = em - ascent;
        Self {
            glyphs: Vec::new(),
            cmap: HashMap::new(),
            em,
            ascent,
            descent,
            italic_angle: 0.0,
            metrics: VerticalMetrics::from_em(ascent, descent),
            names: BTreeMap::new(),
            vendor: Tag::new(b"NONE"),
            style: StyleFlags::default(),
            source: SourceTables::default(),
            layout: BTreeMap::new(),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| FontError::Io { path: path.to_path_buf(), source })?;
        let font = Self::from_bytes(&data)?;
        debug!("{}: {} glyphs, em {}", path.display(), font.glyph_count(), font.em);
        Ok(font)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        reader::read_font(data)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        writer::write_font(self)
    }

    /// Write the font as a TrueType file.
    pub fn generate(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = self.to_bytes()?;
        fs::write(path, data).map_err(|source| FontError::Io { path: path.to_path_buf(), source })
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn glyphs_mut(&mut self) -> impl Iterator<Item = &mut Glyph> {
        self.glyphs.iter_mut()
    }

    pub fn glyph_at(&self, index: usize) -> Option<&Glyph> {
        self.glyphs.get(index)
    }

    pub fn glyph_at_mut(&mut self, index: usize) -> Option<&mut Glyph> {
        self.glyphs.get_mut(index)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Encoded glyphs by ascending codepoint, followed by unencoded glyphs in
    /// glyph order.
    pub fn glyphs_by_encoding(&self) -> impl Iterator<Item = &Glyph> {
        let mut order: Vec<usize> = (0..self.glyphs.len()).collect();
        order.sort_by_key(|&i| {
            let unicode = self.glyphs[i].unicode();
            (unicode.is_none(), unicode, i)
        });
        order.into_iter().map(|i| &self.glyphs[i])
    }

    /// Index of the glyph whose primary codepoint is `codepoint`.
    ///
    /// Fails with [`FontError::EncodingOutOfRange`] for values that are not
    /// Unicode scalar values.
    pub fn glyph_index(&self, codepoint: u32) -> Result<Option<usize>> {
        check_encoding(codepoint)?;
        Ok(self.cmap.get(&codepoint).copied())
    }

    pub fn glyph(&self, codepoint: u32) -> Option<&Glyph> {
        self.cmap.get(&codepoint).map(|&i| &self.glyphs[i])
    }

    pub fn glyph_mut(&mut self, codepoint: u32) -> Option<&mut Glyph> {
        self.cmap.get(&codepoint).map(|&i| &mut self.glyphs[i])
    }

    /// Append a new, empty glyph at `codepoint`.
    pub fn create_glyph(&mut self, codepoint: u32, name: impl Into<String>) -> Result<usize> {
        check_encoding(codepoint)?;
        if self.cmap.contains_key(&codepoint) {
            return Err(FontError::GlyphExists(codepoint));
        }
        self.push_glyph(Glyph::new(name, Some(codepoint)))
    }

    /// The glyph at `codepoint`, created with a default name when missing.
    pub fn glyph_or_create(&mut self, codepoint: u32) -> Result<&mut Glyph> {
        let index = match self.glyph_index(codepoint)? {
            Some(index) => index,
            None => self.create_glyph(codepoint, default_glyph_name(codepoint))?,
        };
        Ok(&mut self.glyphs[index])
    }

    /// Append `glyph` and register its codepoint.
    pub fn push_glyph(&mut self, glyph: Glyph) -> Result<usize> {
        let index = self.glyphs.len();
        if let Some(codepoint) = glyph.unicode() {
            check_encoding(codepoint)?;
            if self.cmap.contains_key(&codepoint) {
                return Err(FontError::GlyphExists(codepoint));
            }
            self.cmap.insert(codepoint, index);
        }
        self.glyphs.push(glyph);
        Ok(index)
    }

    /// Decompose every component reference into plain contours.
    pub fn unlink_references(&mut self) {
        let by_name = self.name_index();
        let flattened: Vec<(usize, BezPath)> = self
            .glyphs
            .iter()
            .enumerate()
            .filter(|(_, glyph)| glyph.outline().has_components())
            .map(|(index, _)| (index, self.flatten(index, &by_name, 0)))
            .collect();

        debug!("decomposed {} composite glyphs", flattened.len());
        for (index, path) in flattened {
            *self.glyphs[index].outline_mut() = Outline::new(path);
        }
    }

    /// Contours of the glyph at `index` with all references decomposed.
    pub(crate) fn resolved_path(&self, index: usize) -> BezPath {
        if !self.glyphs[index].outline().has_components() {
            return self.glyphs[index].outline().path().clone();
        }
        self.flatten(index, &self.name_index(), 0)
    }

    fn flatten(&self, index: usize, by_name: &HashMap<&str, usize>, depth: usize) -> BezPath {
        let glyph = &self.glyphs[index];
        let mut flat = Outline::new(glyph.outline().path().clone());
        for component in glyph.outline().components() {
            if depth >= MAX_COMPONENT_DEPTH {
                warn!("'{}': component nesting too deep, dropping '{}'", glyph.name(), component.glyph);
                continue;
            }
            match by_name.get(component.glyph.as_str()) {
                Some(&child) => {
                    let path = self.flatten(child, by_name, depth + 1);
                    flat.append_path(&path, component.transform);
                }
                None => warn!("'{}' references missing glyph '{}'", glyph.name(), component.glyph),
            }
        }
        flat.path().clone()
    }

    fn name_index(&self) -> HashMap<&str, usize> {
        let mut index = HashMap::with_capacity(self.glyphs.len());
        for (i, glyph) in self.glyphs.iter().enumerate() {
            index.entry(glyph.name()).or_insert(i);
        }
        index
    }

    pub fn em(&self) -> u16 {
        self.em
    }

    /// Change units-per-em, scaling outlines, advance widths and metrics.
    /// Composite glyphs stay in proportion with the glyphs they reference.
    ///
    /// `GPOS` cannot be rescaled here and is dropped.
    pub fn set_em(&mut self, em: u16) {
        if em == self.em || em == 0 {
            return;
        }
        let factor = f64::from(em) / f64::from(self.em);
        debug!("rescaling em {} -> {em} (x{factor:.4})", self.em);

        for glyph in &mut self.glyphs {
            glyph.rescale(factor);
        }
        let scale_u = |v: u16| (f64::from(v) * factor).round() as u16;
        self.ascent = scale_u(self.ascent);
        self.descent = scale_u(self.descent);
        self.metrics = self.metrics.scaled(factor);

        if let Some(post) = &mut self.source.post {
            post.underline_position = scale_fword(post.underline_position.to_i16(), factor).into();
            post.underline_thickness = scale_fword(post.underline_thickness.to_i16(), factor).into();
        }
        if let Some(os2) = &mut self.source.os2 {
            os2.x_avg_char_width = scale_fword(os2.x_avg_char_width, factor);
            os2.y_strikeout_size = scale_fword(os2.y_strikeout_size, factor);
            os2.y_strikeout_position = scale_fword(os2.y_strikeout_position, factor);
            os2.sx_height = os2.sx_height.map(|v| scale_fword(v, factor));
            os2.s_cap_height = os2.s_cap_height.map(|v| scale_fword(v, factor));
        }
        if self.layout.remove(&GPOS).is_some() {
            warn!("GPOS cannot be rescaled to em {em}; dropped");
        }
        self.em = em;
    }

    /// Merge the glyphs of `other` into this font.
    ///
    /// Incoming glyphs are rescaled to this font's EM and decomposed. A glyph
    /// already present here (same codepoint, or same name when unencoded)
    /// wins if it is worth outputting; a cleared placeholder is filled with
    /// the incoming outline and width; everything else is appended.
    pub fn merge_fonts(&mut self, other: &Font) {
        let factor = f64::from(self.em) / f64::from(other.em);
        let mut names: HashSet<String> = self.glyphs.iter().map(|g| g.name().to_owned()).collect();
        let by_name: HashMap<String, usize> = self
            .name_index()
            .into_iter()
            .map(|(name, i)| (name.to_owned(), i))
            .collect();
        let (mut kept, mut replaced, mut added) = (0usize, 0usize, 0usize);

        for (index, incoming) in other.glyphs.iter().enumerate() {
            if !incoming.is_worth_outputting() {
                continue;
            }
            let mut glyph = incoming.clone();
            *glyph.outline_mut() = Outline::new(other.resolved_path(index));
            if factor != 1.0 {
                glyph.transform(Affine::scale(factor));
            }

            let existing = match glyph.unicode() {
                Some(codepoint) => self.cmap.get(&codepoint).copied(),
                None => by_name.get(glyph.name()).copied(),
            };
            match existing {
                Some(slot) if self.glyphs[slot].is_worth_outputting() => kept += 1,
                Some(slot) => {
                    self.glyphs[slot].copy_from(&glyph);
                    replaced += 1;
                }
                None => {
                    let name = unique_name(glyph.name(), &names);
                    names.insert(name.clone());
                    glyph.set_name(name);
                    let slot = self.glyphs.len();
                    if let Some(codepoint) = glyph.unicode() {
                        self.cmap.insert(codepoint, slot);
                    }
                    self.glyphs.push(glyph);
                    added += 1;
                }
            }
        }
        debug!("merge: {added} added, {replaced} replaced, {kept} kept");
    }

    /// Drop every GSUB and GPOS lookup.
    pub fn remove_lookups(&mut self) {
        for tag in [GSUB, GPOS] {
            if self.layout.remove(&tag).is_some() {
                debug!("removed {tag} lookups");
            }
        }
    }

    pub fn has_layout_table(&self, tag: Tag) -> bool {
        self.layout.contains_key(&tag)
    }

    pub fn ascent(&self) -> u16 {
        self.ascent
    }

    pub fn descent(&self) -> u16 {
        self.descent
    }

    pub fn set_ascent(&mut self, ascent: u16) {
        self.ascent = ascent;
    }

    pub fn set_descent(&mut self, descent: u16) {
        self.descent = descent;
    }

    pub fn italic_angle(&self) -> f64 {
        self.italic_angle
    }

    pub fn set_italic_angle(&mut self, degrees: f64) {
        self.italic_angle = degrees;
    }

    pub fn metrics(&self) -> &VerticalMetrics {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut VerticalMetrics {
        &mut self.metrics
    }

    pub fn style_flags(&self) -> StyleFlags {
        self.style
    }

    pub fn set_style_flags(&mut self, style: StyleFlags) {
        self.style = style;
    }

    pub fn vendor(&self) -> Tag {
        self.vendor
    }

    /// Set the OS/2 vendor id from the first four characters of `vendor`,
    /// padded with spaces.
    pub fn set_vendor(&mut self, vendor: &str) {
        let mut tag = [b' '; 4];
        for (slot, byte) in tag.iter_mut().zip(vendor.bytes().filter(u8::is_ascii)) {
            *slot = byte;
        }
        self.vendor = Tag::new(&tag);
    }

    pub fn name(&self, name_id: u16) -> Option<&str> {
        self.names.get(&name_id).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = (u16, &str)> {
        self.names.iter().map(|(id, value)| (*id, value.as_str()))
    }

    pub fn set_name(&mut self, name_id: u16, value: impl Into<String>) {
        self.names.insert(name_id, value.into());
    }

    /// Set the family name. Typographic family/subfamily entries are removed
    /// so that applications fall back to the legacy names.
    pub fn set_family_name(&mut self, family: impl Into<String>) {
        self.set_name(NAME_ID_FAMILY, family);
        self.names.remove(&NAME_ID_TYPO_FAMILY);
        self.names.remove(&NAME_ID_TYPO_SUBFAMILY);
    }
}

fn check_encoding(codepoint: u32) -> Result<()> {
    char::from_u32(codepoint)
        .map(|_| ())
        .ok_or(FontError::EncodingOutOfRange(codepoint))
}

fn scale_fword(value: i16, factor: f64) -> i16 {
    (f64::from(value) * factor).round() as i16
}

pub(crate) fn default_glyph_name(codepoint: u32) -> String {
    if codepoint <= 0xFFFF {
        format!("uni{codepoint:04X}")
    } else {
        format!("u{codepoint:X}")
    }
}

fn unique_name(name: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(name) {
        return name.to_owned();
    }
    (1..)
        .map(|n| format!("{name}.{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_owned())
}
