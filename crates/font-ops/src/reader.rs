//! OpenType reading.
//!
//! `glyf` outlines are read point by point so composite glyphs keep their
//! references; anything else (CFF, CFF2) is drawn through skrifa.

use std::collections::{BTreeMap, HashSet};

use kurbo::{Affine, BezPath, Point};
use log::{debug, warn};
use read_fonts::{
    FontRef, TableProvider,
    tables::glyf::{self, Anchor, CurvePoint},
    types::{GlyphId, GlyphId16, Tag},
};
use skrifa::{
    MetadataProvider,
    charmap::MapVariant,
    instance::{LocationRef, Size},
    outline::{DrawSettings, OutlinePen},
};
use write_fonts::from_obj::ToOwnedTable;

use crate::{
    error::{FontError, Result},
    font::{Font, GDEF, GPOS, GSUB, StyleFlags, VerticalMetrics, default_glyph_name},
    glyph::{AltUnicode, Glyph},
    outline::{Component, Outline},
};

const PLATFORM_WINDOWS: u16 = 3;
const LANGUAGE_EN_US: u16 = 0x409;
const FS_SELECTION_ITALIC: u16 = 1 << 0;
const FS_SELECTION_BOLD: u16 = 1 << 5;

pub(crate) fn read_font(data: &[u8]) -> Result<Font> {
    let font = FontRef::new(data)?;
    let num_glyphs = font.maxp()?.num_glyphs() as usize;
    let head = font.head()?;
    let mut result = Font::new(head.units_per_em());

    let (unicodes, mut alternates) = read_cmap(data, num_glyphs)?;
    let names = glyph_names(&font, &unicodes);
    let mut outlines = match read_glyf(&font, &names)? {
        Some(outlines) => outlines,
        None => draw_outlines(&font, data, num_glyphs)?,
    };
    let hmtx = font.hmtx()?;

    for gid in 0..num_glyphs {
        let advance = hmtx.advance(GlyphId::new(gid as u32)).unwrap_or(0);
        let glyph = Glyph::new(names[gid].clone(), unicodes[gid])
            .with_width(advance)
            .with_outline(std::mem::take(&mut outlines[gid]))
            .with_alt_unicodes(std::mem::take(&mut alternates[gid]));
        result.push_glyph(glyph)?;
    }

    read_metrics(&font, &mut result)?;
    result.names = read_names(&font);
    result.source.head = Some(head.to_owned_table());
    result.source.hhea = font.hhea().ok().map(|t| t.to_owned_table());
    result.source.os2 = font.os2().ok().map(|t| t.to_owned_table());
    result.source.post = font.post().ok().map(|t| t.to_owned_table());
    for tag in [GDEF, GSUB, GPOS] {
        if let Some(table) = font.table_data(tag) {
            result.layout.insert(tag, table.as_bytes().to_vec());
        }
    }
    Ok(result)
}

/// Primary codepoint and alternates per glyph. The lowest codepoint mapped
/// to a glyph becomes its primary one.
fn read_cmap(data: &[u8], num_glyphs: usize) -> Result<(Vec<Option<u32>>, Vec<Vec<AltUnicode>>)> {
    let font = skrifa::FontRef::new(data).map_err(|e| FontError::GlyphAccess(e.to_string()))?;
    let charmap = font.charmap();

    let mut codepoints: Vec<Vec<u32>> = vec![Vec::new(); num_glyphs];
    for (codepoint, gid) in charmap.mappings() {
        let gid = gid.to_u32() as usize;
        if gid > 0 && gid < num_glyphs {
            codepoints[gid].push(codepoint);
        }
    }

    let mut unicodes = Vec::with_capacity(num_glyphs);
    let mut alternates = Vec::with_capacity(num_glyphs);
    for mut cps in codepoints {
        cps.sort_unstable();
        cps.dedup();
        let mut cps = cps.into_iter();
        unicodes.push(cps.next());
        alternates.push(cps.map(|cp| AltUnicode::new(cp, None)).collect::<Vec<_>>());
    }

    let mut sequences = 0usize;
    for (codepoint, selector, variant) in charmap.variant_mappings() {
        let gid = match variant {
            MapVariant::UseDefault => charmap.map(codepoint),
            MapVariant::Variant(gid) => Some(gid),
        };
        if let Some(entry) = gid.and_then(|gid| alternates.get_mut(gid.to_u32() as usize)) {
            entry.push(AltUnicode::new(codepoint, Some(selector)));
            sequences += 1;
        }
    }
    if sequences > 0 {
        debug!("{sequences} variation sequences");
    }
    Ok((unicodes, alternates))
}

fn glyph_names(font: &FontRef, unicodes: &[Option<u32>]) -> Vec<String> {
    let post = font.post().ok();
    let names: Vec<String> = unicodes
        .iter()
        .enumerate()
        .map(|(gid, unicode)| {
            let stored = post
                .as_ref()
                .and_then(|post| post.glyph_name(GlyphId16::new(gid as u16)))
                .filter(|name| !name.is_empty());
            match (stored, unicode) {
                (Some(name), _) => name.to_owned(),
                (None, Some(cp)) => default_glyph_name(*cp),
                (None, None) if gid == 0 => ".notdef".to_owned(),
                (None, None) => format!("glyph{gid}"),
            }
        })
        .collect();

    let unique: HashSet<&str> = names.iter().map(String::as_str).collect();
    if unique.len() != names.len() {
        debug!("{} duplicate glyph names", names.len() - unique.len());
    }
    names
}

fn read_glyf(font: &FontRef, names: &[String]) -> Result<Option<Vec<Outline>>> {
    let (Ok(glyf), Ok(loca)) = (font.glyf(), font.loca(None)) else {
        return Ok(None);
    };
    let outlines = (0..names.len())
        .map(|gid| {
            Ok(match loca.get_glyf(GlyphId::new(gid as u32), &glyf)? {
                Some(glyf::Glyph::Simple(simple)) => Outline::new(simple_path(&simple)),
                Some(glyf::Glyph::Composite(composite)) => {
                    composite_outline(&composite, names, &names[gid])
                }
                None => Outline::default(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(outlines))
}

fn simple_path(glyph: &glyf::SimpleGlyph) -> BezPath {
    let points: Vec<CurvePoint> = glyph.points().collect();
    let mut path = BezPath::new();
    let mut start = 0usize;
    for end in glyph.end_pts_of_contours() {
        let end = end.get() as usize + 1;
        if end <= start || end > points.len() {
            break;
        }
        append_contour(&mut path, &points[start..end]);
        start = end;
    }
    path
}

/// Append one closed TrueType contour, expanding implied on-curve points
/// between consecutive off-curve points.
fn append_contour(path: &mut BezPath, contour: &[CurvePoint]) {
    let point = |p: &CurvePoint| Point::new(f64::from(p.x), f64::from(p.y));

    let (start, rest): (Point, Vec<&CurvePoint>) = match contour.iter().position(|p| p.on_curve) {
        Some(i) => (point(&contour[i]), contour[i + 1..].iter().chain(&contour[..i]).collect()),
        None => {
            let (Some(first), Some(last)) = (contour.first(), contour.last()) else {
                return;
            };
            (point(last).midpoint(point(first)), contour.iter().collect())
        }
    };

    path.move_to(start);
    let mut control: Option<Point> = None;
    for p in rest {
        let current = point(p);
        match (p.on_curve, control.take()) {
            (true, Some(c)) => path.quad_to(c, current),
            (true, None) => path.line_to(current),
            (false, Some(c)) => {
                path.quad_to(c, c.midpoint(current));
                control = Some(current);
            }
            (false, None) => control = Some(current),
        }
    }
    if let Some(c) = control {
        path.quad_to(c, start);
    }
    path.close_path();
}

fn composite_outline(glyph: &glyf::CompositeGlyph, names: &[String], owner: &str) -> Outline {
    let components = glyph
        .components()
        .filter_map(|component| {
            let Some(name) = names.get(component.glyph.to_u16() as usize) else {
                warn!(
                    "'{owner}' references glyph {} past the end of the font",
                    component.glyph.to_u16()
                );
                return None;
            };
            let (dx, dy) = match component.anchor {
                Anchor::Offset { x, y } => (f64::from(x), f64::from(y)),
                Anchor::Point { .. } => {
                    warn!("'{owner}': point-matched component '{name}' placed at origin");
                    (0.0, 0.0)
                }
            };
            let t = component.transform;
            let affine = Affine::new([
                f64::from(t.xx.to_f32()),
                f64::from(t.yx.to_f32()),
                f64::from(t.xy.to_f32()),
                f64::from(t.yy.to_f32()),
                dx,
                dy,
            ]);
            Some(Component::new(name.clone(), affine))
        })
        .collect();
    Outline::with_components(BezPath::new(), components)
}

/// Collects skrifa drawing commands into a kurbo path.
#[derive(Default)]
struct PathPen(BezPath);

impl OutlinePen for PathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to((f64::from(x), f64::from(y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to((f64::from(x), f64::from(y)));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.0
            .quad_to((f64::from(cx0), f64::from(cy0)), (f64::from(x), f64::from(y)));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.0.curve_to(
            (f64::from(cx0), f64::from(cy0)),
            (f64::from(cx1), f64::from(cy1)),
            (f64::from(x), f64::from(y)),
        );
    }

    fn close(&mut self) {
        self.0.close_path();
    }
}

fn draw_outlines(font: &FontRef, data: &[u8], num_glyphs: usize) -> Result<Vec<Outline>> {
    let has_cff = [Tag::new(b"CFF "), Tag::new(b"CFF2")]
        .into_iter()
        .any(|tag| font.table_data(tag).is_some());
    if !has_cff {
        return Err(FontError::NoOutlines);
    }

    let font = skrifa::FontRef::new(data).map_err(|e| FontError::GlyphAccess(e.to_string()))?;
    let outlines = font.outline_glyphs();
    (0..num_glyphs)
        .map(|gid| {
            let Some(glyph) = outlines.get(skrifa::GlyphId::new(gid as u32)) else {
                return Ok(Outline::default());
            };
            let mut pen = PathPen::default();
            glyph
                .draw(DrawSettings::unhinted(Size::unscaled(), LocationRef::default()), &mut pen)
                .map_err(|e| FontError::Draw { gid: gid as u32, reason: e.to_string() })?;
            Ok(Outline::new(pen.0))
        })
        .collect()
}

fn read_metrics(font: &FontRef, result: &mut Font) -> Result<()> {
    let hhea = font.hhea()?;
    let descent = (-i32::from(hhea.descender().to_i16())).clamp(0, i32::from(result.em)) as u16;
    result.descent = descent;
    result.ascent = result.em - descent;

    let mut metrics = VerticalMetrics::from_em(result.ascent, result.descent);
    metrics.hhea_ascender = hhea.ascender().to_i16();
    metrics.hhea_descender = hhea.descender().to_i16();
    metrics.hhea_line_gap = hhea.line_gap().to_i16();

    if let Ok(os2) = font.os2() {
        metrics.typo_ascender = os2.s_typo_ascender();
        metrics.typo_descender = os2.s_typo_descender();
        metrics.typo_line_gap = os2.s_typo_line_gap();
        metrics.win_ascent = os2.us_win_ascent();
        metrics.win_descent = os2.us_win_descent();

        let selection = os2.fs_selection().bits();
        result.style = StyleFlags {
            bold: selection & FS_SELECTION_BOLD != 0,
            italic: selection & FS_SELECTION_ITALIC != 0,
            weight_class: os2.us_weight_class(),
        };
        result.vendor = os2.ach_vend_id();
    }
    result.metrics = metrics;

    if let Ok(post) = font.post() {
        result.italic_angle = post.italic_angle().to_f64();
    }
    Ok(())
}

fn read_names(font: &FontRef) -> BTreeMap<u16, String> {
    let mut names = BTreeMap::new();
    let Ok(name) = font.name() else {
        return names;
    };
    for record in name.name_record() {
        if record.platform_id() != PLATFORM_WINDOWS || record.language_id() != LANGUAGE_EN_US {
            continue;
        }
        if let Ok(value) = record.string(name.string_data()) {
            names.insert(record.name_id().to_u16(), value.chars().collect());
        }
    }
    names
}
