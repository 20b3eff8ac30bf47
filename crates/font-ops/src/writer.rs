//! TrueType writing.
//!
//! Every glyph is written in order, including cleared ones, so glyph ids in
//! the passthrough layout tables keep pointing at the same glyphs. Only
//! glyphs worth outputting are mapped in `cmap`.

use std::collections::BTreeMap;

use kurbo::{BezPath, CubicBez, PathEl, Point};
use read_fonts::types::NameId;
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::Cmap,
        glyf::{GlyfLocaBuilder, SimpleGlyph},
        head::{Flags, Head, MacStyle},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::{Os2, SelectionFlags},
        post::Post,
    },
    types::{FWord, Fixed, GlyphId, LongDateTime, UfWord},
};

use crate::{
    error::{FontError, Result},
    font::Font,
};

/// Maximum distance between a cubic segment and its quadratic approximation.
const CUBIC_TO_QUAD_ACCURACY: f64 = 1.0;

const PLATFORM_WINDOWS: u16 = 3;
const ENCODING_UNICODE_BMP: u16 = 1;
const LANGUAGE_EN_US: u16 = 0x409;

const FS_SELECTION_ITALIC: u16 = 1 << 0;
const FS_SELECTION_BOLD: u16 = 1 << 5;
const FS_SELECTION_REGULAR: u16 = 1 << 6;
const MAC_STYLE_BOLD: u16 = 1 << 0;
const MAC_STYLE_ITALIC: u16 = 1 << 1;

/// Running glyph statistics for `head`, `hhea` and `maxp`.
#[derive(Debug, Default)]
struct Extents {
    x_min: Option<i16>,
    y_min: Option<i16>,
    x_max: Option<i16>,
    y_max: Option<i16>,
    min_lsb: Option<i16>,
    min_rsb: Option<i16>,
    advance_max: u16,
    max_points: u16,
    max_contours: u16,
}

impl Extents {
    fn add(&mut self, advance: u16, glyph: Option<&SimpleGlyph>) {
        self.advance_max = self.advance_max.max(advance);
        let Some(glyph) = glyph else {
            return;
        };
        let bbox = glyph.bbox;
        self.x_min = Some(self.x_min.map_or(bbox.x_min, |v| v.min(bbox.x_min)));
        self.y_min = Some(self.y_min.map_or(bbox.y_min, |v| v.min(bbox.y_min)));
        self.x_max = Some(self.x_max.map_or(bbox.x_max, |v| v.max(bbox.x_max)));
        self.y_max = Some(self.y_max.map_or(bbox.y_max, |v| v.max(bbox.y_max)));
        self.min_lsb = Some(self.min_lsb.map_or(bbox.x_min, |v| v.min(bbox.x_min)));
        let rsb = (i32::from(advance) - i32::from(bbox.x_max))
            .clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
        self.min_rsb = Some(self.min_rsb.map_or(rsb, |v| v.min(rsb)));

        let points: usize = glyph.contours.iter().map(|c| c.len()).sum();
        self.max_points = self.max_points.max(points.min(u16::MAX as usize) as u16);
        self.max_contours =
            self.max_contours.max(glyph.contours.len().min(u16::MAX as usize) as u16);
    }
}

pub(crate) fn write_font(font: &Font) -> Result<Vec<u8>> {
    let num_glyphs = u16::try_from(font.glyph_count())
        .map_err(|_| FontError::TooManyGlyphs(font.glyph_count()))?;

    let mut glyf_builder = GlyfLocaBuilder::new();
    let mut h_metrics = Vec::with_capacity(font.glyph_count());
    let mut extents = Extents::default();
    for (index, glyph) in font.glyphs().iter().enumerate() {
        let simple = simple_glyph(glyph.name(), &font.resolved_path(index))?;
        match &simple {
            Some(simple) => glyf_builder.add_glyph(simple)?,
            None => glyf_builder.add_glyph(&SimpleGlyph::default())?,
        };
        let side_bearing = simple.as_ref().map_or(0, |s| s.bbox.x_min);
        h_metrics.push(LongMetric { advance: glyph.width(), side_bearing });
        extents.add(glyph.width(), simple.as_ref());
    }
    let (glyf, loca, loca_format) = glyf_builder.build();

    let mut builder = FontBuilder::new();
    builder.add_table(&build_head(font, &extents, loca_format))?;
    builder.add_table(&build_hhea(font, &extents, num_glyphs))?;
    builder.add_table(&build_maxp(&extents, num_glyphs))?;
    builder.add_table(&build_os2(font, &h_metrics))?;
    builder.add_table(&Hmtx::new(h_metrics, Vec::new()))?;
    builder.add_table(&build_cmap(font)?)?;
    builder.add_table(&glyf)?;
    builder.add_table(&loca)?;
    builder.add_table(&build_post(font))?;
    builder.add_table(&build_name(font))?;
    for (tag, data) in &font.layout {
        builder.add_raw(*tag, data.as_slice());
    }
    Ok(builder.build())
}

/// Convert a decomposed path into a `glyf` simple glyph, or `None` when the
/// path draws nothing.
fn simple_glyph(name: &str, path: &BezPath) -> Result<Option<SimpleGlyph>> {
    let path = quadratic_path(path);
    if path.elements().is_empty() {
        return Ok(None);
    }
    let mut glyph = SimpleGlyph::from_bezpath(&path).map_err(|e| FontError::MalformedOutline {
        glyph: name.to_owned(),
        reason: format!("{e:?}"),
    })?;
    glyph.recompute_bounding_box();
    Ok((!glyph.contours.is_empty()).then_some(glyph))
}

/// Approximate cubic segments with quadratics and drop subpaths that draw
/// nothing.
fn quadratic_path(path: &BezPath) -> BezPath {
    let mut result = BezPath::new();
    let mut subpath: Vec<PathEl> = Vec::new();
    let mut current = Point::ZERO;

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                flush(&mut subpath, &mut result);
                subpath.push(PathEl::MoveTo(p));
                current = p;
            }
            PathEl::LineTo(p) => {
                subpath.push(PathEl::LineTo(p));
                current = p;
            }
            PathEl::QuadTo(c, p) => {
                subpath.push(PathEl::QuadTo(c, p));
                current = p;
            }
            PathEl::CurveTo(c1, c2, p) => {
                let cubic = CubicBez::new(current, c1, c2, p);
                for (_, _, quad) in cubic.to_quads(CUBIC_TO_QUAD_ACCURACY) {
                    subpath.push(PathEl::QuadTo(quad.p1, quad.p2));
                }
                current = p;
            }
            PathEl::ClosePath => subpath.push(PathEl::ClosePath),
        }
    }
    flush(&mut subpath, &mut result);
    result
}

fn flush(subpath: &mut Vec<PathEl>, result: &mut BezPath) {
    if subpath.iter().any(|el| !matches!(el, PathEl::MoveTo(_) | PathEl::ClosePath)) {
        result.extend(subpath.drain(..));
    } else {
        subpath.clear();
    }
}

fn build_head(font: &Font, extents: &Extents, loca_format: LocaFormat) -> Head {
    let source = font.source.head.clone();
    let mut head = source.unwrap_or_else(|| Head {
        font_revision: Fixed::from_f64(1.0),
        checksum_adjustment: 0,
        magic_number: 0x5F0F3CF5,
        flags: Flags::empty(),
        units_per_em: font.em,
        created: LongDateTime::new(0),
        modified: LongDateTime::new(0),
        x_min: 0,
        y_min: 0,
        x_max: 0,
        y_max: 0,
        mac_style: MacStyle::empty(),
        lowest_rec_ppem: 8,
        font_direction_hint: 2,
        index_to_loc_format: 0,
    });
    head.checksum_adjustment = 0;
    head.units_per_em = font.em;
    head.x_min = extents.x_min.unwrap_or(0);
    head.y_min = extents.y_min.unwrap_or(0);
    head.x_max = extents.x_max.unwrap_or(0);
    head.y_max = extents.y_max.unwrap_or(0);
    head.index_to_loc_format = loca_format as i16;

    let mut mac_style = head.mac_style.bits() & !(MAC_STYLE_BOLD | MAC_STYLE_ITALIC);
    if font.style.bold {
        mac_style |= MAC_STYLE_BOLD;
    }
    if font.style.italic {
        mac_style |= MAC_STYLE_ITALIC;
    }
    head.mac_style = MacStyle::from_bits_truncate(mac_style);
    head
}

fn build_hhea(font: &Font, extents: &Extents, num_glyphs: u16) -> Hhea {
    let (caret_slope_rise, caret_slope_run) = if font.italic_angle == 0.0 {
        (1, 0)
    } else {
        let em = f64::from(font.em);
        let run = (-em * font.italic_angle.to_radians().tan()).round() as i16;
        (font.em as i16, run)
    };
    let metrics = &font.metrics;
    Hhea {
        ascender: FWord::new(metrics.hhea_ascender),
        descender: FWord::new(metrics.hhea_descender),
        line_gap: FWord::new(metrics.hhea_line_gap),
        advance_width_max: UfWord::new(extents.advance_max),
        min_left_side_bearing: FWord::new(extents.min_lsb.unwrap_or(0)),
        min_right_side_bearing: FWord::new(extents.min_rsb.unwrap_or(0)),
        x_max_extent: FWord::new(extents.x_max.unwrap_or(0)),
        caret_slope_rise,
        caret_slope_run,
        caret_offset: font.source.hhea.as_ref().map_or(0, |h| h.caret_offset),
        number_of_h_metrics: num_glyphs,
    }
}

fn build_maxp(extents: &Extents, num_glyphs: u16) -> Maxp {
    Maxp {
        num_glyphs,
        max_points: Some(extents.max_points),
        max_contours: Some(extents.max_contours),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(1),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    }
}

fn build_os2(font: &Font, h_metrics: &[LongMetric]) -> Os2 {
    let mut os2 = font.source.os2.clone().unwrap_or_else(default_os2);
    let metrics = &font.metrics;
    os2.s_typo_ascender = metrics.typo_ascender;
    os2.s_typo_descender = metrics.typo_descender;
    os2.s_typo_line_gap = metrics.typo_line_gap;
    os2.us_win_ascent = metrics.win_ascent;
    os2.us_win_descent = metrics.win_descent;
    os2.ach_vend_id = font.vendor;
    os2.us_weight_class = font.style.weight_class;

    let mut selection =
        os2.fs_selection.bits() & !(FS_SELECTION_ITALIC | FS_SELECTION_BOLD | FS_SELECTION_REGULAR);
    if font.style.italic {
        selection |= FS_SELECTION_ITALIC;
    }
    if font.style.bold {
        selection |= FS_SELECTION_BOLD;
    }
    if !font.style.italic && !font.style.bold {
        selection |= FS_SELECTION_REGULAR;
    }
    os2.fs_selection = SelectionFlags::from_bits_truncate(selection);

    let advances: Vec<u32> =
        h_metrics.iter().map(|m| u32::from(m.advance)).filter(|a| *a > 0).collect();
    if !advances.is_empty() {
        os2.x_avg_char_width = (advances.iter().sum::<u32>() / advances.len() as u32) as i16;
    }

    let mut codepoints = font
        .glyphs()
        .iter()
        .filter(|g| g.is_worth_outputting())
        .flat_map(|g| g.codepoints());
    if let Some(first) = codepoints.next() {
        let (min, max) = codepoints.fold((first, first), |(lo, hi), cp| (lo.min(cp), hi.max(cp)));
        os2.us_first_char_index = min.min(0xFFFF) as u16;
        os2.us_last_char_index = max.min(0xFFFF) as u16;
    }
    os2
}

fn default_os2() -> Os2 {
    Os2 {
        x_avg_char_width: 500,
        us_weight_class: 400,
        us_width_class: 5,
        fs_type: 0,
        y_subscript_x_size: 650,
        y_subscript_y_size: 600,
        y_subscript_x_offset: 0,
        y_subscript_y_offset: 75,
        y_superscript_x_size: 650,
        y_superscript_y_size: 600,
        y_superscript_x_offset: 0,
        y_superscript_y_offset: 350,
        y_strikeout_size: 50,
        y_strikeout_position: 300,
        s_family_class: 0,
        panose_10: [0; 10],
        ul_unicode_range_1: 0,
        ul_unicode_range_2: 0,
        ul_unicode_range_3: 0,
        ul_unicode_range_4: 0,
        ach_vend_id: write_fonts::types::Tag::new(b"NONE"),
        fs_selection: SelectionFlags::REGULAR,
        us_first_char_index: 0x20,
        us_last_char_index: 0x7E,
        s_typo_ascender: 800,
        s_typo_descender: -200,
        s_typo_line_gap: 0,
        us_win_ascent: 800,
        us_win_descent: 200,
        ul_code_page_range_1: Some(0),
        ul_code_page_range_2: Some(0),
        sx_height: Some(500),
        s_cap_height: Some(700),
        us_default_char: Some(0),
        us_break_char: Some(0x20),
        us_max_context: Some(0),
        us_lower_optical_point_size: None,
        us_upper_optical_point_size: None,
    }
}

/// Primary codepoints and selector-less alternates of every glyph worth
/// outputting. The first glyph to claim a codepoint keeps it.
fn build_cmap(font: &Font) -> Result<Cmap> {
    let mut mappings: BTreeMap<char, GlyphId> = BTreeMap::new();
    for (gid, glyph) in font.glyphs().iter().enumerate() {
        if !glyph.is_worth_outputting() {
            continue;
        }
        for ch in glyph.codepoints().filter_map(char::from_u32) {
            mappings.entry(ch).or_insert_with(|| GlyphId::new(gid as u32));
        }
    }
    Cmap::from_mappings(mappings).map_err(|e| FontError::CmapConflict(e.to_string()))
}

fn build_post(font: &Font) -> Post {
    let mut post = Post::new_v2(font.glyphs().iter().map(|g| g.name()).collect::<Vec<_>>());
    if let Some(source) = &font.source.post {
        post.underline_position = source.underline_position;
        post.underline_thickness = source.underline_thickness;
        post.is_fixed_pitch = source.is_fixed_pitch;
    }
    post.italic_angle = Fixed::from_f64(font.italic_angle);
    post
}

fn build_name(font: &Font) -> Name {
    let records = font
        .names()
        .map(|(name_id, value)| {
            NameRecord::new(
                PLATFORM_WINDOWS,
                ENCODING_UNICODE_BMP,
                LANGUAGE_EN_US,
                NameId::new(name_id),
                value.to_owned().into(),
            )
        })
        .collect::<Vec<_>>();
    Name::new(records)
}
