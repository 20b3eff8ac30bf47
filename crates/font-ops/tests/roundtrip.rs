//! Write fonts with the TrueType writer and read them back.

use read_fonts::{FontRef, TableProvider};
use wabun_font_ops::{
    Affine, AltUnicode, Font, Glyph, NAME_ID_FAMILY, NAME_ID_POSTSCRIPT, Outline, StyleFlags,
    VerticalMetrics,
};

fn make_font() -> Font {
    let mut font = Font::new(1000);
    font.push_glyph(Glyph::new(".notdef", None).with_width(500)).unwrap();
    font.push_glyph(Glyph::new("space", Some(0x20)).with_width(600)).unwrap();
    font.push_glyph(
        Glyph::new("A", Some(0x41))
            .with_width(600)
            .with_outline(Outline::rect(50.0, 0.0, 550.0, 700.0))
            .with_alt_unicodes(vec![AltUnicode::new(0x391, None)]),
    )
    .unwrap();
    font.push_glyph(
        Glyph::new("B", Some(0x42))
            .with_width(600)
            .with_outline(Outline::rect(60.0, 0.0, 540.0, 700.0)),
    )
    .unwrap();
    font.push_glyph(
        Glyph::new("uni3042", Some(0x3042))
            .with_width(1000)
            .with_outline(Outline::rect(100.0, -100.0, 900.0, 800.0)),
    )
    .unwrap();
    font
}

#[test]
fn test_roundtrip_glyphs_and_cmap() {
    let mut font = make_font();
    font.glyph_mut(0x42).unwrap().clear();

    let data = font.to_bytes().unwrap();
    let read = Font::from_bytes(&data).unwrap();

    assert_eq!(read.glyph_count(), 5);
    assert_eq!(read.em(), 1000);

    let a = read.glyph(0x41).unwrap();
    assert_eq!(a.name(), "A");
    assert_eq!(a.width(), 600);
    assert_eq!(a.alt_unicodes(), &[AltUnicode::new(0x391, None)]);
    let bounds = a.outline().bounds().unwrap();
    assert_eq!((bounds.x0, bounds.y1), (50.0, 700.0));

    assert_eq!(read.glyph(0x20).unwrap().width(), 600);
    assert!(read.glyph(0x42).is_none());
    assert_eq!(read.glyph_at(3).unwrap().name(), "B");
    assert_eq!(read.glyph(0x3042).unwrap().width(), 1000);
}

#[test]
fn test_roundtrip_metadata() {
    let mut font = make_font();
    font.set_family_name("Wabun Mono");
    font.set_name(NAME_ID_POSTSCRIPT, "WabunMono-Bold");
    font.set_vendor("WABN");
    font.set_style_flags(StyleFlags { bold: true, italic: false, weight_class: 700 });
    *font.metrics_mut() = VerticalMetrics {
        typo_ascender: 880,
        typo_descender: -120,
        typo_line_gap: 0,
        win_ascent: 950,
        win_descent: 225,
        hhea_ascender: 950,
        hhea_descender: -225,
        hhea_line_gap: 0,
    };

    let data = font.to_bytes().unwrap();
    let raw = FontRef::new(&data).unwrap();
    let os2 = raw.os2().unwrap();
    assert_eq!(os2.s_typo_ascender(), 880);
    assert_eq!(os2.us_win_descent(), 225);
    assert_eq!(os2.us_weight_class(), 700);
    assert_eq!(raw.hhea().unwrap().ascender().to_i16(), 950);
    assert_eq!(raw.head().unwrap().mac_style().bits() & 1, 1);

    let read = Font::from_bytes(&data).unwrap();
    assert_eq!(read.name(NAME_ID_FAMILY), Some("Wabun Mono"));
    assert_eq!(read.name(NAME_ID_POSTSCRIPT), Some("WabunMono-Bold"));
    assert_eq!(read.vendor().to_string(), "WABN");
    assert!(read.style_flags().bold);
    assert!(!read.style_flags().italic);
    assert_eq!(read.metrics().win_ascent, 950);
}

#[test]
fn test_roundtrip_skewed_outline() {
    let mut font = make_font();
    font.set_italic_angle(-9.0);
    for glyph in font.glyphs_mut() {
        glyph.transform(Affine::skew(9f64.to_radians().tan(), 0.0));
    }

    let data = font.to_bytes().unwrap();
    let read = Font::from_bytes(&data).unwrap();
    assert_eq!(read.italic_angle(), -9.0);

    let glyph = read.glyph(0x3042).unwrap();
    assert_eq!(glyph.width(), 1000);
    let bounds = glyph.outline().bounds().unwrap();
    assert!(bounds.x1 > 900.0);
}

#[test]
fn test_generate_writes_file() {
    let dir = std::env::temp_dir().join(format!("wabun-font-ops-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("test.ttf");

    make_font().generate(&path).unwrap();
    let read = Font::open(&path).unwrap();
    assert_eq!(read.glyph_count(), 5);

    std::fs::remove_dir_all(&dir).unwrap();
}
