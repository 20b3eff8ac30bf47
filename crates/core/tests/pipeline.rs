//! Drive the style pipeline over in-memory source fonts.

use std::{
    collections::HashMap,
    env::temp_dir,
    fs::remove_dir_all,
    path::{Path, PathBuf},
    process,
};

use wabun_core::{
    BuildError, BuildOptions, Config, FontSource, IconCache, PipelineContext, STYLES,
    VariantConfig, build, pipeline::{PipelineStage, STYLE_STEPS, StyleRun}, run_style,
};
use wabun_font_ops::{AltUnicode, Font, Glyph, NAME_ID_FAMILY, NAME_ID_POSTSCRIPT, Outline};

struct MemorySource {
    fonts: HashMap<PathBuf, Font>,
}

impl FontSource for MemorySource {
    fn load(&self, path: &Path) -> anyhow::Result<Font> {
        self.fonts
            .get(path)
            .cloned()
            .ok_or_else(|| BuildError::MissingSource(path.to_path_buf()).into())
    }
}

fn config(build_dir: &Path) -> Config {
    let text = format!(
        "[DEFAULT]
VERSION = v1.0.0
FONT_NAME = Wabun Mono
JP_FONT = BIZUDGothic-{{style}}.ttf
ENG_FONT = CommitMono-{{style}}.ttf
SOURCE_FONTS_DIR = source
BUILD_FONTS_DIR = {}
VENDER_NAME = WABN
FONTFORGE_PREFIX = fontforge_
IDEOGRAPHIC_SPACE = ideographic_space.ttf
HALF_WIDTH_STR = HW
INVISIBLE_ZENKAKU_SPACE_STR = 35
JPDOC_STR = JPDOC
NERD_FONTS_STR = NF
EM_ASCENT = 880
EM_DESCENT = 120
OS2_ASCENT = 950
OS2_DESCENT = 225
HALF_WIDTH_12 = 500
FULL_WIDTH_35 = 1000
",
        build_dir.display()
    );
    Config::from_ini_str(&text).unwrap()
}

fn glyph(name: &str, codepoint: Option<u32>, width: u16) -> Glyph {
    let w = f64::from(width);
    Glyph::new(name, codepoint)
        .with_width(width)
        .with_outline(Outline::rect(w * 0.1, 0.0, w * 0.9, 700.0))
}

fn font(em: u16, glyphs: Vec<Glyph>) -> Font {
    let mut font = Font::new(em);
    for glyph in glyphs {
        font.push_glyph(glyph).unwrap();
    }
    font
}

/// East-Asian source at a 2000-unit em.
fn east_asian() -> Font {
    font(
        2000,
        vec![
            glyph(".notdef", None, 2000),
            Glyph::new("uni3000", Some(0x3000)).with_width(2000),
            glyph("uni3042", Some(0x3042), 2000),
            glyph("A", Some(0x41), 1000),
            glyph("uniFF71", Some(0xFF71), 1000),
            glyph("uniFF08", Some(0xFF08), 2000),
            glyph("uniFF09", Some(0xFF09), 2000),
            glyph("uni9AD9", Some(0x9AD9), 2000)
                .with_alt_unicodes(vec![AltUnicode::new(0x9AD8, None)]),
            glyph("uni2502", Some(0x2502), 1000),
            glyph("uni25A0", Some(0x25A0), 2000),
        ],
    )
}

fn latin() -> Font {
    font(
        1000,
        vec![
            glyph(".notdef", None, 600),
            Glyph::new("space", Some(0x20)).with_width(600),
            glyph("zero", Some(0x30), 600),
            glyph("A", Some(0x41), 600),
            glyph("uni2502", Some(0x2502), 600),
            glyph("uni25A0", Some(0x25A0), 600),
        ],
    )
}

fn source(config: &Config) -> MemorySource {
    let mut fonts = HashMap::new();
    for style in STYLES {
        fonts.insert(config.jp_font_path(style.east_asian), east_asian());
        fonts.insert(config.eng_font_path(style.latin), latin());
    }
    fonts.insert(
        config.ideographic_space_path(),
        font(
            1000,
            vec![glyph("uni3000", Some(0x3000), 1000)],
        ),
    );
    fonts.insert(
        config.icon_font_path(),
        font(
            2048,
            vec![
                glyph(".notdef", None, 1024),
                glyph("uniF015", Some(0xF015), 1024),
                glyph("uniE0B2", Some(0xE0B2), 1024),
            ],
        ),
    );
    MemorySource { fonts }
}

fn scratch(name: &str) -> PathBuf {
    temp_dir().join(format!("wabun-pipeline-{name}-{}", process::id()))
}

#[test]
fn test_build_plain_variant() {
    let dir = scratch("plain");
    let config = config(&dir);
    let source = source(&config);

    let report = build(&config, &BuildOptions::default(), &source).unwrap();

    assert_eq!(report.outputs.len(), 8);
    assert!(report.outputs.iter().all(|path| path.is_file()));

    let jp = Font::open(dir.join("fontforge_WabunMono-Regular-jp.ttf")).unwrap();
    assert_eq!(jp.em(), 1000);
    assert!(jp.glyph(0x41).is_none());
    assert!(jp.glyph(0x2502).is_none());
    assert!(jp.glyph(0x25A0).is_none());
    assert_eq!(jp.glyph(0x3042).unwrap().width(), 1000);
    assert_eq!(jp.glyph(0xFF71).unwrap().width(), 600);
    assert_eq!(jp.glyph(0xFF08).unwrap().width(), 1000);
    assert_eq!(jp.glyph(0x9AD8).unwrap().width(), 1000);
    assert!(jp.glyph(0x3000).unwrap().outline().has_contours());
    assert_eq!(jp.name(NAME_ID_FAMILY), Some("Wabun Mono"));
    assert_eq!(jp.name(NAME_ID_POSTSCRIPT), Some("WabunMono-Regular"));
    assert_eq!(jp.metrics().typo_ascender, 880);
    assert_eq!(jp.metrics().typo_descender, -120);

    let eng = Font::open(dir.join("fontforge_WabunMono-Regular-eng.ttf")).unwrap();
    assert_eq!(eng.em(), 1000);
    assert_eq!(eng.glyph(0x41).unwrap().width(), 600);
    assert!(eng.glyph(0x2502).is_some());

    let italic = Font::open(dir.join("fontforge_WabunMono-BoldItalic-jp.ttf")).unwrap();
    assert_eq!(italic.italic_angle(), -9.0);
    assert!(italic.style_flags().bold);
    assert!(italic.style_flags().italic);

    remove_dir_all(&dir).unwrap();
}

#[test]
fn test_build_tagged_variant() {
    let dir = scratch("tagged");
    let config = config(&dir);
    let source = source(&config);
    let options = BuildOptions {
        variant: VariantConfig { half_width: true, jpdoc: true, nerd_font: true, ..Default::default() },
        ..Default::default()
    };

    build(&config, &options, &source).unwrap();

    let jp = Font::open(dir.join("fontforge_WabunMonoHWJPDOCNF-Regular-jp.ttf")).unwrap();
    assert_eq!(jp.name(NAME_ID_FAMILY), Some("Wabun Mono HWJPDOCNF"));
    assert_eq!(jp.glyph(0x25A0).unwrap().width(), 1000);
    assert_eq!(jp.glyph(0x2502).unwrap().width(), 500);
    assert_eq!(jp.glyph(0xFF71).unwrap().width(), 500);
    assert_eq!(jp.glyph(0x3042).unwrap().width(), 1000);
    assert_eq!(jp.glyph(0xF015).unwrap().width(), 500);
    assert!(jp.glyph(0xE0B2).is_some());
    assert_eq!(jp.metrics().typo_ascender, 950);

    let eng = Font::open(dir.join("fontforge_WabunMonoHWJPDOCNF-Regular-eng.ttf")).unwrap();
    assert_eq!(eng.glyph(0x30).unwrap().width(), 500);
    assert_eq!(eng.glyph(0x41).unwrap().width(), 500);
    assert!(eng.glyph(0x25A0).is_none());

    remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_source_names_style_and_stage() {
    let dir = scratch("missing");
    let config = config(&dir);
    let mut source = source(&config);
    source.fonts.remove(&config.eng_font_path("400-Regular"));
    let icons = IconCache::new();
    let ctx = PipelineContext::new(&config, VariantConfig::default(), &source, &icons);

    let err = run_style(&ctx, &STYLES[0]).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Regular: load failed"), "{message}");
    assert!(message.contains("source font not found"), "{message}");

    assert!(build(&config, &BuildOptions::default(), &source).is_err());
    assert!(!dir.join("fontforge_WabunMono-Regular-jp.ttf").exists());

    remove_dir_all(&dir).unwrap();
}

#[test]
fn test_widths_are_canonical_after_normalization() {
    let dir = scratch("stages");
    let config = config(&dir);
    let source = source(&config);
    let icons = IconCache::new();
    let ctx = PipelineContext::new(&config, VariantConfig::default(), &source, &icons);

    let mut run = StyleRun::load(&ctx, STYLES[2]).unwrap();
    for (stage, step_fn) in STYLE_STEPS {
        if !stage.is_enabled(&ctx.variant, &run.style) {
            continue;
        }
        step_fn(&ctx, &mut run).unwrap();
        if *stage == PipelineStage::NormalizeWidths {
            break;
        }
    }

    assert_eq!(run.east_asian.em(), config.em());
    assert_eq!(run.latin.em(), config.em());
    for glyph in run.east_asian.glyphs().iter().filter(|g| g.is_worth_outputting()) {
        assert!([0, 600, 1000].contains(&glyph.width()), "{} is {}", glyph.name(), glyph.width());
    }
}
