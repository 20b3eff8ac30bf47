//! Build configuration loaded from `build.ini`.
//!
//! Every key lives in the `[DEFAULT]` section (a section-less preamble is
//! accepted too) and is matched case-insensitively. All keys are required;
//! a missing or malformed key fails the build before any font or directory
//! is touched.

use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use ini::{Ini, Properties};

use crate::error::BuildError;

const DEFAULT_SECTION: &str = "DEFAULT";

/// Placeholder in `JP_FONT`/`ENG_FONT` replaced by a style tag.
pub const STYLE_PLACEHOLDER: &str = "{style}";

/// Icon font location relative to `SOURCE_FONTS_DIR`.
pub const ICON_FONT_PATH: &str = "nerd-fonts/SymbolsNerdFont-Regular.ttf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub version: String,
    pub font_name: String,
    pub jp_font: String,
    pub eng_font: String,
    pub source_fonts_dir: PathBuf,
    pub build_fonts_dir: PathBuf,
    pub vender_name: String,
    pub fontforge_prefix: String,
    pub ideographic_space: String,
    pub half_width_str: String,
    pub invisible_zenkaku_space_str: String,
    pub jpdoc_str: String,
    pub nerd_fonts_str: String,
    pub em_ascent: u16,
    pub em_descent: u16,
    pub os2_ascent: u16,
    pub os2_descent: u16,
    pub half_width_12: u16,
    pub full_width_35: u16,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let path = path.as_ref();
        let text = read_to_string(path).map_err(|e| BuildError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&text, path)
    }

    pub fn from_ini_str(text: &str) -> Result<Self, BuildError> {
        Self::parse(text, Path::new("<memory>"))
    }

    fn parse(text: &str, origin: &Path) -> Result<Self, BuildError> {
        let ini = Ini::load_from_str(text).map_err(|e| BuildError::ConfigFile {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;
        let section = Section::new(&ini);

        let config = Self {
            version: section.string("VERSION")?,
            font_name: section.string("FONT_NAME")?,
            jp_font: section.string("JP_FONT")?,
            eng_font: section.string("ENG_FONT")?,
            source_fonts_dir: section.string("SOURCE_FONTS_DIR")?.into(),
            build_fonts_dir: section.string("BUILD_FONTS_DIR")?.into(),
            vender_name: section.string("VENDER_NAME")?,
            fontforge_prefix: section.string("FONTFORGE_PREFIX")?,
            ideographic_space: section.string("IDEOGRAPHIC_SPACE")?,
            half_width_str: section.string("HALF_WIDTH_STR")?,
            invisible_zenkaku_space_str: section.string("INVISIBLE_ZENKAKU_SPACE_STR")?,
            jpdoc_str: section.string("JPDOC_STR")?,
            nerd_fonts_str: section.string("NERD_FONTS_STR")?,
            em_ascent: section.integer("EM_ASCENT")?,
            em_descent: section.integer("EM_DESCENT")?,
            os2_ascent: section.integer("OS2_ASCENT")?,
            os2_descent: section.integer("OS2_DESCENT")?,
            half_width_12: section.integer("HALF_WIDTH_12")?,
            full_width_35: section.integer("FULL_WIDTH_35")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), BuildError> {
        match self.em_ascent.checked_add(self.em_descent) {
            Some(em) if (16..=16384).contains(&em) => {}
            _ => {
                return Err(BuildError::InvalidConfigValue {
                    key: "EM_DESCENT",
                    value: self.em_descent.to_string(),
                    reason: format!(
                        "EM_ASCENT + EM_DESCENT must be between 16 and 16384 (EM_ASCENT = {})",
                        self.em_ascent
                    ),
                });
            }
        }

        // Written as signed FWORDs to hhea and OS/2.
        for (key, value) in [("OS2_ASCENT", self.os2_ascent), ("OS2_DESCENT", self.os2_descent)] {
            if i16::try_from(value).is_err() {
                return Err(BuildError::InvalidConfigValue {
                    key,
                    value: value.to_string(),
                    reason: format!("must not exceed {}", i16::MAX),
                });
            }
        }
        Ok(())
    }

    /// Units per em of every emitted font.
    pub fn em(&self) -> u16 {
        self.em_ascent + self.em_descent
    }

    pub fn jp_font_path(&self, style: &str) -> PathBuf {
        self.source_fonts_dir.join(self.jp_font.replace(STYLE_PLACEHOLDER, style))
    }

    pub fn eng_font_path(&self, style: &str) -> PathBuf {
        self.source_fonts_dir.join(self.eng_font.replace(STYLE_PLACEHOLDER, style))
    }

    pub fn ideographic_space_path(&self) -> PathBuf {
        self.source_fonts_dir.join(&self.ideographic_space)
    }

    pub fn icon_font_path(&self) -> PathBuf {
        self.source_fonts_dir.join(ICON_FONT_PATH)
    }
}

/// Case-insensitive view over the `[DEFAULT]` section, falling back to the
/// keys that precede any section header.
struct Section<'a> {
    sections: Vec<&'a Properties>,
}

impl<'a> Section<'a> {
    fn new(ini: &'a Ini) -> Self {
        let sections = ini
            .section(Some(DEFAULT_SECTION))
            .into_iter()
            .chain(Some(ini.general_section()))
            .collect();
        Self { sections }
    }

    fn get(&self, key: &'static str) -> Option<&'a str> {
        self.sections.iter().copied().find_map(|props| {
            props
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }

    fn string(&self, key: &'static str) -> Result<String, BuildError> {
        self.get(key).map(str::to_owned).ok_or(BuildError::MissingConfigKey(key))
    }

    fn integer(&self, key: &'static str) -> Result<u16, BuildError> {
        let value = self.get(key).ok_or(BuildError::MissingConfigKey(key))?;
        value.trim().parse().map_err(|e: std::num::ParseIntError| {
            BuildError::InvalidConfigValue { key, value: value.to_owned(), reason: e.to_string() }
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE: &str = r#"[DEFAULT]
VERSION = v0.0.1
FONT_NAME = Wabun Mono
JP_FONT = BIZUDGothic-{style}.ttf
ENG_FONT = CommitMono-{style}.ttf
SOURCE_FONTS_DIR = source
BUILD_FONTS_DIR = build
VENDER_NAME = WABN
FONTFORGE_PREFIX = fontforge_
IDEOGRAPHIC_SPACE = ideographic_space.sfd
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
"#;

    #[test]
    fn test_parse_sample() {
        let config = Config::from_ini_str(SAMPLE).unwrap();
        assert_eq!(config.font_name, "Wabun Mono");
        assert_eq!(config.em(), 1000);
        assert_eq!(config.half_width_12, 500);
        assert_eq!(config.build_fonts_dir, PathBuf::from("build"));
        assert_eq!(
            config.jp_font_path("Bold"),
            PathBuf::from("source").join("BIZUDGothic-Bold.ttf")
        );
        assert_eq!(
            config.eng_font_path("700-Italic"),
            PathBuf::from("source").join("CommitMono-700-Italic.ttf")
        );
        assert_eq!(
            config.icon_font_path(),
            PathBuf::from("source").join("nerd-fonts/SymbolsNerdFont-Regular.ttf")
        );
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let lowered = SAMPLE.replace("FONT_NAME", "font_name");
        let config = Config::from_ini_str(&lowered).unwrap();
        assert_eq!(config.font_name, "Wabun Mono");
    }

    #[test]
    fn test_missing_key() {
        let text = SAMPLE.replace("OS2_DESCENT = 225\n", "");
        let err = Config::from_ini_str(&text).unwrap_err();
        assert!(matches!(err, BuildError::MissingConfigKey("OS2_DESCENT")));
    }

    #[test]
    fn test_non_integer_value() {
        let text = SAMPLE.replace("EM_ASCENT = 880", "EM_ASCENT = tall");
        let err = Config::from_ini_str(&text).unwrap_err();
        assert!(matches!(err, BuildError::InvalidConfigValue { key: "EM_ASCENT", .. }));
    }

    #[test]
    fn test_zero_em_rejected() {
        let text = SAMPLE
            .replace("EM_ASCENT = 880", "EM_ASCENT = 0")
            .replace("EM_DESCENT = 120", "EM_DESCENT = 0");
        assert!(Config::from_ini_str(&text).is_err());
    }

    #[test]
    fn test_os2_metrics_must_fit_fword() {
        let text = SAMPLE.replace("OS2_ASCENT = 950", "OS2_ASCENT = 40000");
        let err = Config::from_ini_str(&text).unwrap_err();
        assert!(matches!(err, BuildError::InvalidConfigValue { key: "OS2_ASCENT", .. }));

        let text = SAMPLE.replace("OS2_DESCENT = 225", "OS2_DESCENT = 32768");
        let err = Config::from_ini_str(&text).unwrap_err();
        assert!(matches!(err, BuildError::InvalidConfigValue { key: "OS2_DESCENT", .. }));

        let text = SAMPLE.replace("OS2_ASCENT = 950", "OS2_ASCENT = 32767");
        assert!(Config::from_ini_str(&text).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load("does-not-exist/build.ini").unwrap_err();
        assert!(matches!(err, BuildError::ConfigFile { .. }));
    }
}
