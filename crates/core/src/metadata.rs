//! Vertical metrics, naming and attribution for emitted fonts.

use wabun_font_ops::{
    Font, NAME_ID_COPYRIGHT, NAME_ID_FULL_NAME, NAME_ID_LICENSE, NAME_ID_LICENSE_URL,
    NAME_ID_POSTSCRIPT, NAME_ID_SUBFAMILY, NAME_ID_UNIQUE_ID, NAME_ID_VERSION, StyleFlags,
    VerticalMetrics,
};

use crate::{
    config::Config,
    styles::StyleDescriptor,
    variant::{VariantConfig, VariantNames},
};

pub const COPYRIGHT: &str = "[Commit Mono]
Copyright (c) Eigil Nikolajsen https://github.com/eigilnikolajsen/commit-mono

[BIZ UDGothic]
Copyright 2022 The BIZ UDGothic Project Authors https://github.com/googlefonts/morisawa-biz-ud-gothic

[Pending Mono]
Copyright 2022 Yuko Otawara
";

pub const LICENSE: &str = "This Font Software is licensed under the SIL Open Font License,
Version 1.1. This license is available with a FAQ
at: http://scripts.sil.org/OFL";

pub const LICENSE_URL: &str = "http://scripts.sil.org/OFL";

/// Metrics for an emitted font. Typo ascent/descent follow the em box, or the
/// taller OS/2 values when icons are merged.
pub fn vertical_metrics(config: &Config, variant: &VariantConfig) -> VerticalMetrics {
    let (typo_ascender, typo_descender) = if variant.nerd_font {
        (config.os2_ascent, config.os2_descent)
    } else {
        (config.em_ascent, config.em_descent)
    };
    VerticalMetrics {
        typo_ascender: to_fword(typo_ascender),
        typo_descender: -to_fword(typo_descender),
        typo_line_gap: 0,
        win_ascent: config.os2_ascent,
        win_descent: config.os2_descent,
        hhea_ascender: to_fword(config.os2_ascent),
        hhea_descender: -to_fword(config.os2_descent),
        hhea_line_gap: 0,
    }
}

/// `Config` rejects metrics above `i16::MAX`, so the saturation never applies
/// to a loaded configuration.
fn to_fword(value: u16) -> i16 {
    i16::try_from(value).unwrap_or(i16::MAX)
}

/// Write metrics, names, vendor and style bits for one style of a variant.
pub fn apply_metadata(
    font: &mut Font,
    config: &Config,
    variant: &VariantConfig,
    names: &VariantNames<'_>,
    style: &StyleDescriptor,
) {
    font.set_ascent(config.em_ascent);
    font.set_descent(config.em_descent);
    *font.metrics_mut() = vertical_metrics(config, variant);

    let postscript = names.postscript_name(style);
    font.set_name(NAME_ID_LICENSE, LICENSE);
    font.set_name(NAME_ID_LICENSE_URL, LICENSE_URL);
    font.set_name(NAME_ID_VERSION, config.version.as_str());
    font.set_family_name(names.family());
    font.set_name(NAME_ID_SUBFAMILY, style.subfamily());
    font.set_name(NAME_ID_FULL_NAME, names.full_name(style));
    font.set_name(
        NAME_ID_UNIQUE_ID,
        format!("{};{};{postscript}", config.version, config.vender_name),
    );
    font.set_name(NAME_ID_POSTSCRIPT, postscript);
    font.set_name(NAME_ID_COPYRIGHT, COPYRIGHT);

    font.set_vendor(&config.vender_name);
    font.set_style_flags(StyleFlags {
        bold: style.is_bold(),
        italic: style.italic,
        weight_class: style.weight_class(),
    });
}

#[cfg(test)]
mod tests {
    use wabun_font_ops::NAME_ID_FAMILY;

    use super::*;
    use crate::{config::tests::SAMPLE, styles::STYLES};

    fn config() -> Config {
        Config::from_ini_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_typo_metrics_follow_em_box() {
        let metrics = vertical_metrics(&config(), &VariantConfig::default());
        assert_eq!((metrics.typo_ascender, metrics.typo_descender), (880, -120));
        assert_eq!((metrics.win_ascent, metrics.win_descent), (950, 225));
        assert_eq!((metrics.hhea_ascender, metrics.hhea_descender), (950, -225));
        assert_eq!(metrics.hhea_line_gap, 0);
    }

    #[test]
    fn test_typo_metrics_grow_with_icons() {
        let variant = VariantConfig { nerd_font: true, ..Default::default() };
        let metrics = vertical_metrics(&config(), &variant);
        assert_eq!((metrics.typo_ascender, metrics.typo_descender), (950, -225));
    }

    #[test]
    fn test_apply_metadata() {
        let config = config();
        let variant = VariantConfig { jpdoc: true, ..Default::default() };
        let names = variant.names(&config);
        let mut font = Font::new(1000);
        font.set_name(wabun_font_ops::NAME_ID_TYPO_FAMILY, "Source Family");

        apply_metadata(&mut font, &config, &variant, &names, &STYLES[3]);

        assert_eq!(font.ascent(), 880);
        assert_eq!(font.descent(), 120);
        assert_eq!(font.name(NAME_ID_FAMILY), Some("Wabun Mono JPDOC"));
        assert_eq!(font.name(NAME_ID_SUBFAMILY), Some("Bold Italic"));
        assert_eq!(font.name(NAME_ID_FULL_NAME), Some("Wabun Mono JPDOC BoldItalic"));
        assert_eq!(font.name(NAME_ID_POSTSCRIPT), Some("WabunMonoJPDOC-BoldItalic"));
        assert_eq!(
            font.name(NAME_ID_UNIQUE_ID),
            Some("v0.0.1;WABN;WabunMonoJPDOC-BoldItalic")
        );
        assert_eq!(font.name(NAME_ID_VERSION), Some("v0.0.1"));
        assert_eq!(font.name(NAME_ID_LICENSE_URL), Some(LICENSE_URL));
        assert_eq!(font.name(NAME_ID_COPYRIGHT), Some(COPYRIGHT));
        assert_eq!(font.name(wabun_font_ops::NAME_ID_TYPO_FAMILY), None);
        assert_eq!(font.vendor().to_string(), "WABN");
        let flags = font.style_flags();
        assert!(flags.bold && flags.italic);
        assert_eq!(flags.weight_class, 700);
    }

    #[test]
    fn test_styles_differ_only_in_style_names() {
        let config = config();
        let variant = VariantConfig::default();
        let names = variant.names(&config);
        let fonts: Vec<Font> = STYLES
            .iter()
            .map(|style| {
                let mut font = Font::new(1000);
                apply_metadata(&mut font, &config, &variant, &names, style);
                font
            })
            .collect();

        let style_bound = [NAME_ID_SUBFAMILY, NAME_ID_FULL_NAME, NAME_ID_POSTSCRIPT, NAME_ID_UNIQUE_ID];
        for font in &fonts[1..] {
            assert_eq!(font.metrics(), fonts[0].metrics());
            for (id, value) in font.names() {
                if !style_bound.contains(&id) {
                    assert_eq!(fonts[0].name(id), Some(value));
                }
            }
        }
    }
}
