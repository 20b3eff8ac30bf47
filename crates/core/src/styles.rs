//! The four merged styles and the source styles they are built from.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleDescriptor {
    /// Substituted into `JP_FONT`.
    pub east_asian: &'static str,
    /// Substituted into `ENG_FONT`.
    pub latin: &'static str,
    /// Used in output file names and the PostScript/full names.
    pub merged: &'static str,
    pub italic: bool,
}

impl StyleDescriptor {
    pub const fn new(
        east_asian: &'static str,
        latin: &'static str,
        merged: &'static str,
        italic: bool,
    ) -> Self {
        Self { east_asian, latin, merged, italic }
    }

    pub fn is_bold(&self) -> bool {
        self.merged.starts_with("Bold")
    }

    pub fn weight_class(&self) -> u16 {
        if self.is_bold() { 700 } else { 400 }
    }

    /// Name table subfamily, e.g. `Bold Italic` for `BoldItalic`.
    pub fn subfamily(&self) -> String {
        match self.merged.strip_suffix("Italic") {
            Some(base) if !base.is_empty() => format!("{base} Italic"),
            _ => self.merged.to_string(),
        }
    }
}

impl fmt::Display for StyleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.merged)
    }
}

pub const STYLES: &[StyleDescriptor] = &[
    StyleDescriptor::new("Regular", "400-Regular", "Regular", false),
    StyleDescriptor::new("Bold", "700-Regular", "Bold", false),
    StyleDescriptor::new("Regular", "400-Italic", "Italic", true),
    StyleDescriptor::new("Bold", "700-Italic", "BoldItalic", true),
];
