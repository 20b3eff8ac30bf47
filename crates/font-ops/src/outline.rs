//! Glyph outlines.
//!
//! An [`Outline`] owns its contours as a [`BezPath`] plus any component
//! references that have not been decomposed yet. The pipeline never looks at
//! individual points; it only moves outlines around with affine transforms.

use kurbo::{Affine, BezPath, PathEl, Rect, Shape};

/// A reference to another glyph in the same font, by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub glyph: String,
    pub transform: Affine,
}

impl Component {
    pub fn new(glyph: impl Into<String>, transform: Affine) -> Self {
        Self { glyph: glyph.into(), transform }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    path: BezPath,
    components: Vec<Component>,
}

impl Outline {
    pub fn new(path: BezPath) -> Self {
        Self { path, components: Vec::new() }
    }

    pub fn with_components(path: BezPath, components: Vec<Component>) -> Self {
        Self { path, components }
    }

    /// Axis-aligned rectangle contour, mostly useful for building test fonts.
    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let mut path = BezPath::new();
        path.move_to((x0, y0));
        path.line_to((x0, y1));
        path.line_to((x1, y1));
        path.line_to((x1, y0));
        path.close_path();
        Self::new(path)
    }

    pub fn path(&self) -> &BezPath {
        &self.path
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn has_contours(&self) -> bool {
        self.path
            .elements()
            .iter()
            .any(|el| !matches!(el, PathEl::MoveTo(_) | PathEl::ClosePath))
    }

    pub fn has_components(&self) -> bool {
        !self.components.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_contours() && !self.has_components()
    }

    pub fn clear(&mut self) {
        self.path = BezPath::new();
        self.components.clear();
    }

    /// Apply `affine` to contours and to every component placement.
    pub fn apply(&mut self, affine: Affine) {
        self.path.apply_affine(affine);
        for component in &mut self.components {
            component.transform = affine * component.transform;
        }
    }

    /// Scale contours by `factor` for a new units-per-em.
    ///
    /// The referenced glyphs are rescaled too, so a component keeps its
    /// linear part and only its offset is scaled.
    pub(crate) fn rescale(&mut self, factor: f64) {
        let scale = Affine::scale(factor);
        self.path.apply_affine(scale);
        for component in &mut self.components {
            component.transform = scale * component.transform * scale.inverse();
        }
    }

    /// Bounds of the contours, ignoring components.
    pub fn bounds(&self) -> Option<Rect> {
        self.has_contours().then(|| self.path.bounding_box())
    }

    /// Append `path` transformed by `affine` to the contours.
    pub(crate) fn append_path(&mut self, path: &BezPath, affine: Affine) {
        self.path.extend(path.elements().iter().map(|el| affine * *el));
    }
}
