//! The drawing surface symbols render onto, and the accumulator behind it.
//!
//! Symbol renderers only ever fill closed areas and place glyph outlines,
//! so [`DrawingSurface`] exposes exactly those operations plus font state.
//! There are no strokes, images, or clipping.
//!
//! [`ShapeAccumulator`] is the surface the exporter hands out.  It keeps
//! bar/module geometry ("marks") apart from glyph geometry ("text")
//! because the raster path fills them differently.

use serde::{Deserialize, Serialize};

use crate::geometry::{Affine, Path};

/// Default ascent as a fraction of the font size.
pub const DEFAULT_ASCENT: f64 = 0.8;
/// Default descent as a fraction of the font size.
pub const DEFAULT_DESCENT: f64 = 0.2;

/// A font selection.  `size` is in drawing units (millimetres).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f64,
    /// Ascent as a fraction of `size`.
    pub ascent: f64,
    /// Descent as a fraction of `size`.
    pub descent: f64,
}

impl Font {
    /// A font with the default ascent/descent proportions.
    #[must_use]
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
        }
    }

    /// The same face at a different size.
    #[must_use]
    pub fn with_size(&self, size: f64) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn metrics(&self) -> FontMetrics {
        FontMetrics {
            ascent: self.ascent * self.size,
            descent: self.descent * self.size,
            leading: 0.0,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("sans-serif", 3.0)
    }
}

/// Vertical metrics of a font at its size, in drawing units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontMetrics {
    pub ascent: f64,
    pub descent: f64,
    pub leading: f64,
}

impl FontMetrics {
    /// Baseline-to-baseline distance.
    #[must_use]
    pub fn line_height(&self) -> f64 {
        self.ascent + self.descent + self.leading
    }
}

/// Laid-out glyph outlines for a run of text.
///
/// The outline is in em units relative to the baseline origin, y down
/// (so ascenders have negative y).  Drawing scales it by the current font
/// size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlyphRun {
    pub text: String,
    pub outline: Path,
    /// Total advance width in em units.
    pub advance: f64,
}

impl GlyphRun {
    #[must_use]
    pub fn new(text: impl Into<String>, outline: Path, advance: f64) -> Self {
        Self {
            text: text.into(),
            outline,
            advance,
        }
    }

    /// The outline placed at baseline origin `(x, y)` for `font`.
    #[must_use]
    pub fn placed(&self, font: &Font, x: f64, y: f64) -> Path {
        self.outline
            .transformed(&Affine::scale(font.size, font.size).then(&Affine::translate(x, y)))
    }
}

/// The operations a symbol renderer may perform.
pub trait DrawingSurface {
    /// Fill a closed area with the foreground.
    fn fill_area(&mut self, area: &Path);

    /// Fill the outline of `glyphs` with its baseline origin at `(x, y)`,
    /// scaled by the current font.
    fn draw_glyph_outline(&mut self, glyphs: &GlyphRun, x: f64, y: f64);

    fn set_font(&mut self, font: Font);

    fn font(&self) -> &Font;

    /// Metrics of the current font.
    fn font_metrics(&self) -> FontMetrics {
        self.font().metrics()
    }

    /// Release the surface.  No operations follow.
    fn dispose(&mut self);
}

/// Accumulated geometry, split into marks and text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    /// Bars and modules.
    pub marks: Path,
    /// Character outlines.
    pub text: Path,
}

impl Geometry {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty() && self.text.is_empty()
    }

    /// Marks followed by text, as one path.
    #[must_use]
    pub fn combined(&self) -> Path {
        let mut all = self.marks.clone();
        all.append(&self.text);
        all
    }

    /// Both regions mapped through `transform`.
    #[must_use]
    pub fn transformed(&self, transform: &Affine) -> Self {
        Self {
            marks: self.marks.transformed(transform),
            text: self.text.transformed(transform),
        }
    }
}

/// A [`DrawingSurface`] that records everything drawn onto it.
///
/// Built once per export and consumed once through [`finish`](Self::finish).
/// Operations after [`dispose`](DrawingSurface::dispose) are ignored.
#[derive(Debug, Default)]
pub struct ShapeAccumulator {
    geometry: Geometry,
    font: Font,
    disposed: bool,
}

impl ShapeAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand over the recorded geometry.
    #[must_use]
    pub fn finish(self) -> Geometry {
        self.geometry
    }
}

impl DrawingSurface for ShapeAccumulator {
    fn fill_area(&mut self, area: &Path) {
        if !self.disposed {
            self.geometry.marks.append(area);
        }
    }

    fn draw_glyph_outline(&mut self, glyphs: &GlyphRun, x: f64, y: f64) {
        if !self.disposed {
            self.geometry.text.append(&glyphs.placed(&self.font, x, y));
        }
    }

    fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    fn font(&self) -> &Font {
        &self.font
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }
}
