//! A collected page: canvas geometry plus everything a serializer needs
//! to paint it.

use barprint_core::{Affine, DualColor, Geometry, MM_PER_INCH};

use crate::settings::{ColorModel, ExportSettings};

/// PostScript points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / MM_PER_INCH;

/// Geometry on the final canvas, in millimetres with y down.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub width_mm: f64,
    pub height_mm: f64,
    pub geometry: Geometry,
    pub title: Option<String>,
    pub creator: String,
    pub foreground: DualColor,
    pub background: DualColor,
    /// Whether `background` is painted over the canvas.
    pub opaque_background: bool,
    pub color_model: ColorModel,
}

impl Page {
    /// A page with paint and metadata taken from `settings`.
    #[must_use]
    pub fn new(settings: &ExportSettings, geometry: Geometry) -> Self {
        Self {
            width_mm: settings.width_mm,
            height_mm: settings.height_mm,
            geometry,
            title: settings.title.clone(),
            creator: settings.creator.clone(),
            foreground: settings.foreground,
            background: settings.background,
            opaque_background: settings.opaque_background,
            color_model: settings.color_model,
        }
    }

    /// The background to paint, or `None` for a transparent canvas.
    #[must_use]
    pub const fn painted_background(&self) -> Option<DualColor> {
        if self.opaque_background {
            Some(self.background)
        } else {
            None
        }
    }

    #[must_use]
    pub fn width_pt(&self) -> f64 {
        self.width_mm * PT_PER_MM
    }

    #[must_use]
    pub fn height_pt(&self) -> f64 {
        self.height_mm * PT_PER_MM
    }

    /// Map millimetres with y down onto points with y up.
    #[must_use]
    pub fn to_points(&self) -> Affine {
        Affine::scale(PT_PER_MM, -PT_PER_MM).then(&Affine::translate(0.0, self.height_pt()))
    }
}
