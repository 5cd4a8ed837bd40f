//! Export configuration: output formats, color model, resolution, and the
//! per-export settings record.

use std::fmt;
use std::str::FromStr;

use barprint_core::{DualColor, Orientation};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Which half of a [`DualColor`] vector formats emit.
///
/// Raster formats always use RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorModel {
    #[default]
    Rgb,
    Cmyk,
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Eps,
    Svg,
    Png,
    Bmp,
    Jpeg,
}

impl ExportFormat {
    pub const ALL: [Self; 6] = [
        Self::Pdf,
        Self::Eps,
        Self::Svg,
        Self::Png,
        Self::Bmp,
        Self::Jpeg,
    ];

    /// Guess the format from a file extension, ignoring case and a leading
    /// dot.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "eps" | "epsf" | "epsi" => Some(Self::Eps),
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            "bmp" | "dib" => Some(Self::Bmp),
            "jpg" | "jpeg" | "jpe" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Canonical file extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Eps => "eps",
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Jpeg => "jpg",
        }
    }

    #[must_use]
    pub const fn is_raster(self) -> bool {
        matches!(self, Self::Png | Self::Bmp | Self::Jpeg)
    }

    /// Whether the format can carry an alpha channel.
    #[must_use]
    pub const fn supports_alpha(self) -> bool {
        matches!(self, Self::Png)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pdf => "pdf",
            Self::Eps => "eps",
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Jpeg => "jpeg",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s)
            .ok_or_else(|| ExportError::InvalidArgument(format!("unknown export format: {s:?}")))
    }
}

/// Device resolution in dots per inch, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Resolution {
    #[must_use]
    pub const fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// The same resolution on both axes.
    #[must_use]
    pub const fn uniform(dpi: f64) -> Self {
        Self::new(dpi, dpi)
    }

    /// # Errors
    ///
    /// Returns [`ExportError::InvalidArgument`] unless both axes are finite
    /// and positive.
    pub fn validate(&self) -> Result<(), ExportError> {
        if positive(self.horizontal) && positive(self.vertical) {
            Ok(())
        } else {
            Err(ExportError::InvalidArgument(format!(
                "resolution must be positive, got {}x{} dpi",
                self.horizontal, self.vertical
            )))
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::uniform(ExportSettings::DEFAULT_RASTER_DPI)
    }
}

/// Settings for one export call.
///
/// Owned and mutated by the caller between exports; the exporter only
/// reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Canvas width in millimetres, after orientation.
    pub width_mm: f64,

    /// Canvas height in millimetres, after orientation.
    pub height_mm: f64,

    /// Document title, where the format has a slot for one.
    pub title: Option<String>,

    /// Creating application, recorded in EPS and PDF metadata.
    pub creator: String,

    /// Paint the background color over the whole canvas.
    ///
    /// When `false`, vector formats leave the canvas transparent and PNG
    /// gains an alpha channel.  BMP and JPEG have no alpha and always
    /// paint the background.
    pub opaque_background: bool,

    pub foreground: DualColor,

    pub background: DualColor,

    /// Color model for vector output.
    pub color_model: ColorModel,

    pub orientation: Orientation,

    /// Resolution of the TIFF preview embedded in EPS output.  `0` writes
    /// plain EPS without a preview.
    pub preview_dpi: u32,

    /// Target device resolution.
    ///
    /// When set, vector output snaps module sizes to whole device dots.
    /// Raster output always renders at this resolution, falling back to
    /// [`DEFAULT_RASTER_DPI`](Self::DEFAULT_RASTER_DPI).
    pub device_resolution: Option<Resolution>,
}

impl ExportSettings {
    pub const DEFAULT_WIDTH_MM: f64 = 50.0;
    pub const DEFAULT_HEIGHT_MM: f64 = 50.0;
    pub const DEFAULT_RASTER_DPI: f64 = 300.0;

    /// Resolution raster output is rendered at.
    #[must_use]
    pub fn raster_resolution(&self) -> Resolution {
        self.device_resolution.unwrap_or_default()
    }

    /// Background color to paint, if the background is opaque.
    #[must_use]
    pub const fn painted_background(&self) -> Option<DualColor> {
        if self.opaque_background {
            Some(self.background)
        } else {
            None
        }
    }

    /// Check the caller contract.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidArgument`] for a non-positive or
    /// non-finite canvas size or device resolution.
    pub fn validate(&self) -> Result<(), ExportError> {
        if !(positive(self.width_mm) && positive(self.height_mm)) {
            return Err(ExportError::InvalidArgument(format!(
                "canvas size must be positive, got {}x{} mm",
                self.width_mm, self.height_mm
            )));
        }
        if let Some(resolution) = &self.device_resolution {
            resolution.validate()?;
        }
        Ok(())
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            width_mm: Self::DEFAULT_WIDTH_MM,
            height_mm: Self::DEFAULT_HEIGHT_MM,
            title: None,
            creator: concat!("barprint ", env!("CARGO_PKG_VERSION")).to_string(),
            opaque_background: true,
            foreground: DualColor::BLACK,
            background: DualColor::WHITE,
            color_model: ColorModel::Rgb,
            orientation: Orientation::Rotate0,
            preview_dpi: 0,
            device_resolution: None,
        }
    }
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}
