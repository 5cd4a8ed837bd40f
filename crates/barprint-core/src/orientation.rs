//! The eight symbol orientations and their geometric consequences.
//!
//! Rotations are clockwise in y-down drawing space.  Mirrored variants
//! flip the content horizontally first and then rotate.
//!
//! 0° and 180° (mirrored or not) are *flat*: the content keeps its
//! width/height assignment.  90° and 270° swap the two.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::Affine;
use crate::types::CoreError;

/// One of four rotations, each optionally mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    #[default]
    Rotate0,
    Rotate90,
    Rotate180,
    Rotate270,
    Mirror0,
    Mirror90,
    Mirror180,
    Mirror270,
}

impl Orientation {
    /// Every orientation, unmirrored first.
    pub const ALL: [Self; 8] = [
        Self::Rotate0,
        Self::Rotate90,
        Self::Rotate180,
        Self::Rotate270,
        Self::Mirror0,
        Self::Mirror90,
        Self::Mirror180,
        Self::Mirror270,
    ];

    /// Clockwise rotation in degrees.
    #[must_use]
    pub const fn degrees(self) -> u32 {
        match self {
            Self::Rotate0 | Self::Mirror0 => 0,
            Self::Rotate90 | Self::Mirror90 => 90,
            Self::Rotate180 | Self::Mirror180 => 180,
            Self::Rotate270 | Self::Mirror270 => 270,
        }
    }

    #[must_use]
    pub const fn is_mirrored(self) -> bool {
        matches!(
            self,
            Self::Mirror0 | Self::Mirror90 | Self::Mirror180 | Self::Mirror270
        )
    }

    /// True for the 0° and 180° families, which keep width and height.
    #[must_use]
    pub const fn is_flat(self) -> bool {
        self.degrees() % 180 == 0
    }

    /// Size of the unrotated content that fills a canvas of the given
    /// size: swapped for non-flat orientations.
    #[must_use]
    pub const fn content_size(self, canvas_width: f64, canvas_height: f64) -> (f64, f64) {
        if self.is_flat() {
            (canvas_width, canvas_height)
        } else {
            (canvas_height, canvas_width)
        }
    }

    /// Size of the canvas holding content of the given size.
    ///
    /// The swap is its own inverse, so this mirrors
    /// [`content_size`](Self::content_size).
    #[must_use]
    pub const fn canvas_size(self, content_width: f64, content_height: f64) -> (f64, f64) {
        self.content_size(content_width, content_height)
    }

    /// Transform mapping content coordinates (`0..w`, `0..h`) onto the
    /// canvas.  [`Rotate0`](Self::Rotate0) yields the identity.
    #[must_use]
    pub fn transform(self, content_width: f64, content_height: f64) -> Affine {
        let (w, h) = (content_width, content_height);
        let rotation = match self.degrees() {
            90 => Affine::new(0.0, 1.0, -1.0, 0.0, h, 0.0),
            180 => Affine::new(-1.0, 0.0, 0.0, -1.0, w, h),
            270 => Affine::new(0.0, -1.0, 1.0, 0.0, 0.0, w),
            _ => Affine::IDENTITY,
        };
        if self.is_mirrored() {
            Affine::new(-1.0, 0.0, 0.0, 1.0, w, 0.0).then(&rotation)
        } else {
            rotation
        }
    }

    /// Device resolution that governs quantization of 1-D (bar) content.
    ///
    /// Bars run across the content's x axis, which lands on the device's
    /// horizontal axis for flat orientations and the vertical axis
    /// otherwise.
    #[must_use]
    pub fn linear_resolution(self, horizontal_dpi: f64, vertical_dpi: f64) -> f64 {
        if self.is_flat() {
            horizontal_dpi
        } else {
            vertical_dpi
        }
    }

    /// Device resolution that governs quantization of 2-D (matrix) content.
    ///
    /// Square modules must fit on both axes, so this is always the smaller
    /// of the two resolutions, whatever the orientation.
    #[must_use]
    pub fn matrix_resolution(self, horizontal_dpi: f64, vertical_dpi: f64) -> f64 {
        horizontal_dpi.min(vertical_dpi)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.is_mirrored() { "mirror" } else { "rotate" };
        write!(f, "{prefix}{}", self.degrees())
    }
}

impl FromStr for Orientation {
    type Err = CoreError;

    /// Accepts the display form (`rotate90`, `mirror180`) or bare degrees
    /// (`90`, optionally prefixed with `m` for mirrored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let (mirrored, degrees) = if let Some(rest) = s.strip_prefix("mirror") {
            (true, rest)
        } else if let Some(rest) = s.strip_prefix("rotate") {
            (false, rest)
        } else if let Some(rest) = s.strip_prefix('m') {
            (true, rest)
        } else {
            (false, s.as_str())
        };
        Self::ALL
            .into_iter()
            .find(|o| o.is_mirrored() == mirrored && o.degrees().to_string() == degrees)
            .ok_or_else(|| CoreError::InvalidArgument(format!("unknown orientation: {s:?}")))
    }
}
