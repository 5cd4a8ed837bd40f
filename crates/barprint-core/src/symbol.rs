//! Drawable symbols.
//!
//! Encoders hand over either a finished bar outline ([`LinearSymbol`]) or a
//! module matrix, which is chunked into a [`Symbol`].  Both implement
//! [`Drawable`]: given a [`Frame`] in millimetres and, optionally, the
//! device resolution that governs them, they fill their geometry onto a
//! [`DrawingSurface`].
//!
//! # Quantization
//!
//! Low-resolution printers cannot place edges between device dots.  When a
//! resolution is supplied the module size is snapped down to a whole
//! number of dots (never below one) and the symbol is centred in the
//! frame.  Matrix symbols snap both axes with the same square module.
//! Linear symbols only snap the module width; bar height is free.

use serde::{Deserialize, Serialize};

use crate::chunk::{Chunk, chunk_matrix};
use crate::geometry::{Affine, Path};
use crate::matrix::ModuleMatrix;
use crate::orientation::Orientation;
use crate::surface::{DrawingSurface, Font, GlyphRun};
use crate::types::{CoreError, Rect};

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Whether a symbol is a 1-D bar pattern or a 2-D module matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Linear,
    Matrix,
}

impl SymbolKind {
    /// The device resolution that governs quantization for this kind of
    /// content in the given orientation.
    ///
    /// Linear content follows the axis its bars run across; matrix content
    /// always takes the smaller resolution.
    #[must_use]
    pub fn governing_resolution(
        self,
        orientation: Orientation,
        horizontal_dpi: f64,
        vertical_dpi: f64,
    ) -> f64 {
        match self {
            Self::Linear => orientation.linear_resolution(horizontal_dpi, vertical_dpi),
            Self::Matrix => orientation.matrix_resolution(horizontal_dpi, vertical_dpi),
        }
    }
}

/// The box a symbol is drawn into, in unrotated content space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Width in millimetres.
    pub width: f64,
    /// Height in millimetres.
    pub height: f64,
    /// Device dots per inch governing module quantization, if any.
    pub resolution: Option<f64>,
}

impl Frame {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            resolution: None,
        }
    }

    #[must_use]
    pub const fn with_resolution(self, dpi: f64) -> Self {
        Self {
            resolution: Some(dpi),
            ..self
        }
    }

    /// Snap a module size to whole device dots when a usable resolution is
    /// set.
    #[must_use]
    pub fn quantize(&self, module_mm: f64) -> f64 {
        match self.resolution {
            Some(dpi) if dpi.is_finite() && dpi > 0.0 => {
                let dots = (module_mm * dpi / MM_PER_INCH + 1e-9).floor().max(1.0);
                dots * MM_PER_INCH / dpi
            }
            _ => module_mm,
        }
    }

    /// Whether content of `width` x `height` mm spills past the frame.
    ///
    /// Only possible after [`quantize`](Self::quantize) has rounded a
    /// module up to one whole dot.
    #[must_use]
    pub fn overflows(&self, width: f64, height: f64) -> bool {
        width > self.width + 1e-9 || height > self.height + 1e-9
    }
}

/// Something that can render itself onto a [`DrawingSurface`].
pub trait Drawable {
    fn kind(&self) -> SymbolKind;

    /// Fill the symbol's geometry into `frame`, whose origin is the
    /// surface origin.
    fn draw(&self, surface: &mut dyn DrawingSurface, frame: &Frame);
}

/// A 2-D symbol reduced to chunks, with its quiet zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    chunks: Vec<Chunk>,
    width: u32,
    height: u32,
}

impl Symbol {
    /// Chunk `matrix` and surround it with `quiet_zone` blank modules.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] if the matrix has a zero
    /// dimension or is too large.
    pub fn from_matrix<M: ModuleMatrix + ?Sized>(
        matrix: &M,
        quiet_zone: u32,
    ) -> Result<Self, CoreError> {
        let chunks = chunk_matrix(matrix, quiet_zone)?;
        // chunk_matrix has verified both sums fit in u32.
        let pad = quiet_zone * 2;
        let width = u32::try_from(matrix.width()).unwrap_or(u32::MAX - pad) + pad;
        let height = u32::try_from(matrix.height()).unwrap_or(u32::MAX - pad) + pad;
        Ok(Self {
            chunks,
            width,
            height,
        })
    }

    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Width in modules, quiet zone included.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in modules, quiet zone included.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Side of one square module drawn into `frame`, in millimetres.
    #[must_use]
    pub fn module_size(&self, frame: &Frame) -> f64 {
        let fit = (frame.width / f64::from(self.width)).min(frame.height / f64::from(self.height));
        frame.quantize(fit)
    }
}

impl Drawable for Symbol {
    fn kind(&self) -> SymbolKind {
        SymbolKind::Matrix
    }

    fn draw(&self, surface: &mut dyn DrawingSurface, frame: &Frame) {
        let module = self.module_size(frame);
        let (w, h) = (
            f64::from(self.width) * module,
            f64::from(self.height) * module,
        );
        if frame.overflows(w, h) {
            log::warn!(
                "{}x{} module symbol needs {w:.3}x{h:.3} mm, frame is {}x{} mm",
                self.width,
                self.height,
                frame.width,
                frame.height,
            );
        }
        let ox = f64::from(self.width).mul_add(-module, frame.width) / 2.0;
        let oy = f64::from(self.height).mul_add(-module, frame.height) / 2.0;

        for chunk in &self.chunks {
            surface.fill_area(&Path::rect(Rect::new(
                f64::from(chunk.x).mul_add(module, ox),
                f64::from(chunk.y).mul_add(module, oy),
                f64::from(chunk.width) * module,
                f64::from(chunk.height) * module,
            )));
        }
    }
}

/// A glyph run positioned along a linear symbol, in modules from the left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPlacement {
    pub run: GlyphRun,
    pub x: f64,
}

/// A 1-D symbol: bar outlines plus an optional human-readable line.
///
/// Bar geometry is in module units: x spans `0..width`, y spans
/// `0..height`.  Text sits below the bars in the font given to
/// [`with_text`](Self::with_text), whose size is in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSymbol {
    bars: Path,
    width: f64,
    height: f64,
    font: Font,
    text: Vec<TextPlacement>,
}

impl LinearSymbol {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] unless `width` and `height`
    /// are finite and positive.
    pub fn new(bars: Path, width: f64, height: f64) -> Result<Self, CoreError> {
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(CoreError::InvalidArgument(format!(
                "linear symbol size must be positive, got {width}x{height} modules"
            )));
        }
        Ok(Self {
            bars,
            width,
            height,
            font: Font::default(),
            text: Vec::new(),
        })
    }

    /// Build bars from alternating bar/space widths, starting with a bar.
    ///
    /// `quiet_zone` blank modules are added on both sides.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] if the pattern is empty or
    /// all zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use barprint_core::{Drawable, LinearSymbol, SymbolKind};
    ///
    /// let symbol = LinearSymbol::from_widths(&[1, 1, 2, 1, 1], 10, 0).unwrap();
    /// assert_eq!(symbol.width(), 6.0);
    /// assert_eq!(symbol.kind(), SymbolKind::Linear);
    /// ```
    pub fn from_widths(widths: &[u32], height: u32, quiet_zone: u32) -> Result<Self, CoreError> {
        let total: u64 = widths.iter().map(|w| u64::from(*w)).sum();
        if total == 0 {
            return Err(CoreError::InvalidArgument(
                "bar pattern has no modules".to_string(),
            ));
        }
        let h = f64::from(height.max(1));
        let mut bars = Path::new();
        let mut x = f64::from(quiet_zone);
        for (i, w) in widths.iter().enumerate() {
            let w = f64::from(*w);
            if i % 2 == 0 && w > 0.0 {
                bars.push_rect(Rect::new(x, 0.0, w, h));
            }
            x += w;
        }
        Self::new(bars, x + f64::from(quiet_zone), h)
    }

    /// Attach a human-readable line set in `font`.
    #[must_use]
    pub fn with_text(mut self, font: Font, text: Vec<TextPlacement>) -> Self {
        self.font = font;
        self.text = text;
        self
    }

    /// Width in modules.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Bar height in modules.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn bars(&self) -> &Path {
        &self.bars
    }

    /// Width of one module drawn into `frame`, in millimetres.
    #[must_use]
    pub fn module_width(&self, frame: &Frame) -> f64 {
        frame.quantize(frame.width / self.width)
    }
}

impl Drawable for LinearSymbol {
    fn kind(&self) -> SymbolKind {
        SymbolKind::Linear
    }

    fn draw(&self, surface: &mut dyn DrawingSurface, frame: &Frame) {
        let module = self.module_width(frame);
        if frame.overflows(self.width * module, 0.0) {
            log::warn!(
                "{} module wide symbol needs {:.3} mm, frame is {} mm",
                self.width,
                self.width * module,
                frame.width,
            );
        }
        let ox = self.width.mul_add(-module, frame.width) / 2.0;

        let text_height = if self.text.is_empty() {
            0.0
        } else {
            self.font.metrics().line_height()
        };
        let bar_height = (frame.height - text_height).max(0.0);

        let placement = Affine::scale(module, bar_height / self.height)
            .then(&Affine::translate(ox, 0.0));
        surface.fill_area(&self.bars.transformed(&placement));

        if !self.text.is_empty() {
            surface.set_font(self.font.clone());
            let baseline = bar_height + surface.font_metrics().ascent;
            for placed in &self.text {
                surface.draw_glyph_outline(&placed.run, placed.x.mul_add(module, ox), baseline);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::matrix::BitMatrix;
    use crate::surface::ShapeAccumulator;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn symbol_dimensions_include_quiet_zone() {
        let m = BitMatrix::new(21, 21).unwrap();
        let symbol = Symbol::from_matrix(&m, 4).unwrap();
        assert_eq!((symbol.width(), symbol.height()), (29, 29));
        assert!(symbol.chunks().is_empty());
        assert_eq!(symbol.kind(), SymbolKind::Matrix);
    }

    #[test]
    fn symbol_fills_each_chunk_scaled() {
        let m = BitMatrix::from_rows(&["1"]).unwrap();
        let symbol = Symbol::from_matrix(&m, 1).unwrap();
        let mut acc = ShapeAccumulator::new();
        symbol.draw(&mut acc, &Frame::new(3.0, 3.0));
        let bounds = acc.finish().marks.bounds().unwrap();
        assert_eq!(bounds, Rect::new(1.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn symbol_is_centred_in_non_square_frame() {
        let m = BitMatrix::from_rows(&["11", "11"]).unwrap();
        let symbol = Symbol::from_matrix(&m, 0).unwrap();
        let mut acc = ShapeAccumulator::new();
        symbol.draw(&mut acc, &Frame::new(10.0, 4.0));
        let bounds = acc.finish().marks.bounds().unwrap();
        assert_eq!(bounds, Rect::new(3.0, 0.0, 4.0, 4.0));
    }

    #[test]
    fn matrix_modules_snap_to_whole_dots() {
        let m = BitMatrix::new(10, 10).unwrap();
        let symbol = Symbol::from_matrix(&m, 0).unwrap();
        // 30 mm over 10 modules at 100 dpi: 11.8 dots per module -> 11.
        let frame = Frame::new(30.0, 30.0).with_resolution(100.0);
        assert!(approx(symbol.module_size(&frame), 11.0 * 25.4 / 100.0));
        // Without a resolution the module fills the frame exactly.
        assert!(approx(symbol.module_size(&Frame::new(30.0, 30.0)), 3.0));
    }

    #[test]
    fn quantize_never_drops_below_one_dot() {
        let frame = Frame::new(1.0, 1.0).with_resolution(72.0);
        assert!(approx(frame.quantize(0.01), 25.4 / 72.0));
    }

    #[test]
    fn one_dot_modules_can_overflow_small_frames() {
        let mut m = BitMatrix::new(10, 10).unwrap();
        m.set(0, 0, true);
        m.set(9, 9, true);
        let symbol = Symbol::from_matrix(&m, 0).unwrap();
        // 0.1 mm per module rounds up to one 0.254 mm dot at 100 dpi.
        let frame = Frame::new(1.0, 1.0).with_resolution(100.0);
        let module = symbol.module_size(&frame);
        assert!(approx(module, 0.254));
        assert!(frame.overflows(10.0 * module, 10.0 * module));

        // Still drawn, centred, spilling evenly past both edges.
        let mut acc = ShapeAccumulator::new();
        symbol.draw(&mut acc, &frame);
        let bounds = acc.finish().marks.bounds().unwrap();
        assert!(approx(bounds.x, (1.0 - 2.54) / 2.0));
        assert!(approx(bounds.width, 2.54));
    }

    #[test]
    fn fitting_symbol_does_not_overflow() {
        let frame = Frame::new(30.0, 30.0).with_resolution(100.0);
        assert!(!frame.overflows(30.0, 30.0));
        assert!(!frame.overflows(27.94, 0.0));
        assert!(frame.overflows(30.01, 0.0));
    }

    #[test]
    fn quantize_ignores_unusable_resolution() {
        assert_eq!(Frame::new(1.0, 1.0).with_resolution(0.0).quantize(0.3), 0.3);
        assert_eq!(Frame::new(1.0, 1.0).with_resolution(f64::NAN).quantize(0.3), 0.3);
    }

    #[test]
    fn governing_resolution_depends_on_kind() {
        let o = Orientation::Rotate90;
        assert_eq!(SymbolKind::Linear.governing_resolution(o, 300.0, 200.0), 200.0);
        assert_eq!(SymbolKind::Matrix.governing_resolution(o, 300.0, 200.0), 200.0);
        let o = Orientation::Rotate0;
        assert_eq!(SymbolKind::Linear.governing_resolution(o, 300.0, 600.0), 300.0);
        assert_eq!(SymbolKind::Matrix.governing_resolution(o, 600.0, 300.0), 300.0);
    }

    #[test]
    fn from_widths_places_bars_only() {
        let symbol = LinearSymbol::from_widths(&[2, 1, 1], 5, 3).unwrap();
        assert_eq!(symbol.width(), 10.0);
        let bounds = symbol.bars().bounds().unwrap();
        assert_eq!(bounds, Rect::new(3.0, 0.0, 4.0, 5.0));
        // Two bars, five commands each.
        assert_eq!(symbol.bars().len(), 10);
    }

    #[test]
    fn from_widths_rejects_empty_pattern() {
        assert!(LinearSymbol::from_widths(&[], 5, 0).is_err());
        assert!(LinearSymbol::from_widths(&[0, 0], 5, 0).is_err());
    }

    #[test]
    fn linear_new_rejects_bad_size() {
        assert!(LinearSymbol::new(Path::new(), 0.0, 1.0).is_err());
        assert!(LinearSymbol::new(Path::new(), 1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn linear_bars_fill_frame_without_text() {
        let symbol = LinearSymbol::from_widths(&[1, 1, 1], 1, 0).unwrap();
        let mut acc = ShapeAccumulator::new();
        symbol.draw(&mut acc, &Frame::new(30.0, 12.0));
        let geometry = acc.finish();
        assert!(geometry.text.is_empty());
        assert_eq!(geometry.marks.bounds().unwrap(), Rect::new(0.0, 0.0, 30.0, 12.0));
    }

    #[test]
    fn linear_text_sits_below_bars() {
        let glyph = GlyphRun::new("1", Path::rect(Rect::new(0.0, -0.7, 0.5, 0.7)), 0.6);
        let symbol = LinearSymbol::from_widths(&[1, 1, 1], 1, 0)
            .unwrap()
            .with_text(Font::new("mono", 2.0), vec![TextPlacement { run: glyph, x: 1.0 }]);
        let mut acc = ShapeAccumulator::new();
        symbol.draw(&mut acc, &Frame::new(30.0, 12.0));
        let geometry = acc.finish();

        // Line height 2 mm leaves 10 mm of bars.
        let bars = geometry.marks.bounds().unwrap();
        assert!(approx(bars.bottom(), 10.0));

        // Baseline at 10 + 1.6 ascent, glyph 1.4 mm tall, starting at module 1.
        let text = geometry.text.bounds().unwrap();
        assert!(approx(text.x, 10.0));
        assert!(approx(text.bottom(), 11.6));
        assert!(approx(text.y, 10.2));
    }

    #[test]
    fn linear_quantizes_module_width_only() {
        let symbol = LinearSymbol::from_widths(&[1, 1, 1], 1, 0).unwrap();
        // 10 mm / 3 modules at 300 dpi = 39.37 dots -> 39 dots.
        let frame = Frame::new(10.0, 5.0).with_resolution(300.0);
        let module = symbol.module_width(&frame);
        assert!(approx(module, 39.0 * 25.4 / 300.0));

        let mut acc = ShapeAccumulator::new();
        symbol.draw(&mut acc, &frame);
        let bars = acc.finish().marks.bounds().unwrap();
        assert!(approx(bars.height, 5.0));
        assert!(approx(bars.width, 3.0 * module));
        assert!(approx(bars.x, (10.0 - 3.0 * module) / 2.0));
    }
}
