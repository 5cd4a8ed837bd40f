//! Raster rendering and PNG/BMP/JPEG encoding.
//!
//! Pages are rasterised with tiny-skia at the requested per-axis
//! resolution.  Bars and modules are filled without anti-aliasing so
//! their edges land on whole device dots.  Glyph outlines keep
//! anti-aliasing.  Every encoded file records its horizontal and vertical
//! resolution.

use std::io::Write;

use barprint_core::{DualColor, MM_PER_INCH, Path, PathCommand};
use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::{JpegEncoder, PixelDensity, PixelDensityUnit};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Transform};

use crate::error::ExportError;
use crate::page::Page;
use crate::settings::{ExportFormat, Resolution};

/// Quality used for JPEG output.
pub const JPEG_QUALITY: u8 = 95;

/// Offset of `biXPelsPerMeter` in a BMP file: 14-byte file header plus
/// 24 bytes into the info header.  `biYPelsPerMeter` follows.
const BMP_PELS_PER_METER_OFFSET: usize = 38;

/// Channel layout of an encoded raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba,
    Rgb,
    Gray,
}

impl PixelFormat {
    /// Pick the layout for `format`.
    ///
    /// Rules, first match wins:
    /// 1. transparency requested and the format has alpha: RGBA;
    /// 2. JPEG with both colors achromatic: grayscale;
    /// 3. otherwise RGB.
    #[must_use]
    pub const fn select(
        format: ExportFormat,
        transparent: bool,
        foreground: DualColor,
        background: DualColor,
    ) -> Self {
        if transparent && format.supports_alpha() {
            Self::Rgba
        } else if matches!(format, ExportFormat::Jpeg)
            && foreground.is_achromatic()
            && background.is_achromatic()
        {
            Self::Gray
        } else {
            Self::Rgb
        }
    }
}

/// Pixels needed to cover `mm` at `dpi`: `round(mm * dpi / 25.4 + 0.5)`.
///
/// # Errors
///
/// Returns [`ExportError::InvalidArgument`] unless `mm` and `dpi` are
/// finite and positive and the result is a usable image dimension.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn pixel_size(mm: f64, dpi: f64) -> Result<u32, ExportError> {
    if !(mm.is_finite() && mm > 0.0 && dpi.is_finite() && dpi > 0.0) {
        return Err(ExportError::InvalidArgument(format!(
            "cannot rasterise {mm} mm at {dpi} dpi"
        )));
    }
    let px = (mm * dpi / MM_PER_INCH + 0.5).round();
    if px.is_finite() && px >= 1.0 && px <= f64::from(u32::MAX) {
        Ok(px as u32)
    } else {
        Err(ExportError::InvalidArgument(format!(
            "{mm} mm at {dpi} dpi is not a usable pixel size"
        )))
    }
}

/// Convert a path to tiny-skia's representation.
///
/// Returns `None` for empty or degenerate paths.
#[allow(clippy::cast_possible_truncation)]
fn to_skia_path(path: &Path) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for command in path.commands() {
        match *command {
            PathCommand::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathCommand::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathCommand::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathCommand::CubicTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathCommand::Close => pb.close(),
        }
    }
    pb.finish()
}

/// Rasterise `page` at `resolution`.
///
/// The background is painted unless `pixel_format` is
/// [`PixelFormat::Rgba`].  The returned image holds straight
/// (non-premultiplied) RGBA.
///
/// # Errors
///
/// Returns [`ExportError::InvalidArgument`] for an unusable resolution or
/// an image too large to allocate.
#[allow(clippy::cast_possible_truncation)]
pub fn render(
    page: &Page,
    resolution: Resolution,
    pixel_format: PixelFormat,
) -> Result<RgbaImage, ExportError> {
    resolution.validate()?;
    let width = pixel_size(page.width_mm, resolution.horizontal)?;
    let height = pixel_size(page.height_mm, resolution.vertical)?;

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        ExportError::InvalidArgument(format!("cannot allocate a {width}x{height} canvas"))
    })?;

    if pixel_format != PixelFormat::Rgba {
        let (r, g, b) = page.background.rgb();
        pixmap.fill(Color::from_rgba8(r, g, b, 255));
    }

    let transform = Transform::from_scale(
        (resolution.horizontal / MM_PER_INCH) as f32,
        (resolution.vertical / MM_PER_INCH) as f32,
    );

    let (r, g, b) = page.foreground.rgb();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, 255);

    if let Some(marks) = to_skia_path(&page.geometry.marks) {
        paint.anti_alias = false;
        pixmap.fill_path(&marks, &paint, FillRule::Winding, transform, None);
    }
    if let Some(text) = to_skia_path(&page.geometry.text) {
        paint.anti_alias = true;
        pixmap.fill_path(&text, &paint, FillRule::Winding, transform, None);
    }

    log::debug!(
        "rendered {width}x{height} px at {}x{} dpi ({pixel_format:?})",
        resolution.horizontal,
        resolution.vertical
    );

    // Convert the pixmap (premultiplied RGBA) to an `RgbaImage` (straight RGBA).
    Ok(RgbaImage::from_fn(width, height, |x, y| {
        pixmap.pixel(x, y).map_or(Rgba([0, 0, 0, 0]), |p| {
            let c = p.demultiply();
            Rgba([c.red(), c.green(), c.blue(), c.alpha()])
        })
    }))
}

/// Render `page` and encode it as `format`.
///
/// # Errors
///
/// Returns [`ExportError::InvalidArgument`] if `format` is not a raster
/// format or the canvas is unusable, and encoder or I/O errors otherwise.
pub fn write_raster<W: Write>(
    page: &Page,
    format: ExportFormat,
    resolution: Resolution,
    out: &mut W,
) -> Result<(), ExportError> {
    if !format.is_raster() {
        return Err(ExportError::InvalidArgument(format!(
            "{format} is not a raster format"
        )));
    }
    let pixel_format = PixelFormat::select(
        format,
        !page.opaque_background,
        page.foreground,
        page.background,
    );
    let image = render(page, resolution, pixel_format)?;
    let (width, height) = image.dimensions();
    let data = match pixel_format {
        PixelFormat::Rgba => image.into_raw(),
        PixelFormat::Rgb => DynamicImage::ImageRgba8(image).to_rgb8().into_raw(),
        PixelFormat::Gray => DynamicImage::ImageRgba8(image).to_luma8().into_raw(),
    };

    match format {
        ExportFormat::Png => write_png(out, &data, width, height, pixel_format, resolution),
        ExportFormat::Jpeg => write_jpeg(out, &data, width, height, pixel_format, resolution),
        _ => write_bmp(out, &data, width, height, resolution),
    }
}

/// Dots per inch to dots per metre.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn dots_per_metre(dpi: f64) -> u32 {
    (dpi / (MM_PER_INCH / 1000.0)).round().clamp(0.0, f64::from(u32::MAX)) as u32
}

fn write_png<W: Write>(
    out: &mut W,
    data: &[u8],
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
    resolution: Resolution,
) -> Result<(), ExportError> {
    let mut encoder = png::Encoder::new(out, width, height);
    encoder.set_color(match pixel_format {
        PixelFormat::Rgba => png::ColorType::Rgba,
        PixelFormat::Rgb => png::ColorType::Rgb,
        PixelFormat::Gray => png::ColorType::Grayscale,
    });
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: dots_per_metre(resolution.horizontal),
        yppu: dots_per_metre(resolution.vertical),
        unit: png::Unit::Meter,
    }));
    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;
    writer.finish()?;
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn write_jpeg<W: Write>(
    out: &mut W,
    data: &[u8],
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
    resolution: Resolution,
) -> Result<(), ExportError> {
    let density = |dpi: f64| dpi.round().clamp(1.0, f64::from(u16::MAX)) as u16;
    let mut encoder = JpegEncoder::new_with_quality(out, JPEG_QUALITY);
    encoder.set_pixel_density(PixelDensity {
        density: (density(resolution.horizontal), density(resolution.vertical)),
        unit: PixelDensityUnit::Inches,
    });
    let color = match pixel_format {
        PixelFormat::Gray => ExtendedColorType::L8,
        PixelFormat::Rgb | PixelFormat::Rgba => ExtendedColorType::Rgb8,
    };
    encoder.write_image(data, width, height, color)?;
    Ok(())
}

fn write_bmp<W: Write>(
    out: &mut W,
    data: &[u8],
    width: u32,
    height: u32,
    resolution: Resolution,
) -> Result<(), ExportError> {
    let mut bytes = Vec::new();
    BmpEncoder::new(&mut bytes).write_image(data, width, height, ExtendedColorType::Rgb8)?;
    set_bmp_resolution(&mut bytes, resolution)?;
    out.write_all(&bytes)?;
    Ok(())
}

/// Patch the pixels-per-metre fields of an encoded BMP.
fn set_bmp_resolution(bytes: &mut [u8], resolution: Resolution) -> Result<(), ExportError> {
    let fields = bytes
        .get_mut(BMP_PELS_PER_METER_OFFSET..BMP_PELS_PER_METER_OFFSET + 8)
        .ok_or_else(|| ExportError::InvalidArgument("BMP header is truncated".to_string()))?;
    let ppm = |dpi: f64| i32::try_from(dots_per_metre(dpi)).unwrap_or(i32::MAX);
    fields[..4].copy_from_slice(&ppm(resolution.horizontal).to_le_bytes());
    fields[4..].copy_from_slice(&ppm(resolution.vertical).to_le_bytes());
    Ok(())
}
