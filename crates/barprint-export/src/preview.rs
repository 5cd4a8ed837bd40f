//! DOS EPS binary envelope with an embedded TIFF preview.
//!
//! Layout (all integers little-endian):
//!
//! | Offset | Size | Field                                  |
//! |-------:|-----:|----------------------------------------|
//! | 0      | 4    | magic `C5 D0 D3 C6`                    |
//! | 4      | 4    | PostScript offset (`30 + tiff_len`)    |
//! | 8      | 4    | PostScript length                      |
//! | 12     | 4    | metafile offset (unused, 0)            |
//! | 16     | 4    | metafile length (unused, 0)            |
//! | 20     | 4    | TIFF offset (`30`)                     |
//! | 24     | 4    | TIFF length                            |
//! | 28     | 2    | checksum, `FF FF` meaning "none"       |
//!
//! The TIFF bytes follow the header, then the PostScript program.

use std::io::Cursor;

use image::codecs::tiff::TiffEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};

use crate::error::ExportError;
use crate::page::Page;
use crate::raster::{self, PixelFormat};
use crate::settings::Resolution;

/// Leading bytes of a DOS EPS file.
pub const DOS_EPS_MAGIC: [u8; 4] = [0xC5, 0xD0, 0xD3, 0xC6];

/// Size of the DOS EPS header.
pub const DOS_EPS_HEADER_LEN: usize = 30;

/// Render `page` as an 8-bit grayscale TIFF at `dpi`.
///
/// The background is always painted so the preview is opaque.
///
/// # Errors
///
/// Returns [`ExportError::InvalidArgument`] for a zero resolution or an
/// unusable canvas, and [`ExportError::Image`] if TIFF encoding fails.
pub fn render_tiff_preview(page: &Page, dpi: u32) -> Result<Vec<u8>, ExportError> {
    if dpi == 0 {
        return Err(ExportError::InvalidArgument(
            "preview resolution must be positive".to_string(),
        ));
    }
    let image = raster::render(
        page,
        Resolution::uniform(f64::from(dpi)),
        PixelFormat::Rgb,
    )?;
    let gray = DynamicImage::ImageRgba8(image).to_luma8();

    let mut cursor = Cursor::new(Vec::new());
    TiffEncoder::new(&mut cursor).write_image(
        gray.as_raw(),
        gray.width(),
        gray.height(),
        ExtendedColorType::L8,
    )?;
    Ok(cursor.into_inner())
}

/// Wrap a PostScript program and a TIFF preview in the DOS EPS envelope.
///
/// # Errors
///
/// Returns [`ExportError::InvalidArgument`] if either part is too large
/// for the 32-bit offsets.
pub fn wrap_dos_eps(postscript: &[u8], tiff: &[u8]) -> Result<Vec<u8>, ExportError> {
    let too_large =
        || ExportError::InvalidArgument("EPS preview envelope exceeds 4 GiB".to_string());
    let header_len = u32::try_from(DOS_EPS_HEADER_LEN).map_err(|_| too_large())?;
    let tiff_len = u32::try_from(tiff.len()).map_err(|_| too_large())?;
    let ps_len = u32::try_from(postscript.len()).map_err(|_| too_large())?;
    let ps_offset = header_len.checked_add(tiff_len).ok_or_else(too_large)?;
    ps_offset.checked_add(ps_len).ok_or_else(too_large)?;

    let mut out = Vec::with_capacity(DOS_EPS_HEADER_LEN + tiff.len() + postscript.len());
    out.extend_from_slice(&DOS_EPS_MAGIC);
    out.extend_from_slice(&ps_offset.to_le_bytes());
    out.extend_from_slice(&ps_len.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&header_len.to_le_bytes());
    out.extend_from_slice(&tiff_len.to_le_bytes());
    out.extend_from_slice(&[0xFF, 0xFF]);
    out.extend_from_slice(tiff);
    out.extend_from_slice(postscript);
    Ok(out)
}
