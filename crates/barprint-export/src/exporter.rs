//! The exporter: collect geometry, select a format, emit.
//!
//! Each call builds a fresh [`ShapeAccumulator`], lets the symbol draw
//! into its unrotated content box, and maps the recorded geometry onto
//! the canvas through the orientation transform.  Nothing carries over
//! from one call to the next.

use std::io::Write;

use barprint_core::{Drawable, DrawingSurface, Frame, ShapeAccumulator};

use crate::backend::{BackendRegistry, DEFAULT_PDF_BACKEND, DocumentRequest, PrecisionGuard};
use crate::eps::to_eps;
use crate::error::ExportError;
use crate::page::Page;
use crate::preview::{render_tiff_preview, wrap_dos_eps};
use crate::raster::write_raster;
use crate::settings::{ExportFormat, ExportSettings, Resolution};
use crate::svg::to_svg;

/// Producer string recorded in PDF metadata.
pub const PRODUCER: &str = concat!("barprint-export ", env!("CARGO_PKG_VERSION"));

/// Writes symbols in any [`ExportFormat`].
#[derive(Debug)]
pub struct Exporter {
    settings: ExportSettings,
    registry: BackendRegistry,
    pdf_backend: String,
}

impl Exporter {
    /// An exporter with every compiled-in backend registered.
    #[must_use]
    pub fn new(settings: ExportSettings) -> Self {
        Self::with_registry(settings, BackendRegistry::with_defaults())
    }

    /// An exporter resolving PDF backends from `registry`.
    #[must_use]
    pub fn with_registry(settings: ExportSettings, registry: BackendRegistry) -> Self {
        Self {
            settings,
            registry,
            pdf_backend: DEFAULT_PDF_BACKEND.to_string(),
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub const fn settings_mut(&mut self) -> &mut ExportSettings {
        &mut self.settings
    }

    /// Choose the registered backend PDF export uses.
    pub fn set_pdf_backend(&mut self, name: impl Into<String>) {
        self.pdf_backend = name.into();
    }

    #[must_use]
    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut BackendRegistry {
        &mut self.registry
    }

    /// Draw `drawable` and return the canvas-space page.
    ///
    /// `resolution` governs module quantization; pass `None` to draw at
    /// the exact canvas size.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidArgument`] if the settings or
    /// `resolution` violate their contracts.
    pub fn collect(
        &self,
        drawable: &dyn Drawable,
        resolution: Option<Resolution>,
    ) -> Result<Page, ExportError> {
        let settings = &self.settings;
        settings.validate()?;
        if let Some(resolution) = &resolution {
            resolution.validate()?;
        }

        let orientation = settings.orientation;
        let (content_w, content_h) =
            orientation.content_size(settings.width_mm, settings.height_mm);
        let kind = drawable.kind();
        let frame = Frame {
            width: content_w,
            height: content_h,
            resolution: resolution.map(|r| {
                kind.governing_resolution(orientation, r.horizontal, r.vertical)
            }),
        };

        let mut surface = ShapeAccumulator::new();
        drawable.draw(&mut surface, &frame);
        surface.dispose();
        let geometry = surface
            .finish()
            .transformed(&orientation.transform(content_w, content_h));

        log::debug!(
            "collected {kind:?} symbol: {} mark and {} text commands, {orientation} on {}x{} mm",
            geometry.marks.len(),
            geometry.text.len(),
            settings.width_mm,
            settings.height_mm,
        );
        Ok(Page::new(settings, geometry))
    }

    /// Export `drawable` as `format` into `out`.
    ///
    /// Raster formats render at the device resolution, or
    /// [`ExportSettings::DEFAULT_RASTER_DPI`] when none is set.
    ///
    /// # Errors
    ///
    /// Argument errors are reported before anything is written.  Backend,
    /// encoder, and I/O errors are propagated unchanged.
    pub fn export<W: Write>(
        &self,
        format: ExportFormat,
        drawable: &dyn Drawable,
        out: &mut W,
    ) -> Result<(), ExportError> {
        log::debug!("exporting {format}");
        match format {
            ExportFormat::Pdf => self.export_pdf(drawable, out),
            ExportFormat::Eps => self.export_eps(drawable, out),
            ExportFormat::Svg => self.export_svg(drawable, out),
            ExportFormat::Png | ExportFormat::Bmp | ExportFormat::Jpeg => {
                self.export_raster(format, drawable, out)
            }
        }
    }

    /// # Errors
    ///
    /// See [`export`](Self::export).
    pub fn export_svg<W: Write>(
        &self,
        drawable: &dyn Drawable,
        out: &mut W,
    ) -> Result<(), ExportError> {
        let page = self.collect(drawable, self.settings.device_resolution)?;
        out.write_all(to_svg(&page).as_bytes())?;
        Ok(())
    }

    /// EPS, wrapped with a TIFF preview when
    /// [`preview_dpi`](ExportSettings::preview_dpi) is non-zero.
    ///
    /// # Errors
    ///
    /// See [`export`](Self::export).
    pub fn export_eps<W: Write>(
        &self,
        drawable: &dyn Drawable,
        out: &mut W,
    ) -> Result<(), ExportError> {
        let page = self.collect(drawable, self.settings.device_resolution)?;
        let postscript = to_eps(&page);
        if self.settings.preview_dpi == 0 {
            out.write_all(postscript.as_bytes())?;
        } else {
            let tiff = render_tiff_preview(&page, self.settings.preview_dpi)?;
            out.write_all(&wrap_dos_eps(postscript.as_bytes(), &tiff)?)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ExportError::BackendUnavailable`] or
    /// [`ExportError::BackendAccess`] for backend problems; see also
    /// [`export`](Self::export).
    pub fn export_pdf<W: Write>(
        &self,
        drawable: &dyn Drawable,
        out: &mut W,
    ) -> Result<(), ExportError> {
        let page = self.collect(drawable, self.settings.device_resolution)?;
        let backend = self.registry.resolve(&self.pdf_backend)?;

        let path = page
            .geometry
            .combined()
            .transformed(&page.to_points())
            .cubic_segments();
        let request = DocumentRequest {
            width_pt: page.width_pt(),
            height_pt: page.height_pt(),
            title: page.title.as_deref(),
            creator: Some(page.creator.as_str()).filter(|c| !c.is_empty()),
            producer: PRODUCER,
            foreground: page.foreground,
            background: page.painted_background(),
            color_model: page.color_model,
            path: &path,
        };

        let bytes = {
            let _precision = PrecisionGuard::new(backend, true);
            backend
                .render(&request)
                .map_err(|err| ExportError::BackendAccess {
                    name: backend.name().to_string(),
                    reason: err.to_string(),
                })?
        };
        out.write_all(&bytes)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ExportError::InvalidArgument`] if `format` is not a raster
    /// format; see also [`export`](Self::export).
    pub fn export_raster<W: Write>(
        &self,
        format: ExportFormat,
        drawable: &dyn Drawable,
        out: &mut W,
    ) -> Result<(), ExportError> {
        if !format.is_raster() {
            return Err(ExportError::InvalidArgument(format!(
                "{format} is not a raster format"
            )));
        }
        let resolution = self.settings.raster_resolution();
        let page = self.collect(drawable, Some(resolution))?;
        write_raster(&page, format, resolution, out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use barprint_core::{BitMatrix, LinearSymbol, Orientation, Rect, Symbol};

    use super::*;

    fn symbol() -> Symbol {
        Symbol::from_matrix(&BitMatrix::from_rows(&["11", "01"]).unwrap(), 1).unwrap()
    }

    fn exporter(settings: ExportSettings) -> Exporter {
        Exporter::with_registry(settings, BackendRegistry::new())
    }

    #[test]
    fn collect_fills_canvas_for_flat_orientation() {
        let settings = ExportSettings {
            width_mm: 40.0,
            height_mm: 40.0,
            ..ExportSettings::default()
        };
        let page = exporter(settings).collect(&symbol(), None).unwrap();
        // 4x4 modules of 10 mm; set modules span x 10..30, y 10..30.
        assert_eq!(
            page.geometry.marks.bounds().unwrap(),
            Rect::new(10.0, 10.0, 20.0, 20.0)
        );
    }

    #[test]
    fn collect_rotates_non_flat_content_onto_canvas() {
        let bars = LinearSymbol::from_widths(&[1, 1, 1], 1, 0).unwrap();
        let settings = ExportSettings {
            width_mm: 10.0,
            height_mm: 30.0,
            orientation: Orientation::Rotate90,
            ..ExportSettings::default()
        };
        let page = exporter(settings).collect(&bars, None).unwrap();
        // Content is 30 x 10 (bars across x), rotated to stand upright.
        let bounds = page.geometry.marks.bounds().unwrap();
        assert!((bounds.width - 10.0).abs() < 1e-9);
        assert!((bounds.height - 30.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_size_fails_before_writing() {
        let settings = ExportSettings {
            width_mm: -1.0,
            ..ExportSettings::default()
        };
        let mut out = Vec::new();
        for format in ExportFormat::ALL {
            let result = exporter(settings.clone()).export(format, &symbol(), &mut out);
            assert!(matches!(result, Err(ExportError::InvalidArgument(_))), "{format}");
        }
        assert!(out.is_empty());
    }

    #[test]
    fn pdf_without_backend_is_unavailable() {
        let mut out = Vec::new();
        let result =
            exporter(ExportSettings::default()).export(ExportFormat::Pdf, &symbol(), &mut out);
        assert!(matches!(result, Err(ExportError::BackendUnavailable(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn svg_export_writes_document() {
        let mut out = Vec::new();
        exporter(ExportSettings::default())
            .export(ExportFormat::Svg, &symbol(), &mut out)
            .unwrap();
        let svg = String::from_utf8(out).unwrap();
        assert!(svg.contains("<path"));
    }

    #[test]
    fn eps_preview_wraps_postscript() {
        let settings = ExportSettings {
            preview_dpi: 36,
            ..ExportSettings::default()
        };
        let mut out = Vec::new();
        exporter(settings)
            .export(ExportFormat::Eps, &symbol(), &mut out)
            .unwrap();
        assert_eq!(&out[..4], &[0xC5, 0xD0, 0xD3, 0xC6]);
        let ps_offset = u32::from_le_bytes(out[4..8].try_into().unwrap()) as usize;
        assert!(out[ps_offset..].starts_with(b"%!PS-Adobe-3.0 EPSF-3.0"));
    }

    #[test]
    fn device_resolution_snaps_vector_modules() {
        let settings = ExportSettings {
            width_mm: 10.0,
            height_mm: 10.0,
            device_resolution: Some(Resolution::uniform(100.0)),
            ..ExportSettings::default()
        };
        let page = exporter(settings)
            .collect(&symbol(), Some(Resolution::uniform(100.0)))
            .unwrap();
        // 2.5 mm modules are 9.84 dots: snapped to 9 dots (2.286 mm).
        let bounds = page.geometry.marks.bounds().unwrap();
        assert!((bounds.width - 2.0 * 9.0 * 25.4 / 100.0).abs() < 1e-9);
    }

    #[test]
    fn raster_export_rejects_vector_format() {
        let mut out = Vec::new();
        let result = exporter(ExportSettings::default()).export_raster(
            ExportFormat::Eps,
            &symbol(),
            &mut out,
        );
        assert!(matches!(result, Err(ExportError::InvalidArgument(_))));
    }
}
