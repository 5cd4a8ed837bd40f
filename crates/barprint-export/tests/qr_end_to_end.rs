//! End-to-end export of a QR-sized module matrix through every format.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use barprint_core::{BitMatrix, Orientation, Symbol};
use barprint_export::{
    BACKEND_API_VERSION, BackendError, BackendRegistry, DocumentBackend, DocumentRequest,
    ExportError, ExportFormat, ExportSettings, Exporter, Resolution,
};

/// A 21x21 matrix with the three finder patterns of a version-1 QR code.
fn qr_matrix() -> BitMatrix {
    let mut matrix = BitMatrix::new(21, 21).unwrap();
    for (ox, oy) in [(0, 0), (14, 0), (0, 14)] {
        for y in 0..7 {
            for x in 0..7 {
                let ring = x == 0 || x == 6 || y == 0 || y == 6;
                let core = (2..=4).contains(&x) && (2..=4).contains(&y);
                matrix.set(ox + x, oy + y, ring || core);
            }
        }
    }
    // Timing patterns.
    for i in (8..13).step_by(2) {
        matrix.set(i, 6, true);
        matrix.set(6, i, true);
    }
    matrix
}

fn qr_symbol() -> Symbol {
    Symbol::from_matrix(&qr_matrix(), 4).unwrap()
}

/// Backend that records how it was called.
struct Recording {
    name: &'static str,
    version: u32,
    fail: bool,
    precise: AtomicBool,
    precise_during_render: Arc<AtomicBool>,
    segments: Arc<AtomicUsize>,
}

impl Recording {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            version: BACKEND_API_VERSION,
            fail: false,
            precise: AtomicBool::new(false),
            precise_during_render: Arc::new(AtomicBool::new(false)),
            segments: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl DocumentBackend for Recording {
    fn name(&self) -> &str {
        self.name
    }

    fn api_version(&self) -> u32 {
        self.version
    }

    fn high_precision(&self) -> bool {
        self.precise.load(Ordering::SeqCst)
    }

    fn set_high_precision(&self, enabled: bool) {
        self.precise.store(enabled, Ordering::SeqCst);
    }

    fn render(&self, request: &DocumentRequest<'_>) -> Result<Vec<u8>, BackendError> {
        self.precise_during_render
            .store(self.high_precision(), Ordering::SeqCst);
        self.segments.store(request.path.len(), Ordering::SeqCst);
        if self.fail {
            return Err(BackendError("disk full".to_string()));
        }
        Ok(format!("{}x{}", request.width_pt, request.height_pt).into_bytes())
    }
}

fn exporter_with(backend: Recording) -> Exporter {
    let name = backend.name;
    let mut registry = BackendRegistry::new();
    registry.register(Box::new(backend));
    let mut exporter = Exporter::with_registry(ExportSettings::default(), registry);
    exporter.set_pdf_backend(name);
    exporter
}

#[test]
fn eps_paints_background_before_symbol() {
    let mut out = Vec::new();
    Exporter::new(ExportSettings::default())
        .export(ExportFormat::Eps, &qr_symbol(), &mut out)
        .unwrap();
    let eps = String::from_utf8(out).unwrap();

    assert!(eps.starts_with("%!PS-Adobe-3.0 EPSF-3.0\n"));
    // 50 mm is 141.73 pt.
    assert!(eps.contains("%%BoundingBox: 0 0 142 142\n"));
    let rectfill = eps.find("rectfill").unwrap();
    let fill = eps.rfind("\nfill\n").unwrap();
    assert!(rectfill < fill);
    assert!(eps.trim_end().ends_with("%%EOF"));
}

#[test]
fn svg_is_sized_in_millimetres() {
    let settings = ExportSettings {
        width_mm: 30.0,
        height_mm: 20.0,
        title: Some("Q&A".to_string()),
        ..ExportSettings::default()
    };
    let mut out = Vec::new();
    Exporter::new(settings)
        .export(ExportFormat::Svg, &qr_symbol(), &mut out)
        .unwrap();
    let svg = String::from_utf8(out).unwrap();
    assert!(svg.contains(r#"width="30mm""#));
    assert!(svg.contains(r#"height="20mm""#));
    assert!(svg.contains(r#"viewBox="0 0 30 20""#));
    assert!(svg.contains("<title>Q&amp;A</title>"));
    assert_eq!(svg.matches("<path").count(), 1);
}

#[test]
fn raster_formats_decode_at_expected_size() {
    let settings = ExportSettings {
        width_mm: 25.4,
        height_mm: 25.4,
        device_resolution: Some(Resolution::uniform(100.0)),
        ..ExportSettings::default()
    };
    let exporter = Exporter::new(settings);
    for format in [ExportFormat::Png, ExportFormat::Bmp, ExportFormat::Jpeg] {
        let mut out = Vec::new();
        exporter.export(format, &qr_symbol(), &mut out).unwrap();
        let image = image::load_from_memory(&out).unwrap();
        // round(100 + 0.5) pixels on each side.
        assert_eq!((image.width(), image.height()), (101, 101), "{format}");
    }
}

#[test]
fn transparent_png_keeps_alpha() {
    let settings = ExportSettings {
        width_mm: 10.0,
        height_mm: 10.0,
        opaque_background: false,
        ..ExportSettings::default()
    };
    let mut out = Vec::new();
    Exporter::new(settings)
        .export(ExportFormat::Png, &qr_symbol(), &mut out)
        .unwrap();
    let image = image::load_from_memory(&out).unwrap().to_rgba8();
    // Corner is quiet zone.
    assert_eq!(image.get_pixel(0, 0).0[3], 0);
}

#[test]
fn rotation_keeps_canvas_pixel_size() {
    let settings = ExportSettings {
        width_mm: 25.4,
        height_mm: 12.7,
        orientation: Orientation::Rotate90,
        device_resolution: Some(Resolution::uniform(72.0)),
        ..ExportSettings::default()
    };
    let mut out = Vec::new();
    Exporter::new(settings)
        .export(ExportFormat::Png, &qr_symbol(), &mut out)
        .unwrap();
    let image = image::load_from_memory(&out).unwrap();
    assert_eq!((image.width(), image.height()), (73, 37));
}

#[test]
fn pdf_without_backend_is_unavailable() {
    let exporter = Exporter::with_registry(ExportSettings::default(), BackendRegistry::new());
    let mut out = Vec::new();
    let result = exporter.export(ExportFormat::Pdf, &qr_symbol(), &mut out);
    assert!(matches!(result, Err(ExportError::BackendUnavailable(_))));
    assert!(out.is_empty());
}

#[test]
fn pdf_backend_runs_in_high_precision_and_restores_flag() {
    let backend = Recording::new("recording");
    let during = Arc::clone(&backend.precise_during_render);
    let segments = Arc::clone(&backend.segments);
    let exporter = exporter_with(backend);

    let mut out = Vec::new();
    exporter
        .export(ExportFormat::Pdf, &qr_symbol(), &mut out)
        .unwrap();

    assert!(during.load(Ordering::SeqCst));
    assert!(segments.load(Ordering::SeqCst) > 0);
    let backend = exporter.registry().resolve("recording").unwrap();
    assert!(!backend.high_precision());
    assert!(!out.is_empty());
}

#[test]
fn failing_backend_is_access_error_and_restores_flag() {
    let mut backend = Recording::new("broken");
    backend.fail = true;
    backend.precise.store(false, Ordering::SeqCst);
    let exporter = exporter_with(backend);

    let mut out = Vec::new();
    let result = exporter.export(ExportFormat::Pdf, &qr_symbol(), &mut out);
    match result {
        Err(ExportError::BackendAccess { name, reason }) => {
            assert_eq!(name, "broken");
            assert!(reason.contains("disk full"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(out.is_empty());
    let backend = exporter.registry().resolve("broken").unwrap();
    assert!(!backend.high_precision());
}

#[test]
fn outdated_backend_is_access_error() {
    let mut backend = Recording::new("outdated");
    backend.version = BACKEND_API_VERSION + 1;
    let exporter = exporter_with(backend);
    let mut out = Vec::new();
    let result = exporter.export(ExportFormat::Pdf, &qr_symbol(), &mut out);
    assert!(matches!(result, Err(ExportError::BackendAccess { .. })));
}

#[cfg(feature = "pdf")]
#[test]
fn lopdf_writes_loadable_document() {
    let settings = ExportSettings {
        title: Some("QR".to_string()),
        color_model: barprint_export::ColorModel::Cmyk,
        foreground: barprint_core::DualColor::from_cmyk(100, 0, 0, 0),
        ..ExportSettings::default()
    };
    let mut out = Vec::new();
    Exporter::new(settings)
        .export(ExportFormat::Pdf, &qr_symbol(), &mut out)
        .unwrap();
    assert!(out.starts_with(b"%PDF-1.5"));

    let doc = lopdf::Document::load_mem(&out).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
    let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = doc.get_dictionary(info_id).unwrap();
    assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"QR");
}
