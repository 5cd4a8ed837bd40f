//! barprint-export: Output format serializers for barprint symbols.
//!
//! [`Exporter`] records a [`Drawable`](barprint_core::Drawable) into
//! canvas-space geometry and writes it as one of:
//!
//! - PDF, through a registered [`DocumentBackend`] (`lopdf` by default)
//! - EPS, optionally wrapped in a DOS EPS envelope with a TIFF preview
//! - SVG
//! - PNG, BMP, and JPEG, rasterised with `tiny-skia`
//!
//! The serializers themselves ([`svg::to_svg`], [`eps::to_eps`],
//! [`raster::write_raster`]) are plain functions over a [`Page`] and can
//! be used without an exporter.

pub mod backend;
pub mod eps;
pub mod error;
pub mod exporter;
pub mod number;
pub mod page;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod preview;
pub mod raster;
pub mod settings;
pub mod svg;

pub use backend::{
    BACKEND_API_VERSION, BackendError, BackendRegistry, DEFAULT_PDF_BACKEND, DocumentBackend,
    DocumentRequest, PrecisionGuard,
};
pub use error::ExportError;
pub use exporter::{Exporter, PRODUCER};
pub use page::Page;
#[cfg(feature = "pdf")]
pub use pdf::LopdfBackend;
pub use settings::{ColorModel, ExportFormat, ExportSettings, Resolution};
