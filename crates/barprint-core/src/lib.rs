//! barprint-core: Pure barcode geometry (sans-IO).
//!
//! Everything a barcode exporter needs before it touches a file format:
//!
//! - [`DualColor`]: one color carried in both RGB and CMYK form
//! - [`chunk_matrix`]: module matrix reduction to fillable rectangles
//! - [`Orientation`]: the eight rotations/mirrors and their transforms
//! - [`DrawingSurface`] and [`Drawable`]: the contract between symbols
//!   and the exporter that records their geometry
//!
//! This crate has **no I/O dependencies**.  Serializers live in
//! `barprint-export`.

pub mod chunk;
pub mod color;
pub mod geometry;
pub mod matrix;
pub mod orientation;
pub mod surface;
pub mod symbol;
pub mod types;

pub use chunk::{Chunk, chunk_matrix};
pub use color::DualColor;
pub use geometry::{Affine, Path, PathCommand, Segment};
pub use matrix::{BitMatrix, ModuleMatrix};
pub use orientation::Orientation;
pub use surface::{DrawingSurface, Font, FontMetrics, Geometry, GlyphRun, ShapeAccumulator};
pub use symbol::{
    Drawable, Frame, LinearSymbol, MM_PER_INCH, Symbol, SymbolKind, TextPlacement,
};
pub use types::{CoreError, Point, Rect};
