//! Module matrix to rectangle conversion.
//!
//! Filling one rectangle per module is slow and produces hairline seams
//! in some renderers.  Instead the matrix is reduced to "chunks": maximal
//! runs of set modules.
//!
//! Two independent forward scans produce the chunks:
//!
//! 1. **Horizontal**: every maximal run of set modules in a row becomes a
//!    rectangle of height 1, including single-module runs.
//! 2. **Vertical**: every maximal run in a column becomes a rectangle of
//!    width 1, but only when it is longer than one module.  Single cells
//!    are already covered by the horizontal pass.
//!
//! Chunks from the two passes may overlap.  Consumers fill them, so
//! overlap is harmless.  Each scan keeps O(1) state per line, and a run
//! still open at the end of a line is flushed after the loop.

use serde::{Deserialize, Serialize};

use crate::matrix::ModuleMatrix;
use crate::types::CoreError;

/// A rectangle of set modules, in module units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chunk {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Chunk {
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the chunk covers module `(x, y)`.
    #[must_use]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Reduce a module matrix to chunks, offset by a quiet zone of `quiet_zone`
/// modules on every side.
///
/// Horizontal-pass chunks come first (row by row), then vertical-pass
/// chunks (column by column).  The output is deterministic.
///
/// # Errors
///
/// Returns [`CoreError::InvalidArgument`] if the matrix has a zero
/// dimension or does not fit in `u32` coordinates with the quiet zone.
///
/// # Examples
///
/// ```
/// use barprint_core::{BitMatrix, Chunk, chunk_matrix};
///
/// let m = BitMatrix::from_rows(&["####"]).unwrap();
/// assert_eq!(chunk_matrix(&m, 0).unwrap(), vec![Chunk::new(0, 0, 4, 1)]);
/// ```
pub fn chunk_matrix<M: ModuleMatrix + ?Sized>(
    matrix: &M,
    quiet_zone: u32,
) -> Result<Vec<Chunk>, CoreError> {
    let width = matrix.width();
    let height = matrix.height();
    if width == 0 || height == 0 {
        return Err(CoreError::InvalidArgument(format!(
            "module matrix must be at least 1x1, got {width}x{height}"
        )));
    }
    let fits = |n: usize| {
        u32::try_from(n)
            .ok()
            .and_then(|n| n.checked_add(quiet_zone.checked_mul(2)?))
            .is_some()
    };
    if !fits(width) || !fits(height) {
        return Err(CoreError::InvalidArgument(format!(
            "module matrix {width}x{height} with quiet zone {quiet_zone} is too large"
        )));
    }

    let mut chunks = Vec::new();
    scan_rows(matrix, quiet_zone, &mut chunks);
    scan_columns(matrix, quiet_zone, &mut chunks);

    log::trace!(
        "chunked {width}x{height} matrix (quiet zone {quiet_zone}) into {} chunks",
        chunks.len()
    );
    Ok(chunks)
}

/// Horizontal pass: one height-1 chunk per maximal run, of any length.
#[allow(clippy::cast_possible_truncation)]
fn scan_rows<M: ModuleMatrix + ?Sized>(matrix: &M, q: u32, out: &mut Vec<Chunk>) {
    for y in 0..matrix.height() {
        let mut run_start: Option<usize> = None;
        for x in 0..matrix.width() {
            match (matrix.get(x, y), run_start) {
                (true, None) => run_start = Some(x),
                (false, Some(start)) => {
                    out.push(Chunk::new(
                        start as u32 + q,
                        y as u32 + q,
                        (x - start) as u32,
                        1,
                    ));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            out.push(Chunk::new(
                start as u32 + q,
                y as u32 + q,
                (matrix.width() - start) as u32,
                1,
            ));
        }
    }
}

/// Vertical pass: one width-1 chunk per maximal run longer than one module.
#[allow(clippy::cast_possible_truncation)]
fn scan_columns<M: ModuleMatrix + ?Sized>(matrix: &M, q: u32, out: &mut Vec<Chunk>) {
    let mut emit = |x: usize, start: usize, end: usize| {
        if end - start > 1 {
            out.push(Chunk::new(
                x as u32 + q,
                start as u32 + q,
                1,
                (end - start) as u32,
            ));
        }
    };

    for x in 0..matrix.width() {
        let mut run_start: Option<usize> = None;
        for y in 0..matrix.height() {
            match (matrix.get(x, y), run_start) {
                (true, None) => run_start = Some(y),
                (false, Some(start)) => {
                    emit(x, start, y);
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            emit(x, start, matrix.height());
        }
    }
}
