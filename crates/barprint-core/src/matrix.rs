//! Boolean module matrices produced by 2-D symbol encoders.

use crate::types::CoreError;

/// Read access to a `width x height` grid of modules.
///
/// `get(x, y)` is only called with `x < width()` and `y < height()`.
pub trait ModuleMatrix {
    /// Number of module columns.
    fn width(&self) -> usize;

    /// Number of module rows.
    fn height(&self) -> usize;

    /// Whether the module at column `x`, row `y` is set (dark).
    fn get(&self, x: usize, y: usize) -> bool;
}

/// Owned, row-major module matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl BitMatrix {
    /// Create an all-unset matrix.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] if either dimension is zero.
    pub fn new(width: usize, height: usize) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidArgument(format!(
                "module matrix must be at least 1x1, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            bits: vec![false; width * height],
        })
    }

    /// Parse a matrix from text rows.
    ///
    /// `1`, `#`, `X`, and `x` are set modules; `0`, `.`, and spaces are
    /// unset.  Trailing whitespace-only rows are ignored.  Every row must
    /// have the same length.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidArgument`] for empty input, ragged rows,
    /// or unknown characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use barprint_core::{BitMatrix, ModuleMatrix};
    ///
    /// let m = BitMatrix::from_rows(&["#.#", ".#."]).unwrap();
    /// assert_eq!((m.width(), m.height()), (3, 2));
    /// assert!(m.get(0, 0));
    /// assert!(!m.get(1, 0));
    /// ```
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, CoreError> {
        let rows: Vec<&str> = rows
            .iter()
            .map(|r| r.as_ref().trim_end_matches(['\r', '\n']))
            .collect();
        let last_content = rows
            .iter()
            .rposition(|r| !r.trim().is_empty())
            .ok_or_else(|| CoreError::InvalidArgument("module matrix has no rows".to_string()))?;
        let rows = &rows[..=last_content];

        let width = rows[0].chars().count();
        let mut matrix = Self::new(width, rows.len())?;
        for (y, row) in rows.iter().enumerate() {
            let len = row.chars().count();
            if len != width {
                return Err(CoreError::InvalidArgument(format!(
                    "row {y} has {len} modules, expected {width}"
                )));
            }
            for (x, ch) in row.chars().enumerate() {
                let set = match ch {
                    '1' | '#' | 'X' | 'x' => true,
                    '0' | '.' | ' ' => false,
                    other => {
                        return Err(CoreError::InvalidArgument(format!(
                            "unexpected character {other:?} at row {y}, column {x}"
                        )));
                    }
                };
                matrix.set(x, y, set);
            }
        }
        Ok(matrix)
    }

    /// Set or clear the module at `(x, y)`.  Out-of-range writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x < self.width && y < self.height {
            self.bits[y * self.width + x] = value;
        }
    }

    /// Number of set modules.
    #[must_use]
    pub fn count_set(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }
}

impl ModuleMatrix for BitMatrix {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn get(&self, x: usize, y: usize) -> bool {
        self.bits[y * self.width + x]
    }
}
