//! Dense bit boards.
//!
//! A [`Board`] is the in-memory image of a region: one `bool` per cell,
//! row-major. It is what [`Ained::get_board`](crate::Ained::get_board)
//! returns and what [`Ained::reconstruct_board`](crate::Ained::reconstruct_board)
//! loads, and it doubles as the reference model for the cross flip.

use core::fmt;

use crate::error::{AinedError, Result};

/// A `rows × cols` bit board, row-major.
///
/// # Example
///
/// ```
/// use ained::Board;
///
/// let mut board = Board::new(3, 3);
/// board.toggle_cross(1, 1);
/// assert_eq!(board.lit_count(), 5);
/// board.toggle_cross(1, 1);
/// assert!(board.is_dark());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl Board {
    /// Creates an all-dark board.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    /// Creates a board from row-major cells.
    ///
    /// # Errors
    ///
    /// [`AinedError::BoardSizeMismatch`] if `cells.len() != rows * cols`.
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<bool>) -> Result<Self> {
        if cells.len() != rows * cols {
            return Err(AinedError::BoardSizeMismatch {
                expected: rows * cols,
                actual: cells.len(),
            });
        }
        Ok(Self { rows, cols, cells })
    }

    /// Creates a board from row-major 0/1 values; any non-zero value is lit.
    ///
    /// # Errors
    ///
    /// [`AinedError::BoardSizeMismatch`] if `values.len() != rows * cols`.
    pub fn from_bits(rows: usize, cols: usize, values: &[u32]) -> Result<Self> {
        Self::from_cells(rows, cols, values.iter().map(|&v| v != 0).collect())
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the board has no cells.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row-major cells.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Row-major cells as 0/1 values.
    #[must_use]
    pub fn to_bits(&self) -> Vec<u32> {
        self.cells.iter().map(|&c| u32::from(c)).collect()
    }

    /// Reads one cell. Out-of-range cells read as dark.
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[row * self.cols + col]
    }

    /// Writes one cell. Out-of-range writes are ignored.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, lit: bool) {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col] = lit;
        }
    }

    /// Flips one cell. Out-of-range flips are ignored.
    #[inline]
    pub fn toggle(&mut self, row: usize, col: usize) {
        if row < self.rows && col < self.cols {
            let cell = &mut self.cells[row * self.cols + col];
            *cell = !*cell;
        }
    }

    /// Flips `(row, col)` and its in-board orthogonal neighbours.
    pub fn toggle_cross(&mut self, row: usize, col: usize) {
        if row >= self.rows || col >= self.cols {
            return;
        }
        self.toggle(row, col);
        if row > 0 {
            self.toggle(row - 1, col);
        }
        self.toggle(row + 1, col);
        if col > 0 {
            self.toggle(row, col - 1);
        }
        self.toggle(row, col + 1);
    }

    /// Number of lit cells.
    #[must_use]
    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Returns true if no cell is lit.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }

    /// Lit cells as `(row, col)`, row-major.
    pub fn lit_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, lit)| **lit)
            .map(move |(i, _)| (i / cols, i % cols))
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Board {{ {}x{}, {} lit }}",
            self.rows,
            self.cols,
            self.lit_count()
        )
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                if col > 0 {
                    f.write_str(" ")?;
                }
                f.write_str(if self.get(row, col) { "1" } else { "0" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
