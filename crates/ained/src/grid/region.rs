//! Rectangular sub-regions of the grid.
//!
//! Board-level operations (cross flip, board reads, reconstruction) take a
//! region plus region-relative coordinates, so a 5×5 game can live anywhere
//! on the 128×64 plane.

use core::fmt;

use super::addressing::{Coord, COLUMNS, ROWS};
use crate::error::{AinedError, Result};

/// A rectangle `[start_row, start_row + num_rows) × [start_col, start_col + num_cols)`.
///
/// # Example
///
/// ```
/// use ained::Region;
///
/// let region = Region::new(8, 8, 5, 5);
/// assert!(region.validate().is_ok());
/// assert_eq!(region.len(), 25);
/// assert_eq!(region.absolute(1, 2).row, 9);
///
/// let neighbours: Vec<_> = region.neighbors(0, 0).collect();
/// assert_eq!(neighbours, vec![(1, 0), (0, 1)]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    /// First row of the region.
    pub start_row: usize,
    /// First column of the region.
    pub start_col: usize,
    /// Number of rows.
    pub num_rows: usize,
    /// Number of columns.
    pub num_cols: usize,
}

impl Region {
    /// The whole grid.
    pub const FULL: Self = Self::new(0, 0, ROWS, COLUMNS);

    /// Creates a region without validating it.
    #[inline]
    #[must_use]
    pub const fn new(start_row: usize, start_col: usize, num_rows: usize, num_cols: usize) -> Self {
        Self {
            start_row,
            start_col,
            num_rows,
            num_cols,
        }
    }

    /// A square region anchored at the grid origin.
    #[inline]
    #[must_use]
    pub const fn square(size: usize) -> Self {
        Self::new(0, 0, size, size)
    }

    /// Number of cells.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.num_rows * self.num_cols
    }

    /// Returns true if the region has no cells.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that the region is non-empty and lies inside the grid.
    ///
    /// # Errors
    ///
    /// [`AinedError::RegionOutOfRange`] otherwise.
    pub fn validate(&self) -> Result<()> {
        let fits = |start: usize, len: usize, limit: usize| {
            len > 0 && start.checked_add(len).is_some_and(|end| end <= limit)
        };
        if fits(self.start_row, self.num_rows, ROWS) && fits(self.start_col, self.num_cols, COLUMNS)
        {
            Ok(())
        } else {
            Err(AinedError::RegionOutOfRange(*self))
        }
    }

    /// Returns true if the region-relative `(row, col)` is inside the region.
    #[inline]
    #[must_use]
    pub const fn contains(&self, row: usize, col: usize) -> bool {
        row < self.num_rows && col < self.num_cols
    }

    /// Checks a region-relative coordinate.
    ///
    /// # Errors
    ///
    /// [`AinedError::CoordinateOutOfRange`] if `(row, col)` is outside the region.
    pub fn check_cell(&self, row: usize, col: usize) -> Result<()> {
        if self.contains(row, col) {
            Ok(())
        } else {
            Err(AinedError::CoordinateOutOfRange {
                row,
                col,
                rows: self.num_rows,
                cols: self.num_cols,
            })
        }
    }

    /// Grid coordinate of a region-relative cell.
    #[inline]
    #[must_use]
    pub const fn absolute(&self, row: usize, col: usize) -> Coord {
        Coord::new(self.start_row + row, self.start_col + col)
    }

    /// Region-relative cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let cols = self.num_cols;
        (0..self.len()).map(move |i| (i / cols, i % cols))
    }

    /// In-region orthogonal neighbours of a region-relative cell, in the
    /// order up, down, left, right.
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
        let up = row.checked_sub(1).map(|r| (r, col));
        let down = (row + 1 < self.num_rows).then_some((row + 1, col));
        let left = col.checked_sub(1).map(|c| (row, c));
        let right = (col + 1 < self.num_cols).then_some((row, col + 1));
        [up, down, left, right].into_iter().flatten()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.num_rows, self.num_cols, self.start_row, self.start_col
        )
    }
}
