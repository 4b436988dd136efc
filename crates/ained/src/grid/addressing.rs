//! Logical to physical bit addressing.
//!
//! The grid is 128 rows × 64 columns. Each 8×8 tile occupies one 64-bit
//! word, tiles are laid out 8 per tile-row, and bits inside a tile are
//! row-major.
//!
//! ```text
//!            col 0..8   col 8..16  ...  col 56..64
//! row 0..8   word 0     word 1     ...  word 7
//! row 8..16  word 8     word 9     ...  word 15
//! ...
//! row 120..  word 120   word 121   ...  word 127
//! ```

use core::fmt;

/// Number of grid rows.
pub const ROWS: usize = 128;

/// Number of grid columns.
pub const COLUMNS: usize = 64;

/// Edge length of a tile (one tile = one word).
pub const TILE: usize = 8;

/// Tiles per tile-row.
pub const TILES_PER_ROW: usize = COLUMNS / TILE;

/// Number of 64-bit words backing the grid.
pub const NUM_WORDS: usize = (ROWS / TILE) * TILES_PER_ROW;

/// Bits per memory word.
pub const WORD_BITS: usize = 64;

/// Total number of addressable bits.
pub const GRID_BITS: usize = ROWS * COLUMNS;

/// A logical grid coordinate.
///
/// # Example
///
/// ```
/// use ained::Coord;
///
/// let c = Coord::new(9, 10);
/// assert!(c.is_valid());
/// assert_eq!(c.to_physical().word, 9);
/// assert_eq!(c.to_physical().bit, 10);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Coord {
    /// Row, `0..ROWS`.
    pub row: usize,
    /// Column, `0..COLUMNS`.
    pub col: usize,
}

impl Coord {
    /// Creates a coordinate without validating it.
    #[inline]
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns true if the coordinate lies inside the grid.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.row < ROWS && self.col < COLUMNS
    }

    /// Physical location of this coordinate.
    #[inline]
    #[must_use]
    pub const fn to_physical(self) -> Location {
        to_physical(self.row, self.col)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A physical bit location: word index plus bit index inside the word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    /// Word index, `0..NUM_WORDS`.
    pub word: usize,
    /// Bit index inside the word, `0..64`.
    pub bit: u32,
}

impl Location {
    /// Single-bit mask selecting this location inside its word.
    #[inline]
    #[must_use]
    pub const fn mask(self) -> u64 {
        1u64 << self.bit
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "word {} bit {}", self.word, self.bit)
    }
}

/// Maps a logical `(row, col)` to its physical `(word, bit)` location.
///
/// Callers validate `row < ROWS` and `col < COLUMNS` first; out-of-range
/// input yields a location outside the grid.
///
/// # Example
///
/// ```
/// use ained::to_physical;
///
/// let loc = to_physical(127, 63);
/// assert_eq!((loc.word, loc.bit), (127, 63));
/// ```
#[inline]
#[must_use]
pub const fn to_physical(row: usize, col: usize) -> Location {
    Location {
        word: (row / TILE) * TILES_PER_ROW + col / TILE,
        bit: ((row % TILE) * TILE + col % TILE) as u32,
    }
}
