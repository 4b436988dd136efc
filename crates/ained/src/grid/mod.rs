//! Grid geometry.
//!
//! - [`addressing`]: logical `(row, col)` to physical `(word, bit)` mapping
//! - [`region::Region`]: rectangular sub-region of the grid
//! - [`board::Board`]: dense bit board materialized from a region

pub mod addressing;
pub mod board;
pub mod region;

pub use addressing::{
    to_physical, Coord, Location, COLUMNS, GRID_BITS, NUM_WORDS, ROWS, TILE, TILES_PER_ROW,
    WORD_BITS,
};
pub use board::Board;
pub use region::Region;
