//! Toggle propagation: the Lights Out cross flip on a region of the grid.
//!
//! A flip XORs a cell and its in-region orthogonal neighbours. Those cells
//! can live in up to five different words, but a commit changes at most one
//! word, so the flip is assembled from both write paths:
//!
//! ```text
//! 1. snapshot the region              (reads)
//! 2. clear the whole grid             (bypass)
//! 3. set the target bit               (one masked commit)
//! 4. XOR back every snapshot 1        (bypass)
//! 5. XOR the in-region neighbours     (bypass)
//! ```
//!
//! After step 4 the target holds `!old` and every other region cell holds
//! its old value; step 5 completes the cross.
//!
//! Step 2 clears the entire grid, not just the region, so bits outside the
//! region do not survive a flip. Games are expected to own the grid.

use std::collections::BTreeMap;

use tracing::debug;

use crate::device::{report, Ained};
use crate::error::{AinedError, Result};
use crate::fabric::Fabric;
use crate::grid::{Board, Region};

impl<F: Fabric> Ained<F> {
    /// Flips region cell `(row, col)` and its in-region orthogonal
    /// neighbours. Coordinates are relative to `region`.
    ///
    /// Everything outside `region` is cleared. The handle ends with bypass
    /// disabled.
    ///
    /// # Errors
    ///
    /// Checked before anything is written:
    /// [`AinedError::RegionOutOfRange`] if the region does not fit the grid,
    /// [`AinedError::CoordinateOutOfRange`] if the target is outside it, and
    /// [`AinedError::TransactionPending`] if a caller's transaction is open.
    pub fn flip_lights(&mut self, region: Region, row: usize, col: usize) -> Result<()> {
        report(self.check_flip(region, row, col))?;

        let old = self.read_board(region);
        self.clear_all();

        let target = region.absolute(row, col);
        self.set_bit(target.row, target.col, true)?;
        self.commit()?;
        // Read back so the commit has landed before bypass opens the mask.
        let _ = self.read_bit(target.to_physical());

        self.set_bypass(true);
        for (r, c) in old.lit_cells() {
            self.xor_bit(region.absolute(r, c).to_physical());
        }
        for (r, c) in region.neighbors(row, col) {
            self.xor_bit(region.absolute(r, c).to_physical());
        }
        self.set_bypass(false);

        debug!(%region, row, col, "flip");
        Ok(())
    }

    fn check_flip(&self, region: Region, row: usize, col: usize) -> Result<()> {
        region.validate()?;
        region.check_cell(row, col)?;
        match self.pending() {
            Some(tx) => Err(AinedError::TransactionPending { word: tx.word() }),
            None => Ok(()),
        }
    }

    /// Reads `region` as a dense board.
    ///
    /// # Errors
    ///
    /// [`AinedError::RegionOutOfRange`] if the region does not fit the grid.
    pub fn get_board(&self, region: Region) -> Result<Board> {
        report(region.validate())?;
        Ok(self.read_board(region))
    }

    fn read_board(&self, region: Region) -> Board {
        let mut board = Board::new(region.num_rows, region.num_cols);
        for (r, c) in region.cells() {
            board.set(r, c, self.read_bit(region.absolute(r, c).to_physical()));
        }
        board
    }

    /// Returns true if any cell of `region` is lit (the game is not over).
    ///
    /// # Errors
    ///
    /// [`AinedError::RegionOutOfRange`] if the region does not fit the grid.
    pub fn board_not_all_zero(&self, region: Region) -> Result<bool> {
        report(region.validate())?;
        Ok(region
            .cells()
            .any(|(r, c)| self.read_bit(region.absolute(r, c).to_physical())))
    }

    /// Loads `board` into `region`, one masked commit per word the region
    /// touches. Cells outside the region are untouched; bypass ends as it
    /// was.
    ///
    /// # Errors
    ///
    /// [`AinedError::RegionOutOfRange`], [`AinedError::BoardSizeMismatch`]
    /// if the board shape differs from the region, or
    /// [`AinedError::TransactionPending`] if a caller's transaction is open.
    pub fn reconstruct_board(&mut self, region: Region, board: &Board) -> Result<()> {
        report(self.check_reconstruct(region, board))?;

        let mut words: BTreeMap<usize, (u64, u64)> = BTreeMap::new();
        for (r, c) in region.cells() {
            let loc = region.absolute(r, c).to_physical();
            let (value, mask) = words.entry(loc.word).or_default();
            if board.get(r, c) {
                *value |= loc.mask();
            }
            *mask |= loc.mask();
        }

        self.with_bypass(|device| {
            for (&word, &(value, mask)) in &words {
                device.stage_word(word, value, mask)?;
                device.commit()?;
            }
            Ok::<_, AinedError>(())
        })?;
        debug!(%region, commits = words.len(), "reconstruct");
        Ok(())
    }

    fn check_reconstruct(&self, region: Region, board: &Board) -> Result<()> {
        region.validate()?;
        if (board.rows(), board.cols()) != (region.num_rows, region.num_cols) {
            return Err(AinedError::BoardSizeMismatch {
                expected: region.len(),
                actual: board.len(),
            });
        }
        match self.pending() {
            Some(tx) => Err(AinedError::TransactionPending { word: tx.word() }),
            None => Ok(()),
        }
    }
}
