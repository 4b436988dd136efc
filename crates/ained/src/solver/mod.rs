//! Lights Out on a rectangular board.
//!
//! Pressing cell `i` adds the cross pattern `A·eᵢ` to the board over GF(2),
//! so a board `b` is cleared by any press pattern `x` with `A·x = b`. The
//! press matrix `A` is symmetric; its null space holds the *quiet patterns*
//! (press sets that change nothing), and a board is solvable exactly when it
//! is orthogonal to all of them.
//!
//! | Board | rank(A) | quiet patterns |
//! |-------|---------|----------------|
//! | 4×4   | 12      | 4              |
//! | 5×5   | 23      | 2              |
//! | 6×6   | 36      | 0              |
//!
//! # Example
//!
//! ```
//! use ained::{Board, LightsOutSolver};
//!
//! let solver = LightsOutSolver::new(5, 5);
//! assert_eq!(solver.quiet_patterns().len(), 2);
//!
//! let mut board = Board::new(5, 5);
//! board.toggle_cross(1, 3);
//! board.toggle_cross(4, 0);
//! let presses = solver.optimal_solution(&board).unwrap();
//! assert_eq!(presses.lit_count(), 2);
//! ```

pub mod gf2;
mod strategy;

pub use strategy::{generate_solvable_board, play, GameOutcome, Strategy, Weights};

use crate::grid::Board;

use gf2::{BitMatrix, BitVector, Elimination};

/// Largest quiet-space dimension searched exhaustively by
/// [`LightsOutSolver::optimal_solution`].
pub const MAX_EXHAUSTIVE_QUIET: usize = 16;

/// Precomputed elimination for one board shape.
#[derive(Clone, Debug)]
pub struct LightsOutSolver {
    rows: usize,
    cols: usize,
    elimination: Elimination,
    quiet: Vec<BitVector>,
}

impl LightsOutSolver {
    /// Eliminates the press matrix of a `rows × cols` board.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        let elimination = press_matrix(rows, cols).eliminate();
        let quiet = elimination.null_space();
        Self {
            rows,
            cols,
            elimination,
            quiet,
        }
    }

    /// Board rows.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Board columns.
    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Rank of the press matrix.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.elimination.rank()
    }

    /// Basis of the quiet patterns, as boards.
    #[must_use]
    pub fn quiet_patterns(&self) -> Vec<Board> {
        self.quiet.iter().map(|q| self.to_board(q)).collect()
    }

    /// Returns true if `board` can be cleared by presses.
    ///
    /// A board of the wrong shape is never solvable.
    #[must_use]
    pub fn is_solvable(&self, board: &Board) -> bool {
        self.fits(board) && {
            let b = BitVector::from_bools(board.cells());
            self.quiet.iter().all(|q| !q.dot(&b))
        }
    }

    /// A press pattern that clears `board`, or `None` if there is none.
    #[must_use]
    pub fn solve(&self, board: &Board) -> Option<Board> {
        self.solve_vector(board).map(|x| self.to_board(&x))
    }

    /// The press pattern with the fewest presses. The quiet space is
    /// searched exhaustively up to [`MAX_EXHAUSTIVE_QUIET`] dimensions;
    /// beyond that each basis pattern is tried once.
    #[must_use]
    pub fn optimal_solution(&self, board: &Board) -> Option<Board> {
        let base = self.solve_vector(board)?;
        let best = if self.quiet.len() <= MAX_EXHAUSTIVE_QUIET {
            self.search_quiet_space(base)
        } else {
            self.improve_greedily(base)
        };
        Some(self.to_board(&best))
    }

    // Gray-code walk: each step toggles one basis pattern.
    fn search_quiet_space(&self, base: BitVector) -> BitVector {
        let mut current = base.clone();
        let mut best = base;
        for step in 1..(1u64 << self.quiet.len()) {
            current.xor_assign(&self.quiet[step.trailing_zeros() as usize]);
            if current.count_ones() < best.count_ones() {
                best = current.clone();
            }
        }
        best
    }

    fn improve_greedily(&self, mut best: BitVector) -> BitVector {
        for q in &self.quiet {
            let mut candidate = best.clone();
            candidate.xor_assign(q);
            if candidate.count_ones() < best.count_ones() {
                best = candidate;
            }
        }
        best
    }

    fn solve_vector(&self, board: &Board) -> Option<BitVector> {
        if !self.fits(board) {
            return None;
        }
        self.elimination.solve(&BitVector::from_bools(board.cells()))
    }

    fn fits(&self, board: &Board) -> bool {
        board.rows() == self.rows && board.cols() == self.cols
    }

    fn to_board(&self, v: &BitVector) -> Board {
        let mut board = Board::new(self.rows, self.cols);
        for i in v.iter_ones() {
            board.set(i / self.cols, i % self.cols, true);
        }
        board
    }
}

/// `A[j][i] = 1` when pressing cell `i` toggles cell `j`.
fn press_matrix(rows: usize, cols: usize) -> BitMatrix {
    let n = rows * cols;
    let mut a = BitMatrix::from_rows(n, vec![BitVector::zeros(n); n]);
    for r in 0..rows {
        for c in 0..cols {
            let i = r * cols + c;
            a.set(i, i, true);
            if r > 0 {
                a.set(i, i - cols, true);
            }
            if r + 1 < rows {
                a.set(i, i + cols, true);
            }
            if c > 0 {
                a.set(i, i - 1, true);
            }
            if c + 1 < cols {
                a.set(i, i + 1, true);
            }
        }
    }
    a
}
