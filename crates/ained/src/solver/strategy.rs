//! Game strategies and the runner that drives them through a device.

use core::fmt;
use core::str::FromStr;

use tracing::debug;

use super::LightsOutSolver;
use crate::device::{report, Ained};
use crate::error::{AinedError, Result};
use crate::fabric::Fabric;
use crate::grid::{Board, Region};
use crate::kernel::{CoefficientBank, KERNEL_SIZE};
use crate::rng::Tausworthe;

/// Coefficient weights indexed `dr * 5 + dc`, center first.
pub type Weights = [f32; KERNEL_SIZE * KERNEL_SIZE];

/// How the next press is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// First press of a fresh minimum-press solution.
    Optimal,
    /// Light chasing: push the first lit cell down, then right.
    Chase,
    /// Press with the best expected lights-off balance under the low kernel.
    Greedy,
}

impl Strategy {
    /// Every strategy.
    pub const ALL: [Self; 3] = [Self::Optimal, Self::Chase, Self::Greedy];

    /// The press to make on `board`, or `None` once it is dark.
    ///
    /// `Optimal` falls back to a random press when no deterministic
    /// solution exists, which a stochastic fabric can produce.
    #[must_use]
    pub fn next_move(
        self,
        board: &Board,
        solver: &LightsOutSolver,
        weights: &Weights,
        rng: &mut Tausworthe,
    ) -> Option<(usize, usize)> {
        if board.is_dark() {
            return None;
        }
        match self {
            Self::Optimal => solver
                .optimal_solution(board)
                .and_then(|presses| presses.lit_cells().next())
                .or_else(|| Some((rng.next_below(board.rows()), rng.next_below(board.cols())))),
            Self::Chase => board.lit_cells().next().map(|(r, c)| chase(board, r, c)),
            Self::Greedy => Some(greedy(board, weights)),
        }
    }
}

fn chase(board: &Board, row: usize, col: usize) -> (usize, usize) {
    if row + 1 < board.rows() {
        (row + 1, col)
    } else if col + 1 < board.cols() {
        (row, col + 1)
    } else {
        (row, col)
    }
}

/// Weight of the effect a press at distance `(dr, dc)` has on a cell.
fn weight(weights: &Weights, dr: usize, dc: usize) -> f32 {
    if dr + dc == 1 {
        1.0
    } else if dr < KERNEL_SIZE && dc < KERNEL_SIZE {
        weights[dr * KERNEL_SIZE + dc]
    } else {
        0.0
    }
}

// First maximum in row-major order wins.
fn greedy(board: &Board, weights: &Weights) -> (usize, usize) {
    let mut best = (0, 0);
    let mut best_value = f32::NEG_INFINITY;
    for r in 0..board.rows() {
        for c in 0..board.cols() {
            let value: f32 = (0..board.rows())
                .flat_map(|i| (0..board.cols()).map(move |j| (i, j)))
                .map(|(i, j)| {
                    let w = weight(weights, i.abs_diff(r), j.abs_diff(c));
                    if board.get(i, j) {
                        w
                    } else {
                        -w
                    }
                })
                .sum();
            if value > best_value {
                best_value = value;
                best = (r, c);
            }
        }
    }
    best
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Optimal => "optimal",
            Self::Chase => "chase",
            Self::Greedy => "greedy",
        })
    }
}

impl FromStr for Strategy {
    type Err = AinedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "optimal" | "deterministic" => Ok(Self::Optimal),
            "chase" | "chasing" => Ok(Self::Chase),
            "greedy" => Ok(Self::Greedy),
            other => Err(AinedError::Config(format!(
                "unknown strategy `{other}` (expected optimal, chase or greedy)"
            ))),
        }
    }
}

/// How a game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOutcome {
    /// Presses made.
    pub moves: usize,
    /// Whether the region ended dark.
    pub solved: bool,
}

/// Plays `region` with `strategy` until it is dark or `max_moves` presses
/// have been made. Every press goes through [`Ained::flip_lights`].
///
/// # Errors
///
/// [`AinedError::RegionOutOfRange`] before anything else runs, then any
/// error of [`Ained::get_board`] or [`Ained::flip_lights`].
pub fn play<F: Fabric>(
    device: &mut Ained<F>,
    region: Region,
    strategy: Strategy,
    rng: &mut Tausworthe,
    max_moves: usize,
) -> Result<GameOutcome> {
    report(region.validate())?;
    let solver = LightsOutSolver::new(region.num_rows, region.num_cols);
    let weights = device.coefficient_matrix(CoefficientBank::Low);

    let mut moves = 0;
    while moves < max_moves {
        let board = device.get_board(region)?;
        let Some((row, col)) = strategy.next_move(&board, &solver, &weights, rng) else {
            break;
        };
        device.flip_lights(region, row, col)?;
        moves += 1;
    }

    let solved = !device.board_not_all_zero(region)?;
    debug!(%strategy, moves, solved, "game over");
    Ok(GameOutcome { moves, solved })
}

/// Draws random boards until one is solvable, then loads it into `region`.
///
/// # Errors
///
/// [`AinedError::RegionOutOfRange`] or any error of
/// [`Ained::reconstruct_board`].
pub fn generate_solvable_board<F: Fabric>(
    device: &mut Ained<F>,
    region: Region,
    rng: &mut Tausworthe,
) -> Result<Board> {
    report(region.validate())?;
    let solver = LightsOutSolver::new(region.num_rows, region.num_cols);
    let mut draws = 0usize;
    let board = loop {
        draws += 1;
        let cells = (0..region.len()).map(|_| rng.next_bool()).collect();
        let board = Board::from_cells(region.num_rows, region.num_cols, cells)?;
        if solver.is_solvable(&board) {
            break board;
        }
    };
    device.reconstruct_board(region, &board)?;
    debug!(%region, draws, lit = board.lit_count(), "generated board");
    Ok(board)
}
