//! AiNed - bit-addressable memory plane of the AiNed FPGA fabric.
//!
//! The fabric exposes a 128 × 64 bit grid through 128 memory-mapped 64-bit
//! words, plus a small 32-bit register file (write mask, coefficient groups,
//! bypass switch, per-dipole random generators). This crate wraps both behind
//! an owned device handle, [`Ained`], and builds two algorithms on top:
//!
//! - a distance-decay [`CoefficientKernel`] generator, and
//! - the Lights Out cross flip ([`Ained::flip_lights`]).
//!
//! # Memory Layout
//!
//! The grid is tiled into 8 × 8 blocks; each block is one 64-bit word.
//!
//! ```text
//! word = (row / 8) * 8 + (col / 8)      16 tile-rows × 8 tile-columns
//! bit  = (row % 8) * 8 + (col % 8)      0..=63 inside the word
//! ```
//!
//! # Write Discipline
//!
//! | Path | Granularity | Mask | Used for |
//! |------|-------------|------|----------|
//! | Transaction buffer + [`Ained::commit`] | one word per commit | pending mask | single-bit intent |
//! | Bypass ([`Ained::set_bypass`]) | any word, immediately | all-ones | bulk clears, XOR toggles |
//!
//! The hardware accepts at most one masked word per commit. A cross flip
//! touches up to five cells that may live in five different words, so it is
//! built from one masked commit followed by bypass XOR writes.
//!
//! # Example
//!
//! ```
//! use ained::{Ained, Region, SimFabric};
//!
//! let mut device = Ained::new(SimFabric::new(4));
//! device.clear_all();
//!
//! // Two bits in the same 8×8 tile share one commit.
//! device.set_bit(6, 6, true).unwrap();
//! device.set_bit(7, 7, true).unwrap();
//! device.commit().unwrap();
//! assert!(device.get_bit(7, 7).unwrap());
//!
//! // Cross flip on a 5×5 board in the corner of the grid.
//! let region = Region::new(0, 0, 5, 5);
//! device.clear_all();
//! device.flip_lights(region, 2, 2).unwrap();
//! assert_eq!(device.get_board(region).unwrap().lit_count(), 5);
//! ```
//!
//! # Ownership
//!
//! A handle owns its [`Fabric`]. It is not `Clone`, and every mutating
//! operation takes `&mut self`, so one handle is one writer. On Linux,
//! [`MmioFabric`] additionally holds a process-wide claim so that a second
//! mapping of the same device fails with [`AinedError::AlreadyOpen`].

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

// Grid geometry (addressing, regions, dense boards)
pub mod grid;

// Pending masked write
pub mod transaction;

// Register map of the fabric
pub mod regs;

// Hardware seam (simulated and memory-mapped fabrics)
pub mod fabric;

// Device handle
mod device;

// Distance-decay coefficient kernels
pub mod kernel;

// Toggle propagation (Lights Out cross flip)
mod lights;

// .mem / .state images
pub mod persist;

// Device configuration
pub mod config;

// Error taxonomy
pub mod error;

// Tausworthe generator model
pub mod rng;

// Lights Out solver and game strategies
pub mod solver;

pub use config::DeviceConfig;
pub use device::{Ained, DipoleState, MemoryWindow, RegisterSnapshot};
pub use error::{AinedError, IndexKind, Result};
pub use fabric::{Fabric, SimFabric};
pub use grid::{to_physical, Board, Coord, Location, Region, COLUMNS, NUM_WORDS, ROWS, TILE};
pub use kernel::{CoefficientBank, CoefficientKernel, Metric, UNBOUNDED_REACH};
pub use rng::Tausworthe;
pub use solver::{GameOutcome, LightsOutSolver, Strategy};
pub use transaction::{PendingTransaction, TransactionBuffer};

#[cfg(target_os = "linux")]
pub use fabric::MmioFabric;

/// Prelude module for convenient imports.
///
/// ```
/// use ained::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::DeviceConfig;
    pub use crate::device::{Ained, DipoleState};
    pub use crate::error::{AinedError, Result};
    pub use crate::fabric::{Fabric, SimFabric};
    pub use crate::grid::{to_physical, Board, Coord, Location, Region};
    pub use crate::kernel::{CoefficientBank, CoefficientKernel, Metric, UNBOUNDED_REACH};
    pub use crate::rng::Tausworthe;
    pub use crate::solver::{LightsOutSolver, Strategy};

    #[cfg(target_os = "linux")]
    pub use crate::fabric::MmioFabric;
}
