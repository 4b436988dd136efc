//! Shared plumbing for the AiNed client binaries.
//!
//! - [`command`]: the shell's command table and line parser
//! - [`session`]: executes parsed commands against a device
//! - [`render`]: text views of memory, registers and kernels
//! - [`device`]: `--simulate` / `--config` device selection
//! - [`logging`]: `tracing` subscriber setup
//! - [`stats`]: move-count summaries for game runs

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod command;
pub mod device;
pub mod logging;
pub mod render;
pub mod session;
pub mod stats;
