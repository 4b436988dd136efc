//! `ained-shell` - Interactive command shell for the AiNed memory plane.
//!
//! Reads one command per line from stdin. Command words may be shortened to
//! any unique prefix; `help` lists them.
//!
//! **Usage:**
//! ```
//! ained-shell [--simulate] [--dipoles <n>] [--config <path>] [--log <directive>]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use ained_clients::command::Command;
use ained_clients::device::DeviceArgs;
use ained_clients::logging;
use ained_clients::session::{execute, Flow};

/// Interactive shell over an AiNed device.
#[derive(Parser)]
#[command(name = "ained-shell", about = "Interactive command shell for the AiNed memory plane")]
struct Args {
    #[command(flatten)]
    device: DeviceArgs,

    /// Log filter directive (overrides RUST_LOG).
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log.as_deref())?;

    let mut device = args.device.open()?;
    println!("Found: {} dipoles.", device.num_dipoles());

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut lines = stdin.lock().lines();
    loop {
        {
            let mut out = stdout.lock();
            write!(out, "Command: ")?;
            out.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read command")?;
        if line.trim().is_empty() {
            continue;
        }

        let command: Command = match line.parse() {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        let mut out = stdout.lock();
        match execute(&mut device, &command, &mut out) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(err) => eprintln!("Error: {err:#}"),
        }
    }

    Ok(())
}
