//! `ained-lights` - Plays Lights Out on the AiNed grid and reports move counts.
//!
//! Loads a decay kernel into the low coefficient bank, then for each run
//! draws a solvable board, plays it with the chosen strategy and records
//! the number of presses.
//!
//! **Usage:**
//! ```
//! ained-lights [--size <n>] [--strategy optimal|chase|greedy] [--runs <n>]
//!              [--factor <f>] [--reach <n>] [--metric manhattan|euclidean]
//!              [--seed <n>] [--json] [--simulate] [--config <path>]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::process;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use ained::solver::{generate_solvable_board, play};
use ained::{CoefficientBank, Metric, Region, Strategy, Tausworthe, UNBOUNDED_REACH};
use ained_clients::device::DeviceArgs;
use ained_clients::logging;
use ained_clients::render;
use ained_clients::stats::Summary;

/// Run Lights Out games on an AiNed device.
#[derive(Parser)]
#[command(name = "ained-lights", about = "Play Lights Out on the AiNed grid and report move counts")]
struct Args {
    #[command(flatten)]
    device: DeviceArgs,

    /// Board edge length.
    #[arg(long, default_value_t = 5)]
    size: usize,

    /// Top row of the board on the grid.
    #[arg(long, default_value_t = 0)]
    row: usize,

    /// Left column of the board on the grid.
    #[arg(long, default_value_t = 0)]
    col: usize,

    /// How presses are chosen.
    #[arg(long, default_value = "optimal")]
    strategy: Strategy,

    /// Number of games.
    #[arg(long, default_value_t = 100)]
    runs: usize,

    /// Press limit per game.
    #[arg(long, default_value_t = 1000)]
    max_moves: usize,

    /// Coefficient decay factor (0 to 1).
    #[arg(long, default_value_t = 0.7)]
    factor: f32,

    /// Largest coefficient distance (default: unbounded).
    #[arg(long, default_value_t = UNBOUNDED_REACH)]
    reach: u32,

    /// Coefficient distance metric.
    #[arg(long, default_value = "manhattan")]
    metric: Metric,

    /// Seed of the board generator.
    #[arg(long, default_value_t = 1)]
    seed: u32,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,

    /// Log filter directive (overrides RUST_LOG).
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log.as_deref())?;
    ensure!(
        (0.0..=1.0).contains(&args.factor),
        "factor must be between 0 and 1, got {}",
        args.factor
    );

    let mut device = args.device.open()?;
    let region = Region::new(args.row, args.col, args.size, args.size);

    let kernel = device.set_coefficients(CoefficientBank::Low, args.metric, args.factor, args.reach);
    if !args.json {
        render::write_kernel(&mut std::io::stdout().lock(), CoefficientBank::Low, &kernel)?;
    }

    let mut rng = Tausworthe::from_seed(args.seed);
    let mut moves = Vec::with_capacity(args.runs);
    let mut solved = 0;
    for run in 0..args.runs {
        generate_solvable_board(&mut device, region, &mut rng)
            .with_context(|| format!("Failed to set up run {run}"))?;
        let outcome = play(&mut device, region, args.strategy, &mut rng, args.max_moves)
            .with_context(|| format!("Run {run} failed"))?;
        moves.push(outcome.moves);
        solved += usize::from(outcome.solved);
    }

    let Some(summary) = Summary::from_moves(&moves, solved) else {
        eprintln!("No runs requested.");
        process::exit(1);
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{} runs completed, {} solved.", summary.runs, summary.solved);
        println!(
            "Strategy: {}, Metric: {}, Factor: {}, Reach: {}",
            args.strategy, args.metric, args.factor, args.reach
        );
        println!("{summary}");
    }

    if solved < args.runs {
        eprintln!("{} run(s) hit the {}-move limit.", args.runs - solved, args.max_moves);
    }
    Ok(())
}
