//! Executes shell commands against a device.

use std::io::Write;

use anyhow::{Context, Result};
use ained::{Ained, CoefficientBank, Fabric, Region};

use crate::command::{Command, COMMANDS};
use crate::render;

/// Mask staged by the `test` command's committed word.
pub const TEST_COMMIT_MASK: u64 = 0xAAAA_AAAA_AAAA_AAAA;

/// Mask left in place for the `test` command's raw write.
pub const TEST_RAW_MASK: u64 = 0x8000_8000_8000_8000;

/// What the shell does after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Leave the shell.
    Quit,
}

/// Runs `command`, writing its output to `out`.
///
/// # Errors
///
/// Device errors and output errors. The device has already logged the
/// former; the shell reports them and keeps going.
pub fn execute<F: Fabric>(device: &mut Ained<F>, command: &Command, out: &mut impl Write) -> Result<Flow> {
    match command {
        Command::Quit => return Ok(Flow::Quit),
        Command::Help => {
            writeln!(out, "Commands:")?;
            for info in COMMANDS {
                writeln!(out, " * {:<52} {}", info.usage, info.help)?;
            }
        }
        Command::Print => render::write_memory(out, &device.words())?,
        Command::Info => render::write_info(out, &device.register_snapshot(), &device.words())?,
        Command::Coeffs => {
            for bank in CoefficientBank::ALL {
                render::write_kernel(out, bank, &device.coefficient_kernel(bank))?;
            }
        }
        &Command::UpdateCoeffs {
            metric,
            bank,
            factor,
            reach,
        } => {
            writeln!(out, "Update coefficients {bank} {metric} with factor {factor:.2}, reach {reach}")?;
            let kernel = device.set_coefficients(bank, metric, factor, reach);
            render::write_kernel(out, bank, &kernel)?;
        }
        &Command::Set { row, col, value } => {
            device.set_bit(row, col, value)?;
            writeln!(out, "Staged ({row}, {col}) = {}", u8::from(value))?;
        }
        Command::Commit => {
            device.commit()?;
            writeln!(out, "Committed")?;
        }
        Command::Clear => {
            device.clear_all();
            writeln!(out, "Cleared memory")?;
        }
        Command::Store(name) => {
            device
                .store(name)
                .with_context(|| format!("failed to store image '{}'", name.display()))?;
            writeln!(out, "Stored '{}'", name.display())?;
        }
        Command::Restore(name) => {
            device
                .restore(name)
                .with_context(|| format!("failed to restore image '{}'", name.display()))?;
            writeln!(out, "Restored '{}'", name.display())?;
        }
        &Command::Flip { row, col } => {
            device.flip_lights(Region::FULL, row, col)?;
            writeln!(out, "Flipped ({row}, {col})")?;
        }
        &Command::Seed { dipole, seeds } => {
            device.set_dipole_seeds(dipole, seeds)?;
            writeln!(
                out,
                "Dipole {dipole} seeds {:08X} {:08X} {:08X}",
                seeds[0], seeds[1], seeds[2]
            )?;
        }
        Command::Test => {
            // One committed word through a pattern mask, then a raw write
            // through a sparser mask left in the register.
            device.stage_word(13, u64::MAX, TEST_COMMIT_MASK)?;
            device.commit()?;
            device.set_mask(TEST_RAW_MASK);
            device.memory().write(1, u64::MAX)?;
            writeln!(out, "Wrote word 13 through {TEST_COMMIT_MASK:#018x}")?;
            writeln!(out, "Wrote word 1 through {TEST_RAW_MASK:#018x}")?;
        }
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ained::{AinedError, Metric, SimFabric};

    fn run(device: &mut Ained<SimFabric>, line: &str) -> Result<(Flow, String)> {
        let command: Command = line.parse()?;
        let mut out = Vec::new();
        let flow = execute(device, &command, &mut out)?;
        Ok((flow, String::from_utf8(out)?))
    }

    #[test]
    fn test_set_commit_flow() {
        let mut device = Ained::new(SimFabric::new(1));
        run(&mut device, "set 9 9 1").unwrap();
        run(&mut device, "set 10 10 1").unwrap();
        assert!(!device.get_bit(9, 9).unwrap());
        run(&mut device, "commit").unwrap();
        assert!(device.get_bit(9, 9).unwrap());
        assert!(device.get_bit(10, 10).unwrap());
    }

    #[test]
    fn test_errors_surface() {
        let mut device = Ained::new(SimFabric::new(1));
        let err = run(&mut device, "commit").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AinedError>(),
            Some(AinedError::NothingToCommit)
        ));
        assert!(run(&mut device, "seed 5 1 2 3").is_err());
        assert!(run(&mut device, "flip 200 0").is_err());
    }

    #[test]
    fn test_update_coeffs_loads_bank() {
        let mut device = Ained::new(SimFabric::new(0));
        let (_, text) = run(&mut device, "update_coeffs_manhattan low 0.5").unwrap();
        assert!(text.contains("low manhattan"));
        assert_eq!(
            device.coefficient_kernel(CoefficientBank::Low),
            ained::CoefficientKernel::generate(Metric::Manhattan, 0.5, ained::UNBOUNDED_REACH)
        );
        assert_eq!(device.coefficient_kernel(CoefficientBank::High), Default::default());
    }

    #[test]
    fn test_demo_write() {
        let mut device = Ained::new(SimFabric::new(0));
        run(&mut device, "test").unwrap();
        let words = device.words();
        assert_eq!(words[13], TEST_COMMIT_MASK);
        assert_eq!(words[1], TEST_RAW_MASK);
        assert_eq!(device.mask(), TEST_RAW_MASK);
    }

    #[test]
    fn test_flip_and_quit() {
        let mut device = Ained::new(SimFabric::new(0));
        run(&mut device, "flip 0 0").unwrap();
        assert!(device.get_bit(0, 1).unwrap());
        let (flow, _) = run(&mut device, "quit").unwrap();
        assert_eq!(flow, Flow::Quit);
    }

    #[test]
    fn test_help_lists_every_command() {
        let mut device = Ained::new(SimFabric::new(0));
        let (_, text) = run(&mut device, "help").unwrap();
        for info in COMMANDS {
            assert!(text.contains(info.usage));
        }
    }
}
