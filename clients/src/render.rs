//! Text views of device state.

use std::io::{self, Write};

use ained::regs::{BYPASS, COEFF_BASE};
use ained::{to_physical, CoefficientBank, CoefficientKernel, RegisterSnapshot, COLUMNS, ROWS, TILE};

/// Prints the grid, one line per row, columns 63 down to 0 grouped by tile.
///
/// # Errors
///
/// Any write error of `out`.
pub fn write_memory(out: &mut impl Write, words: &[u64]) -> io::Result<()> {
    write!(out, "     |")?;
    for col in (0..COLUMNS).rev() {
        write!(out, " {col:02}")?;
        if col % TILE == 0 {
            write!(out, " ")?;
        }
    }
    writeln!(out)?;
    writeln!(out)?;

    for row in 0..ROWS {
        write!(out, "{row:5}|")?;
        for col in (0..COLUMNS).rev() {
            let loc = to_physical(row, col);
            let lit = words.get(loc.word).is_some_and(|w| w & loc.mask() != 0);
            write!(out, "  {}", u8::from(lit))?;
            if col % TILE == 0 {
                write!(out, " ")?;
            }
        }
        writeln!(out)?;
        if row % TILE == TILE - 1 {
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Prints the register file, the dipole table and the raw words.
///
/// # Errors
///
/// Any write error of `out`.
pub fn write_info(out: &mut impl Write, snapshot: &RegisterSnapshot, words: &[u64]) -> io::Result<()> {
    writeln!(out, "Registers:")?;
    writeln!(out, " MASK:     {:016X}", snapshot.mask())?;
    for (i, group) in snapshot.coefficient_groups().iter().enumerate() {
        writeln!(out, " COEFF_{i:<2}: {group:08X}  (reg {})", COEFF_BASE + i)?;
    }
    writeln!(out, " BYPASS:   {:08X}", snapshot.base[BYPASS])?;

    writeln!(out, "Dipoles ({})", snapshot.dipoles.len())?;
    writeln!(out, " ID  Rand       S1         S2         S3")?;
    for (i, d) in snapshot.dipoles.iter().enumerate() {
        writeln!(
            out,
            " {i:02}: {:08X} - {:08X} - {:08X} - {:08X}",
            d.output, d.seeds[0], d.seeds[1], d.seeds[2]
        )?;
    }

    writeln!(out, "Memory:")?;
    for (i, w) in words.iter().enumerate() {
        writeln!(out, " {i:03}: {w:016X}")?;
    }
    Ok(())
}

/// Prints the quadrant of one kernel.
///
/// # Errors
///
/// Any write error of `out`.
pub fn write_kernel(out: &mut impl Write, bank: CoefficientBank, kernel: &CoefficientKernel) -> io::Result<()> {
    writeln!(out, "Right bottom quadrant of the coefficient {bank} matrix.")?;
    writeln!(out)?;
    writeln!(out, "{kernel}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ained::{Ained, Metric, SimFabric};

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_memory_grid() {
        let mut words = [0u64; 128];
        let loc = to_physical(0, 0);
        words[loc.word] |= loc.mask();
        let text = render(|out| write_memory(out, &words));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("     | 63 62"));
        // Column 0 is printed last.
        assert!(lines[2].trim_end().ends_with('1'));
        assert_eq!(lines[2].matches('1').count(), 1);
        assert_eq!(text.lines().filter(|l| l.contains('|')).count(), ROWS + 1);
    }

    #[test]
    fn test_info() {
        let mut device = Ained::new(SimFabric::new(2));
        device.set_mask(0xAAAA_0000_0000_5555);
        let text = render(|out| write_info(out, &device.register_snapshot(), &device.words()));
        assert!(text.contains("MASK:     AAAA000000005555"));
        assert!(text.contains("Dipoles (2)"));
        assert!(text.contains(" 127: 0000000000000000"));
    }

    #[test]
    fn test_kernel() {
        let kernel = CoefficientKernel::generate(Metric::Manhattan, 0.5, 2);
        let text = render(|out| write_kernel(out, CoefficientBank::Low, &kernel));
        assert!(text.starts_with("Right bottom quadrant of the coefficient low matrix."));
        assert!(text.contains("  1.00 0.00 0.50 0.25 0.00"));
    }
}
