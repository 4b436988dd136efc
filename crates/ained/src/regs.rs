//! Register map of the fabric.
//!
//! All indices are in 32-bit register units from the base of the register
//! window.
//!
//! ```text
//! 0x000  MASK_LO      write mask, bits 0..32
//! 0x001  MASK_HI      write mask, bits 32..64
//! 0x002  COEFF_0      high kernel, groups 0..6
//! ...
//! 0x008  COEFF_6      low kernel, groups 6..12
//! ...
//! 0x00D  COEFF_11
//! 0x00E  BYPASS       non-zero = bypass enabled
//! 0x400  DIPOLE[0]    output, seed0, seed1, seed2
//! 0x404  DIPOLE[1]    ...
//! ```

/// Low half of the 64-bit write mask.
pub const MASK_LO: usize = 0;

/// High half of the 64-bit write mask.
pub const MASK_HI: usize = 1;

/// First coefficient group register.
pub const COEFF_BASE: usize = 2;

/// Number of coefficient group registers.
pub const COEFF_GROUPS: usize = 12;

/// Coefficient groups per kernel bank.
pub const GROUPS_PER_BANK: usize = 6;

/// Bypass enable register.
pub const BYPASS: usize = 14;

/// Number of base registers (mask, coefficients, bypass).
pub const NUM_REGS: usize = 15;

/// Size of the register window in 32-bit registers (8 KiB).
pub const WINDOW_REGS: usize = 2048;

/// Per-dipole register block.
pub mod dipole {
    /// First dipole register.
    pub const BASE: usize = 0x400;

    /// Registers per dipole.
    pub const STRIDE: usize = 4;

    /// Current generator output (read-only on hardware).
    pub const OUTPUT: usize = 0;

    /// First of the three seed registers.
    pub const SEED0: usize = 1;

    /// Largest dipole count that fits the register window.
    pub const MAX: usize = (super::WINDOW_REGS - BASE) / STRIDE;
}

/// Register index of `field` in the block of dipole `index`.
#[inline]
#[must_use]
pub const fn dipole_reg(index: usize, field: usize) -> usize {
    dipole::BASE + index * dipole::STRIDE + field
}

/// Register index of coefficient group `group` (`0..COEFF_GROUPS`).
#[inline]
#[must_use]
pub const fn coeff_reg(group: usize) -> usize {
    COEFF_BASE + group
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(coeff_reg(0), 2);
        assert_eq!(coeff_reg(COEFF_GROUPS - 1), 13);
        assert_eq!(coeff_reg(COEFF_GROUPS), BYPASS);
        assert_eq!(BYPASS + 1, NUM_REGS);
        assert_eq!(GROUPS_PER_BANK * 2, COEFF_GROUPS);
    }

    #[test]
    fn test_dipole_block() {
        assert_eq!(dipole_reg(0, dipole::OUTPUT), 0x400);
        assert_eq!(dipole_reg(1, dipole::SEED0 + 2), 0x407);
        assert_eq!(dipole::MAX, 256);
        assert!(dipole_reg(dipole::MAX - 1, 3) < WINDOW_REGS);
    }
}
