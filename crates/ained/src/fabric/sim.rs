//! In-memory model of the fabric for tests and `--simulate`.
//!
//! Word writes merge through the mask register as the hardware does; bypass
//! is only recorded, and `tick` steps the per-dipole generators.

use crate::grid::NUM_WORDS;
use crate::regs::{dipole, dipole_reg, BYPASS, MASK_HI, MASK_LO, WINDOW_REGS};
use crate::rng::Tausworthe;

use super::Fabric;

/// In-memory fabric.
///
/// Models the parts of the hardware contract the host can observe:
///
/// - every memory write is merged through the write-mask register,
///   `word = (word & !mask) | (value & mask)`;
/// - the bypass register is stored (the stochastic propagation it enables
///   on hardware is not modelled);
/// - each dipole block holds a taus88 state whose output register is
///   non-zero, so dipole detection finds exactly the configured count.
///
/// # Example
///
/// ```
/// use ained::{Fabric, SimFabric};
///
/// let mut sim = SimFabric::new(2);
/// sim.write_mask(0x0F);
/// sim.write_word(0, u64::MAX);
/// assert_eq!(sim.read_word(0), 0x0F);
/// ```
#[derive(Clone, Debug)]
pub struct SimFabric {
    regs: Vec<u32>,
    words: [u64; NUM_WORDS],
    num_dipoles: usize,
}

impl SimFabric {
    /// Creates a fabric with `num_dipoles` seeded dipoles (capped at the
    /// register window) and a zeroed grid.
    #[must_use]
    pub fn new(num_dipoles: usize) -> Self {
        let num_dipoles = num_dipoles.min(dipole::MAX);
        let mut regs = vec![0u32; WINDOW_REGS];
        for d in 0..num_dipoles {
            let mut rng = Tausworthe::from_seed(d as u32 + 1);
            let output = rng.next_u32().max(1);
            regs[dipole_reg(d, dipole::OUTPUT)] = output;
            for (i, seed) in rng.seeds().into_iter().enumerate() {
                regs[dipole_reg(d, dipole::SEED0 + i)] = seed;
            }
        }
        Self {
            regs,
            words: [0; NUM_WORDS],
            num_dipoles,
        }
    }

    /// The raw memory plane.
    #[must_use]
    pub const fn words(&self) -> &[u64; NUM_WORDS] {
        &self.words
    }

    /// Returns true if the bypass register is set.
    #[must_use]
    pub fn bypass_enabled(&self) -> bool {
        self.regs[BYPASS] != 0
    }

    /// Advances every dipole generator by one step, as the hardware does
    /// once per clock.
    pub fn tick(&mut self) {
        for d in 0..self.num_dipoles {
            let base = dipole_reg(d, dipole::SEED0);
            let mut rng = Tausworthe::new([self.regs[base], self.regs[base + 1], self.regs[base + 2]]);
            self.regs[dipole_reg(d, dipole::OUTPUT)] = rng.next_u32().max(1);
            self.regs[base..base + 3].copy_from_slice(&rng.seeds());
        }
    }

    fn mask(&self) -> u64 {
        u64::from(self.regs[MASK_LO]) | (u64::from(self.regs[MASK_HI]) << 32)
    }
}

impl Default for SimFabric {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Fabric for SimFabric {
    fn register_count(&self) -> usize {
        self.regs.len()
    }

    fn read_reg(&self, index: usize) -> u32 {
        self.regs.get(index).copied().unwrap_or(0)
    }

    fn write_reg(&mut self, index: usize, value: u32) {
        if let Some(reg) = self.regs.get_mut(index) {
            *reg = value;
        }
    }

    fn word_count(&self) -> usize {
        NUM_WORDS
    }

    fn read_word(&self, index: usize) -> u64 {
        self.words.get(index).copied().unwrap_or(0)
    }

    fn write_word(&mut self, index: usize, value: u64) {
        let mask = self.mask();
        if let Some(word) = self.words.get_mut(index) {
            *word = (*word & !mask) | (value & mask);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::NUM_REGS;

    #[test]
    fn test_masked_write() {
        let mut sim = SimFabric::new(0);
        sim.write_mask(u64::MAX);
        sim.write_word(3, 0xAAAA);
        sim.write_mask(0x00FF);
        sim.write_word(3, 0x5555);
        assert_eq!(sim.read_word(3), 0xAA55);

        sim.write_mask(0);
        sim.write_word(3, 0);
        assert_eq!(sim.read_word(3), 0xAA55);
    }

    #[test]
    fn test_dipole_sentinel() {
        let sim = SimFabric::new(3);
        for d in 0..3 {
            assert_ne!(sim.read_reg(dipole_reg(d, dipole::OUTPUT)), 0);
        }
        assert_eq!(sim.read_reg(dipole_reg(3, dipole::OUTPUT)), 0);
        assert!((0..NUM_REGS).all(|r| sim.read_reg(r) == 0));
    }

    #[test]
    fn test_tick_advances_state() {
        let mut sim = SimFabric::new(1);
        let seed = sim.read_reg(dipole_reg(0, dipole::SEED0));
        sim.tick();
        assert_ne!(sim.read_reg(dipole_reg(0, dipole::SEED0)), seed);
        assert_ne!(sim.read_reg(dipole_reg(0, dipole::OUTPUT)), 0);
    }

    #[test]
    fn test_out_of_window() {
        let mut sim = SimFabric::new(0);
        sim.write_reg(WINDOW_REGS, 7);
        assert_eq!(sim.read_reg(WINDOW_REGS), 0);
        sim.write_mask(u64::MAX);
        sim.write_word(NUM_WORDS, 7);
        assert_eq!(sim.read_word(NUM_WORDS), 0);
    }
}
