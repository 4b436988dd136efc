//! Hardware seam.
//!
//! [`Fabric`] is the raw register file plus memory plane the device handle
//! drives. Two implementations ship with the crate:
//!
//! - [`SimFabric`]: in-memory model of the hardware contract, used by tests,
//!   benches and `--simulate` runs.
//! - [`MmioFabric`] (Linux): the real windows mapped from `/dev/mem`.
//!
//! Accesses are infallible at this level. Indices past the window read as
//! zero and writes to them are dropped; the handle validates indices before
//! they reach the fabric.

mod sim;

#[cfg(target_os = "linux")]
mod mmio;

pub use sim::SimFabric;

#[cfg(target_os = "linux")]
pub use mmio::MmioFabric;

use crate::regs::{MASK_HI, MASK_LO};

/// Register file and memory plane of one AiNed instance.
pub trait Fabric {
    /// Number of 32-bit registers in the register window.
    fn register_count(&self) -> usize;

    /// Reads a 32-bit register.
    fn read_reg(&self, index: usize) -> u32;

    /// Writes a 32-bit register.
    fn write_reg(&mut self, index: usize, value: u32);

    /// Number of 64-bit words in the memory plane.
    fn word_count(&self) -> usize;

    /// Reads a memory word.
    fn read_word(&self, index: usize) -> u64;

    /// Writes a memory word. The device applies the current write mask:
    /// only bits set in the mask change.
    fn write_word(&mut self, index: usize, value: u64);

    /// Writes the 64-bit write mask (little-endian across two registers).
    fn write_mask(&mut self, mask: u64) {
        self.write_reg(MASK_LO, mask as u32);
        self.write_reg(MASK_HI, (mask >> 32) as u32);
    }

    /// Reads the 64-bit write mask.
    fn read_mask(&self) -> u64 {
        u64::from(self.read_reg(MASK_LO)) | (u64::from(self.read_reg(MASK_HI)) << 32)
    }
}

impl<F: Fabric + ?Sized> Fabric for &mut F {
    fn register_count(&self) -> usize {
        (**self).register_count()
    }

    fn read_reg(&self, index: usize) -> u32 {
        (**self).read_reg(index)
    }

    fn write_reg(&mut self, index: usize, value: u32) {
        (**self).write_reg(index, value);
    }

    fn word_count(&self) -> usize {
        (**self).word_count()
    }

    fn read_word(&self, index: usize) -> u64 {
        (**self).read_word(index)
    }

    fn write_word(&mut self, index: usize, value: u64) {
        (**self).write_word(index, value);
    }

    fn write_mask(&mut self, mask: u64) {
        (**self).write_mask(mask);
    }

    fn read_mask(&self) -> u64 {
        (**self).read_mask()
    }
}

impl<F: Fabric + ?Sized> Fabric for Box<F> {
    fn register_count(&self) -> usize {
        (**self).register_count()
    }

    fn read_reg(&self, index: usize) -> u32 {
        (**self).read_reg(index)
    }

    fn write_reg(&mut self, index: usize, value: u32) {
        (**self).write_reg(index, value);
    }

    fn word_count(&self) -> usize {
        (**self).word_count()
    }

    fn read_word(&self, index: usize) -> u64 {
        (**self).read_word(index)
    }

    fn write_word(&mut self, index: usize, value: u64) {
        (**self).write_word(index, value);
    }

    fn write_mask(&mut self, mask: u64) {
        (**self).write_mask(mask);
    }

    fn read_mask(&self) -> u64 {
        (**self).read_mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_split() {
        let mut fabric = SimFabric::new(0);
        fabric.write_mask(0x0123_4567_89AB_CDEF);
        assert_eq!(fabric.read_reg(MASK_LO), 0x89AB_CDEF);
        assert_eq!(fabric.read_reg(MASK_HI), 0x0123_4567);
        assert_eq!(fabric.read_mask(), 0x0123_4567_89AB_CDEF);
    }

    fn fill<F: Fabric>(mut fabric: F, value: u64) {
        fabric.write_mask(u64::MAX);
        for i in 0..fabric.word_count() {
            fabric.write_word(i, value);
        }
    }

    #[test]
    fn test_forwarding_impls() {
        let mut sim = SimFabric::new(1);
        fill(&mut sim, 0xF0);
        assert!(sim.words().iter().all(|&w| w == 0xF0));

        let mut boxed: Box<dyn Fabric> = Box::new(sim);
        fill(&mut boxed, 0x0F);
        assert_eq!(boxed.read_word(127), 0x0F);
        assert_eq!(boxed.register_count(), crate::regs::WINDOW_REGS);
    }
}
