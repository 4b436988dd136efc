//! The device handle.

use core::fmt;

use tracing::{debug, info, warn};

use crate::error::{AinedError, IndexKind, Result};
use crate::fabric::Fabric;
use crate::grid::{Coord, Location, COLUMNS, NUM_WORDS, ROWS};
use crate::kernel::{CoefficientBank, CoefficientKernel, Metric, KERNEL_SIZE};
use crate::regs::{self, coeff_reg, dipole, dipole_reg, BYPASS, COEFF_GROUPS, GROUPS_PER_BANK, NUM_REGS};
use crate::transaction::{PendingTransaction, TransactionBuffer};

#[cfg(target_os = "linux")]
use crate::{config::DeviceConfig, fabric::MmioFabric};

/// Emits a reported condition as a warning and passes the result through.
pub(crate) fn report<T>(result: Result<T>) -> Result<T> {
    result.inspect_err(|error| warn!(%error, "ained"))
}

/// Output and seed registers of one dipole.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DipoleState {
    /// Current generator output.
    pub output: u32,
    /// Tausworthe state `s0, s1, s2`.
    pub seeds: [u32; 3],
}

/// Copy of the register file: the base registers plus every dipole block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterSnapshot {
    /// Registers `0..NUM_REGS`.
    pub base: [u32; NUM_REGS],
    /// One entry per detected dipole.
    pub dipoles: Vec<DipoleState>,
}

impl RegisterSnapshot {
    /// The 64-bit write mask.
    #[must_use]
    pub fn mask(&self) -> u64 {
        u64::from(self.base[regs::MASK_LO]) | (u64::from(self.base[regs::MASK_HI]) << 32)
    }

    /// The twelve coefficient groups.
    #[must_use]
    pub fn coefficient_groups(&self) -> &[u32] {
        &self.base[regs::COEFF_BASE..regs::COEFF_BASE + COEFF_GROUPS]
    }

    /// The bypass register.
    #[must_use]
    pub fn bypass(&self) -> bool {
        self.base[BYPASS] != 0
    }
}

/// Bounds-checked view of the memory plane.
///
/// Only whole 64-bit words cross this interface. Writes go through the
/// device's current write mask, so outside bypass mode only masked bits
/// change.
pub struct MemoryWindow<'a, F: Fabric> {
    fabric: &'a mut F,
}

impl<F: Fabric> MemoryWindow<'_, F> {
    /// Number of words (always [`NUM_WORDS`]).
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        NUM_WORDS
    }

    /// Always false; the plane has a fixed size.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Reads word `index`.
    ///
    /// # Errors
    ///
    /// [`AinedError::OutOfRangeIndex`] for `index >= NUM_WORDS`.
    pub fn read(&self, index: usize) -> Result<u64> {
        check_word(index)?;
        Ok(self.fabric.read_word(index))
    }

    /// Writes word `index`.
    ///
    /// # Errors
    ///
    /// [`AinedError::OutOfRangeIndex`] for `index >= NUM_WORDS`; nothing is
    /// written.
    pub fn write(&mut self, index: usize, value: u64) -> Result<()> {
        check_word(index)?;
        self.fabric.write_word(index, value);
        Ok(())
    }

    /// Iterates over all words.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..NUM_WORDS).map(|i| self.fabric.read_word(i))
    }
}

impl<F: Fabric> fmt::Debug for MemoryWindow<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryWindow").field("len", &NUM_WORDS).finish()
    }
}

fn check_word(index: usize) -> Result<()> {
    if index < NUM_WORDS {
        Ok(())
    } else {
        report(Err(AinedError::out_of_range(IndexKind::Word, index, NUM_WORDS)))
    }
}

fn check_coord(row: usize, col: usize) -> Result<Location> {
    let coord = Coord::new(row, col);
    if coord.is_valid() {
        Ok(coord.to_physical())
    } else {
        report(Err(AinedError::CoordinateOutOfRange {
            row,
            col,
            rows: ROWS,
            cols: COLUMNS,
        }))
    }
}

/// Owned handle to one AiNed instance.
///
/// Holds the fabric, the pending transaction and the host-side copy of the
/// bypass flag. Not `Clone`; every write takes `&mut self`.
///
/// # Example
///
/// ```
/// use ained::{Ained, AinedError, SimFabric};
///
/// let mut device = Ained::new(SimFabric::new(2));
/// device.set_bit(0, 0, true)?;
/// // (0, 8) is in the next tile, so it needs its own commit.
/// assert!(matches!(
///     device.set_bit(0, 8, true),
///     Err(AinedError::CrossWordConflict { pending: 0, requested: 1 })
/// ));
/// device.commit()?;
/// device.set_bit(0, 8, true)?;
/// device.commit()?;
/// assert_eq!(device.words()[..2], [1, 1]);
/// # Ok::<(), AinedError>(())
/// ```
pub struct Ained<F: Fabric> {
    fabric: F,
    tx: TransactionBuffer,
    bypass: bool,
    num_dipoles: usize,
}

#[cfg(target_os = "linux")]
impl Ained<MmioFabric> {
    /// Maps the physical device described by `config`.
    ///
    /// # Errors
    ///
    /// Any error of [`MmioFabric::open`].
    pub fn open(config: &DeviceConfig) -> Result<Self> {
        let fabric = report(MmioFabric::open(config))?;
        Ok(Self::with_dipole_limit(fabric, config.max_dipoles))
    }
}

impl<F: Fabric> Ained<F> {
    /// Wraps a fabric, scanning the whole register window for dipoles.
    #[must_use]
    pub fn new(fabric: F) -> Self {
        Self::with_dipole_limit(fabric, dipole::MAX)
    }

    /// Wraps a fabric. Dipoles are counted from 0 until the first block whose
    /// output register reads zero, stopping at `max_dipoles` or the end of
    /// the register window. The count is fixed for the handle's lifetime.
    #[must_use]
    pub fn with_dipole_limit(fabric: F, max_dipoles: usize) -> Self {
        let window = fabric.register_count().saturating_sub(dipole::BASE) / dipole::STRIDE;
        let num_dipoles = (0..max_dipoles.min(window))
            .take_while(|&d| fabric.read_reg(dipole_reg(d, dipole::OUTPUT)) != 0)
            .count();
        let bypass = fabric.read_reg(BYPASS) != 0;
        info!(num_dipoles, bypass, "ained device ready");
        Self {
            fabric,
            tx: TransactionBuffer::new(),
            bypass,
            num_dipoles,
        }
    }

    /// The underlying fabric.
    #[inline]
    #[must_use]
    pub const fn fabric(&self) -> &F {
        &self.fabric
    }

    /// Releases the fabric. A pending transaction is dropped.
    #[must_use]
    pub fn into_inner(self) -> F {
        self.fabric
    }

    // ---------------------------------------------------------------------
    // Bits and transactions
    // ---------------------------------------------------------------------

    /// Reads cell `(row, col)`.
    ///
    /// # Errors
    ///
    /// [`AinedError::CoordinateOutOfRange`] outside the grid.
    pub fn get_bit(&self, row: usize, col: usize) -> Result<bool> {
        let loc = check_coord(row, col)?;
        Ok(self.read_bit(loc))
    }

    pub(crate) fn read_bit(&self, loc: Location) -> bool {
        self.fabric.read_word(loc.word) & loc.mask() != 0
    }

    /// Stages cell `(row, col)` in the pending transaction.
    ///
    /// # Errors
    ///
    /// [`AinedError::CoordinateOutOfRange`] outside the grid, or
    /// [`AinedError::CrossWordConflict`] if another word is pending (the
    /// pending transaction is kept, this bit is dropped).
    pub fn set_bit(&mut self, row: usize, col: usize, value: bool) -> Result<()> {
        let loc = check_coord(row, col)?;
        report(self.tx.set_bit(loc, value))
    }

    /// Stages raw bits of word `word`: bits in `mask` take their value from
    /// `value`.
    ///
    /// # Errors
    ///
    /// [`AinedError::OutOfRangeIndex`] or [`AinedError::CrossWordConflict`].
    pub fn stage_word(&mut self, word: usize, value: u64, mask: u64) -> Result<()> {
        report(self.tx.stage_word(word, value, mask))
    }

    /// The pending transaction, if any.
    #[inline]
    #[must_use]
    pub const fn pending(&self) -> Option<&PendingTransaction> {
        self.tx.pending()
    }

    /// Drops the pending transaction without writing it.
    pub fn discard(&mut self) -> Option<PendingTransaction> {
        self.tx.discard()
    }

    /// Writes the pending transaction: mask register first, then the word.
    /// Bits outside the mask keep their value.
    ///
    /// # Errors
    ///
    /// [`AinedError::NothingToCommit`] if nothing is pending.
    pub fn commit(&mut self) -> Result<()> {
        let tx = report(self.tx.take())?;
        debug!(
            word = tx.word(),
            mask = format_args!("{:#018x}", tx.mask()),
            value = format_args!("{:#018x}", tx.value()),
            "commit"
        );
        self.fabric.write_mask(tx.mask());
        self.fabric.write_word(tx.word(), tx.value());
        Ok(())
    }

    /// Writes the device write-mask register directly.
    pub fn set_mask(&mut self, mask: u64) {
        self.fabric.write_mask(mask);
    }

    /// The current write-mask register.
    #[must_use]
    pub fn mask(&self) -> u64 {
        self.fabric.read_mask()
    }

    // ---------------------------------------------------------------------
    // Bypass
    // ---------------------------------------------------------------------

    /// Switches bypass mode. Enabling opens the write mask to all ones,
    /// disabling closes it to zero.
    pub fn set_bypass(&mut self, enable: bool) {
        self.fabric.write_reg(BYPASS, u32::from(enable));
        self.fabric.write_mask(if enable { u64::MAX } else { 0 });
        self.bypass = enable;
        debug!(enable, "bypass");
    }

    /// Returns true if bypass mode is enabled.
    #[inline]
    #[must_use]
    pub const fn bypass(&self) -> bool {
        self.bypass
    }

    /// Runs `f` with bypass enabled, then puts bypass back where it was.
    pub(crate) fn with_bypass<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let prior = self.bypass;
        self.set_bypass(true);
        let out = f(self);
        self.set_bypass(prior);
        out
    }

    /// Zeroes all 128 words under bypass. The bypass flag ends as it was.
    /// A pending transaction is left alone.
    pub fn clear_all(&mut self) {
        self.with_bypass(|device| {
            for word in 0..NUM_WORDS {
                device.fabric.write_word(word, 0);
            }
        });
    }

    /// XORs one bit. Only meaningful while bypass is enabled.
    pub(crate) fn xor_bit(&mut self, loc: Location) {
        let word = self.fabric.read_word(loc.word);
        self.fabric.write_word(loc.word, word ^ loc.mask());
    }

    /// Flips cell `(row, col)` alone, under bypass.
    ///
    /// # Errors
    ///
    /// [`AinedError::CoordinateOutOfRange`] outside the grid.
    pub fn flip_isolated_bit(&mut self, row: usize, col: usize) -> Result<()> {
        let loc = check_coord(row, col)?;
        self.with_bypass(|device| device.xor_bit(loc));
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Memory plane
    // ---------------------------------------------------------------------

    /// Bounds-checked word access.
    pub fn memory(&mut self) -> MemoryWindow<'_, F> {
        MemoryWindow {
            fabric: &mut self.fabric,
        }
    }

    /// Copy of all 128 words.
    #[must_use]
    pub fn words(&self) -> [u64; NUM_WORDS] {
        core::array::from_fn(|i| self.fabric.read_word(i))
    }

    // ---------------------------------------------------------------------
    // Coefficients
    // ---------------------------------------------------------------------

    /// Reads coefficient group `index` (`0..12`).
    ///
    /// # Errors
    ///
    /// [`AinedError::OutOfRangeIndex`] for `index >= 12`.
    pub fn coefficient_group(&self, index: usize) -> Result<u32> {
        check_group(index)?;
        Ok(self.fabric.read_reg(coeff_reg(index)))
    }

    /// Writes coefficient group `index` (`0..12`).
    ///
    /// # Errors
    ///
    /// [`AinedError::OutOfRangeIndex`] for `index >= 12`; nothing is written.
    pub fn set_coefficient_group(&mut self, index: usize, value: u32) -> Result<()> {
        check_group(index)?;
        self.fabric.write_reg(coeff_reg(index), value);
        Ok(())
    }

    /// Reads back the kernel stored in `bank`.
    #[must_use]
    pub fn coefficient_kernel(&self, bank: CoefficientBank) -> CoefficientKernel {
        let first = bank.first_group();
        let groups: [u32; GROUPS_PER_BANK] =
            core::array::from_fn(|i| self.fabric.read_reg(coeff_reg(first + i)));
        CoefficientKernel::from_groups(groups)
    }

    /// Stores `kernel` in `bank`.
    pub fn load_kernel(&mut self, bank: CoefficientBank, kernel: &CoefficientKernel) {
        for (i, group) in kernel.to_groups().into_iter().enumerate() {
            self.fabric.write_reg(coeff_reg(bank.first_group() + i), group);
        }
    }

    /// Generates a kernel and stores it in `bank`.
    pub fn set_coefficients(
        &mut self,
        bank: CoefficientBank,
        metric: Metric,
        factor: f32,
        reach: u32,
    ) -> CoefficientKernel {
        let kernel = CoefficientKernel::generate(metric, factor, reach);
        self.load_kernel(bank, &kernel);
        debug!(%bank, %metric, factor, reach, "coefficients");
        kernel
    }

    /// The 5×5 quadrant of `bank` as probabilities, origin 1.0.
    #[must_use]
    pub fn coefficient_matrix(&self, bank: CoefficientBank) -> [f32; KERNEL_SIZE * KERNEL_SIZE] {
        self.coefficient_kernel(bank).matrix()
    }

    // ---------------------------------------------------------------------
    // Dipoles
    // ---------------------------------------------------------------------

    /// Number of dipoles found when the handle was created.
    #[inline]
    #[must_use]
    pub const fn num_dipoles(&self) -> usize {
        self.num_dipoles
    }

    /// Output and seeds of dipole `index`.
    ///
    /// # Errors
    ///
    /// [`AinedError::OutOfRangeIndex`] for `index >= num_dipoles()`.
    pub fn dipole_rng(&self, index: usize) -> Result<DipoleState> {
        self.check_dipole(index)?;
        Ok(self.read_dipole(index))
    }

    /// Writes the three seed registers of dipole `index`.
    ///
    /// # Errors
    ///
    /// [`AinedError::OutOfRangeIndex`] for `index >= num_dipoles()`; nothing
    /// is written.
    pub fn set_dipole_seeds(&mut self, index: usize, seeds: [u32; 3]) -> Result<()> {
        self.check_dipole(index)?;
        for (i, seed) in seeds.into_iter().enumerate() {
            self.fabric.write_reg(dipole_reg(index, dipole::SEED0 + i), seed);
        }
        Ok(())
    }

    /// Copies the base registers and every dipole block.
    #[must_use]
    pub fn register_snapshot(&self) -> RegisterSnapshot {
        RegisterSnapshot {
            base: core::array::from_fn(|i| self.fabric.read_reg(i)),
            dipoles: (0..self.num_dipoles).map(|d| self.read_dipole(d)).collect(),
        }
    }

    fn read_dipole(&self, index: usize) -> DipoleState {
        let reg = |field| self.fabric.read_reg(dipole_reg(index, field));
        DipoleState {
            output: reg(dipole::OUTPUT),
            seeds: [reg(dipole::SEED0), reg(dipole::SEED0 + 1), reg(dipole::SEED0 + 2)],
        }
    }

    fn check_dipole(&self, index: usize) -> Result<()> {
        if index < self.num_dipoles {
            Ok(())
        } else {
            report(Err(AinedError::out_of_range(
                IndexKind::Dipole,
                index,
                self.num_dipoles,
            )))
        }
    }

    // Raw register access for the persistence layer.

    pub(crate) fn read_reg(&self, index: usize) -> u32 {
        self.fabric.read_reg(index)
    }

    pub(crate) fn write_reg(&mut self, index: usize, value: u32) {
        self.fabric.write_reg(index, value);
    }

    pub(crate) fn read_word(&self, index: usize) -> u64 {
        self.fabric.read_word(index)
    }

    pub(crate) fn write_word(&mut self, index: usize, value: u64) {
        self.fabric.write_word(index, value);
    }

    /// Re-reads the bypass flag after the register file was overwritten.
    pub(crate) fn sync_bypass(&mut self) {
        self.bypass = self.fabric.read_reg(BYPASS) != 0;
    }
}

fn check_group(index: usize) -> Result<()> {
    if index < COEFF_GROUPS {
        Ok(())
    } else {
        report(Err(AinedError::out_of_range(
            IndexKind::CoefficientGroup,
            index,
            COEFF_GROUPS,
        )))
    }
}

impl<F: Fabric> fmt::Debug for Ained<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ained")
            .field("num_dipoles", &self.num_dipoles)
            .field("bypass", &self.bypass)
            .field("pending", &self.tx.pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::SimFabric;

    fn device() -> Ained<SimFabric> {
        Ained::new(SimFabric::new(4))
    }

    #[test]
    fn test_commit_respects_mask() {
        let mut dev = device();
        dev.set_bypass(true);
        dev.memory().write(0, 0xFFFF_0000_FFFF_0000).unwrap();
        dev.set_bypass(false);

        dev.set_bit(0, 0, true).unwrap(); // bit 0
        dev.set_bit(2, 0, false).unwrap(); // bit 16
        dev.commit().unwrap();
        assert_eq!(dev.words()[0], 0xFFFF_0000_FFFE_0001);
        assert!(dev.pending().is_none());
    }

    #[test]
    fn test_commit_without_pending() {
        let mut dev = device();
        assert!(matches!(dev.commit(), Err(AinedError::NothingToCommit)));
    }

    #[test]
    fn test_coordinates_checked() {
        let mut dev = device();
        assert!(dev.get_bit(128, 0).is_err());
        assert!(dev.set_bit(0, 64, true).is_err());
        assert!(dev.flip_isolated_bit(200, 0).is_err());
        assert!(dev.pending().is_none());
    }

    #[test]
    fn test_bypass_drives_mask() {
        let mut dev = device();
        dev.set_bypass(true);
        assert_eq!(dev.mask(), u64::MAX);
        assert!(dev.fabric().bypass_enabled());
        dev.set_bypass(false);
        assert_eq!(dev.mask(), 0);
        assert!(!dev.bypass());
    }

    #[test]
    fn test_clear_all_restores_bypass() {
        let mut dev = device();
        dev.set_bypass(true);
        dev.memory().write(17, u64::MAX).unwrap();
        dev.clear_all();
        assert!(dev.bypass());
        assert_eq!(dev.mask(), u64::MAX);

        dev.set_bypass(false);
        dev.clear_all();
        assert!(!dev.bypass());
        assert!(dev.words().iter().all(|&w| w == 0));
    }

    #[test]
    fn test_flip_isolated_bit() {
        let mut dev = device();
        dev.flip_isolated_bit(9, 9).unwrap();
        assert!(dev.get_bit(9, 9).unwrap());
        assert_eq!(dev.words()[9], 1 << 9);
        dev.flip_isolated_bit(9, 9).unwrap();
        assert!(!dev.get_bit(9, 9).unwrap());
        assert!(!dev.bypass());
    }

    #[test]
    fn test_memory_window_bounds() {
        let mut dev = device();
        let mut mem = dev.memory();
        assert_eq!(mem.len(), 128);
        assert!(mem.read(128).is_err());
        assert!(mem.write(128, 1).is_err());
        // Outside bypass the mask is closed; the write is a no-op.
        mem.write(0, u64::MAX).unwrap();
        assert_eq!(mem.read(0).unwrap(), 0);
        assert_eq!(mem.iter().count(), 128);
    }

    #[test]
    fn test_coefficient_groups() {
        let mut dev = device();
        dev.set_coefficient_group(11, 0xDEAD_BEEF).unwrap();
        assert_eq!(dev.coefficient_group(11).unwrap(), 0xDEAD_BEEF);
        assert!(dev.coefficient_group(12).is_err());
        assert!(dev.set_coefficient_group(12, 1).is_err());
        assert_eq!(dev.read_reg(BYPASS), 0);
    }

    #[test]
    fn test_kernel_banks_are_disjoint() {
        let mut dev = device();
        let high = dev.set_coefficients(CoefficientBank::High, Metric::Euclidean, 0.7, 3);
        let low = dev.set_coefficients(CoefficientBank::Low, Metric::Manhattan, 1.0, 2);
        assert_eq!(dev.coefficient_kernel(CoefficientBank::High), high);
        assert_eq!(dev.coefficient_kernel(CoefficientBank::Low), low);
        assert_eq!(dev.coefficient_matrix(CoefficientBank::Low), low.matrix());
        assert_eq!(dev.register_snapshot().coefficient_groups()[6..], low.to_groups());
    }

    #[test]
    fn test_dipoles() {
        let mut dev = device();
        assert_eq!(dev.num_dipoles(), 4);
        dev.set_dipole_seeds(3, [11, 22, 33]).unwrap();
        assert_eq!(dev.dipole_rng(3).unwrap().seeds, [11, 22, 33]);
        assert_ne!(dev.dipole_rng(3).unwrap().output, 0);
        assert!(matches!(
            dev.dipole_rng(4),
            Err(AinedError::OutOfRangeIndex {
                kind: IndexKind::Dipole,
                index: 4,
                limit: 4
            })
        ));
        assert!(dev.set_dipole_seeds(4, [1, 2, 3]).is_err());
        assert_eq!(dev.register_snapshot().dipoles.len(), 4);
    }

    #[test]
    fn test_dipole_limit() {
        let dev = Ained::with_dipole_limit(SimFabric::new(10), 3);
        assert_eq!(dev.num_dipoles(), 3);
        let dev = Ained::new(SimFabric::new(256));
        assert_eq!(dev.num_dipoles(), 256);
    }

    #[test]
    fn test_stage_word_commit() {
        let mut dev = device();
        dev.stage_word(42, 0xFF, 0x0F).unwrap();
        assert!(dev.stage_word(43, 0, 1).is_err());
        dev.commit().unwrap();
        assert_eq!(dev.words()[42], 0x0F);
    }
}
