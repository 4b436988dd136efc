//! Pending masked writes.
//!
//! The fabric commits at most one 64-bit word per transaction: the write-mask
//! register selects which bits of the target word change, the value supplies
//! them. [`TransactionBuffer`] accumulates that single word on the host side
//! and refuses to grow into a second one.
//!
//! # Example
//!
//! ```
//! use ained::{to_physical, AinedError, TransactionBuffer};
//!
//! let mut tx = TransactionBuffer::new();
//! tx.set_bit(to_physical(0, 0), true).unwrap();
//! tx.set_bit(to_physical(7, 7), false).unwrap();
//!
//! // (0, 8) lives in word 1: rejected, word 0 stays pending.
//! let err = tx.set_bit(to_physical(0, 8), true).unwrap_err();
//! assert!(matches!(err, AinedError::CrossWordConflict { pending: 0, requested: 1 }));
//!
//! let pending = tx.take().unwrap();
//! assert_eq!(pending.mask(), 1 | (1 << 63));
//! assert_eq!(pending.value(), 1);
//! assert!(tx.take().is_err());
//! ```

use crate::error::{AinedError, IndexKind, Result};
use crate::grid::{Location, NUM_WORDS};

/// One staged masked write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingTransaction {
    word: usize,
    value: u64,
    mask: u64,
}

impl PendingTransaction {
    const fn empty(word: usize) -> Self {
        Self {
            word,
            value: 0,
            mask: 0,
        }
    }

    /// Target word index.
    #[inline]
    #[must_use]
    pub const fn word(&self) -> usize {
        self.word
    }

    /// Value bits to write.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// Bits the commit is allowed to change.
    #[inline]
    #[must_use]
    pub const fn mask(&self) -> u64 {
        self.mask
    }

    fn merge(&mut self, value: u64, mask: u64) {
        self.value = (self.value & !mask) | (value & mask);
        self.mask |= mask;
    }
}

/// Host-side buffer for the single pending transaction.
#[derive(Clone, Debug, Default)]
pub struct TransactionBuffer {
    pending: Option<PendingTransaction>,
}

impl TransactionBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// The pending transaction, if any.
    #[inline]
    #[must_use]
    pub const fn pending(&self) -> Option<&PendingTransaction> {
        self.pending.as_ref()
    }

    /// Returns true if a transaction is pending.
    #[inline]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Stages one bit. Starts a transaction on `loc.word` if none is pending;
    /// once touched, the bit stays in the mask until commit.
    ///
    /// # Errors
    ///
    /// [`AinedError::CrossWordConflict`] if another word is pending. The
    /// pending transaction is unchanged and the bit is dropped.
    pub fn set_bit(&mut self, loc: Location, value: bool) -> Result<()> {
        let bit = loc.mask();
        let slot = self.slot(loc.word)?;
        slot.merge(if value { bit } else { 0 }, bit);
        Ok(())
    }

    /// Stages raw bits of one word: bits selected by `mask` take their value
    /// from `value`, and `mask` joins the pending mask.
    ///
    /// # Errors
    ///
    /// [`AinedError::OutOfRangeIndex`] for `word >= NUM_WORDS`, or
    /// [`AinedError::CrossWordConflict`] if another word is pending.
    pub fn stage_word(&mut self, word: usize, value: u64, mask: u64) -> Result<()> {
        if word >= NUM_WORDS {
            return Err(AinedError::out_of_range(IndexKind::Word, word, NUM_WORDS));
        }
        self.slot(word)?.merge(value, mask);
        Ok(())
    }

    /// Removes and returns the pending transaction.
    ///
    /// # Errors
    ///
    /// [`AinedError::NothingToCommit`] if the buffer is empty.
    pub fn take(&mut self) -> Result<PendingTransaction> {
        self.pending.take().ok_or(AinedError::NothingToCommit)
    }

    /// Drops the pending transaction without committing it.
    pub fn discard(&mut self) -> Option<PendingTransaction> {
        self.pending.take()
    }

    fn slot(&mut self, word: usize) -> Result<&mut PendingTransaction> {
        match self.pending {
            Some(p) if p.word != word => Err(AinedError::CrossWordConflict {
                pending: p.word,
                requested: word,
            }),
            _ => Ok(self.pending.get_or_insert(PendingTransaction::empty(word))),
        }
    }
}
