//! Property-based tests for addressing, masked commits and bypass clears.
//!
//! All tests run against the simulated fabric, which merges every word write
//! through the write-mask register like the hardware does.

use proptest::prelude::*;
use ained::{to_physical, Ained, AinedError, SimFabric, COLUMNS, NUM_WORDS, ROWS};

fn coord() -> impl Strategy<Value = (usize, usize)> {
    (0..ROWS, 0..COLUMNS)
}

fn words() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(any::<u64>(), NUM_WORDS)
}

fn loaded(words: &[u64]) -> Ained<SimFabric> {
    let mut device = Ained::new(SimFabric::new(0));
    device.set_bypass(true);
    let mut memory = device.memory();
    for (i, &w) in words.iter().enumerate() {
        memory.write(i, w).unwrap();
    }
    device.set_bypass(false);
    device
}

// =============================================================================
// Addressing
// =============================================================================

proptest! {
    /// Every cell maps to a word and bit in range, and back to itself.
    #[test]
    fn prop_addressing_inverse((row, col) in coord()) {
        let loc = to_physical(row, col);
        prop_assert!(loc.word < NUM_WORDS);
        let bit = loc.bit as usize;
        prop_assert!(bit < 64);
        prop_assert_eq!((loc.word / 8) * 8 + bit / 8, row);
        prop_assert_eq!((loc.word % 8) * 8 + bit % 8, col);
    }

    /// Distinct cells never share a (word, bit) pair.
    #[test]
    fn prop_addressing_injective(a in coord(), b in coord()) {
        prop_assume!(a != b);
        prop_assert_ne!(to_physical(a.0, a.1), to_physical(b.0, b.1));
    }

    /// Cells in one 8×8 tile share a word.
    #[test]
    fn prop_tile_shares_word((row, col) in coord(), dr in 0usize..8, dc in 0usize..8) {
        let (tr, tc) = (row - row % 8, col - col % 8);
        prop_assert_eq!(to_physical(tr, tc).word, to_physical(tr + dr, tc + dc).word);
    }
}

// =============================================================================
// Masked commit
// =============================================================================

proptest! {
    /// A commit changes only the masked bits of the one pending word.
    #[test]
    fn prop_masked_commit(
        initial in words(),
        word in 0..NUM_WORDS,
        value: u64,
        mask: u64,
    ) {
        let mut device = loaded(&initial);
        device.stage_word(word, value, mask).unwrap();
        device.commit().unwrap();

        let after = device.words();
        for (i, (&before, &now)) in initial.iter().zip(after.iter()).enumerate() {
            if i == word {
                prop_assert_eq!(now, (before & !mask) | (value & mask));
            } else {
                prop_assert_eq!(now, before);
            }
        }
        prop_assert!(device.pending().is_none());
    }

    /// Bits staged in the same word merge into one commit.
    #[test]
    fn prop_same_word_merge(
        (row, col) in coord(),
        dr in 0usize..8,
        dc in 0usize..8,
    ) {
        let (tr, tc) = (row - row % 8, col - col % 8);
        let mut device = Ained::new(SimFabric::new(0));
        device.set_bit(row, col, true).unwrap();
        device.set_bit(tr + dr, tc + dc, true).unwrap();
        device.commit().unwrap();
        prop_assert!(device.get_bit(row, col).unwrap());
        prop_assert!(device.get_bit(tr + dr, tc + dc).unwrap());
        prop_assert_eq!(device.words().iter().map(|w| w.count_ones()).sum::<u32>(),
            if (row, col) == (tr + dr, tc + dc) { 1 } else { 2 });
    }

    /// A bit in another word is rejected and the pending word survives.
    #[test]
    fn prop_cross_word_conflict(a in coord(), b in coord()) {
        let (wa, wb) = (to_physical(a.0, a.1).word, to_physical(b.0, b.1).word);
        prop_assume!(wa != wb);

        let mut device = Ained::new(SimFabric::new(0));
        device.set_bit(a.0, a.1, true).unwrap();
        let err = device.set_bit(b.0, b.1, true).unwrap_err();
        let is_conflict = matches!(err, AinedError::CrossWordConflict { .. });
        prop_assert!(is_conflict);
        prop_assert_eq!(device.pending().map(|tx| tx.word()), Some(wa));

        device.commit().unwrap();
        prop_assert!(device.get_bit(a.0, a.1).unwrap());
        prop_assert!(!device.get_bit(b.0, b.1).unwrap());
    }

    /// Writing a word through a zero mask changes nothing.
    #[test]
    fn prop_closed_mask_ignores_writes(initial in words(), word in 0..NUM_WORDS, value: u64) {
        let mut device = loaded(&initial);
        device.set_mask(0);
        let mut fabric = device.into_inner();
        ained::Fabric::write_word(&mut fabric, word, value);
        prop_assert_eq!(fabric.words()[word], initial[word]);
    }
}

// =============================================================================
// Bypass
// =============================================================================

proptest! {
    /// clear_all zeroes every word and leaves the bypass flag as it was.
    #[test]
    fn prop_clear_all(initial in words(), bypass: bool) {
        let mut device = loaded(&initial);
        device.set_bypass(bypass);
        device.clear_all();
        prop_assert!(device.words().iter().all(|&w| w == 0));
        prop_assert_eq!(device.bypass(), bypass);
    }

    /// flip_isolated_bit touches exactly one bit.
    #[test]
    fn prop_isolated_flip((row, col) in coord(), initial in words()) {
        let mut device = loaded(&initial);
        device.flip_isolated_bit(row, col).unwrap();
        let loc = to_physical(row, col);
        let after = device.words();
        for (i, (&before, &now)) in initial.iter().zip(after.iter()).enumerate() {
            let expected = if i == loc.word { before ^ loc.mask() } else { before };
            prop_assert_eq!(now, expected);
        }
        prop_assert!(!device.bypass());
    }
}
