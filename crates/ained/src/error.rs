//! Error types for device access.
//!
//! Every condition here is locally recoverable: nothing in the library
//! aborts the process. Conditions the device "reports" are returned as `Err`
//! and also emitted as `tracing` warnings at the point of detection.

use std::io;
use std::path::PathBuf;

use core::fmt;
use thiserror::Error;

use crate::grid::{Region, COLUMNS, ROWS};

/// Result type for device operations.
pub type Result<T> = std::result::Result<T, AinedError>;

/// What an out-of-range index was addressing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    /// A dipole number.
    Dipole,
    /// One of the twelve coefficient register groups.
    CoefficientGroup,
    /// A memory word.
    Word,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dipole => "dipole",
            Self::CoefficientGroup => "coefficient group",
            Self::Word => "word",
        })
    }
}

/// Device errors.
#[derive(Debug, Error)]
pub enum AinedError {
    /// The register or memory window could not be mapped.
    #[error("failed to map {window} window of {}: {source}", path.display())]
    Mapping {
        /// Which window failed (`"register"` or `"memory"`).
        window: &'static str,
        /// Device node that was opened.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A handle to the physical device is already live in this process.
    #[error("device is already open in this process")]
    AlreadyOpen,

    /// A bit or word was staged for a different word than the pending one.
    /// The pending transaction is left untouched.
    #[error("cannot stage word {requested}: word {pending} has an uncommitted transaction")]
    CrossWordConflict {
        /// Word of the pending transaction.
        pending: usize,
        /// Word the rejected write targeted.
        requested: usize,
    },

    /// Commit with an empty transaction buffer.
    #[error("nothing to commit")]
    NothingToCommit,

    /// An operation that drives the transaction buffer itself found a
    /// caller's transaction still pending.
    #[error("transaction pending on word {word}; commit it before this operation")]
    TransactionPending {
        /// Word of the pending transaction.
        word: usize,
    },

    /// Dipole, coefficient-group or word index beyond the valid count.
    #[error("{kind} index {index} out of range (only {limit} available)")]
    OutOfRangeIndex {
        /// What was indexed.
        kind: IndexKind,
        /// The requested index.
        index: usize,
        /// Number of valid indices.
        limit: usize,
    },

    /// A cell coordinate outside the grid or the addressed region.
    #[error("cell ({row}, {col}) outside {rows}x{cols}")]
    CoordinateOutOfRange {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Rows available.
        rows: usize,
        /// Columns available.
        cols: usize,
    },

    /// A region that is empty or does not fit the grid.
    #[error("region {0} does not fit the {ROWS}x{COLUMNS} grid")]
    RegionOutOfRange(Region),

    /// A board whose cell count does not match its region.
    #[error("board has {actual} cells, expected {expected}")]
    BoardSizeMismatch {
        /// Cells the region needs.
        expected: usize,
        /// Cells supplied.
        actual: usize,
    },

    /// A store or restore moved fewer units than the image holds. Data that
    /// was transferred before the failure stays in place.
    #[error("short {image} image: {actual} of {expected} words transferred ({source})")]
    PersistenceShortIo {
        /// Which image section (`"memory"`, `"register"`, `"dipole"`).
        image: &'static str,
        /// Words the section holds.
        expected: usize,
        /// Words actually transferred.
        actual: usize,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Invalid device configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Other I/O failure (opening image files, reading configuration).
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AinedError {
    /// Shorthand for an [`AinedError::OutOfRangeIndex`].
    #[must_use]
    pub const fn out_of_range(kind: IndexKind, index: usize, limit: usize) -> Self {
        Self::OutOfRangeIndex { kind, index, limit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = AinedError::CrossWordConflict {
            pending: 0,
            requested: 9,
        };
        assert_eq!(
            e.to_string(),
            "cannot stage word 9: word 0 has an uncommitted transaction"
        );

        let e = AinedError::out_of_range(IndexKind::Dipole, 7, 4);
        assert_eq!(e.to_string(), "dipole index 7 out of range (only 4 available)");

        let e = AinedError::RegionOutOfRange(Region::new(126, 0, 5, 5));
        assert_eq!(e.to_string(), "region 5x5 at (126, 0) does not fit the 128x64 grid");
    }

    #[test]
    fn test_short_io_keeps_source() {
        use std::error::Error as _;

        let e = AinedError::PersistenceShortIo {
            image: "memory",
            expected: 128,
            actual: 3,
            source: io::Error::from(io::ErrorKind::UnexpectedEof),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().starts_with("short memory image: 3 of 128 words"));
    }
}
