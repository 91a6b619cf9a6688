//! Error types for the item store.
//!
//! [`StoreError`] is returned by every store operation. Integrity failures
//! carry an [`IntegrityFailure`] with the stored hash and the recomputed
//! canonical form, so a corrupted chain can be diagnosed after the fact.
//!
//! "Not found" has no variant: an unresolved item reference is a
//! normal [`Outcome`](crate::store::Outcome), not an error.

use std::fmt;

use thiserror::Error;

use crate::types::Phase;

/// Errors that can occur during item store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// A table's recorded `CREATE` statement differs from the expected one.
    #[error("schema mismatch on table {table}: expected `{expected}`, found `{found}`")]
    SchemaMismatch {
        /// Table whose definition diverged.
        table: &'static str,
        /// Statement the store would have created.
        expected: String,
        /// Statement recorded in `sqlite_master` (empty if the table is missing).
        found: String,
    },

    /// A chain record's stored hash does not match the live state.
    #[error("integrity failure: {0}")]
    Integrity(Box<IntegrityFailure>),

    /// The genesis record (`sn = 1`) failed verification. Unrecoverable.
    #[error("genesis record corrupt: {0}")]
    GenesisCorrupt(Box<IntegrityFailure>),

    /// A phase pair outside the six legal transitions.
    #[error("illegal transition: {before} -> {after}")]
    IllegalTransition {
        /// Phase before the transition.
        before: Phase,
        /// Phase after the transition.
        after: Phase,
    },

    /// An integer column held a value that is not a phase.
    #[error("invalid phase value: {0}")]
    InvalidPhase(i64),

    /// Internal error (e.g. arithmetic overflow on an id).
    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Whether this error came out of chain verification.
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_) | Self::GenesisCorrupt(_))
    }
}

/// Why a chain record failed verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Recomputed hash differs from the stored hash.
    HashMismatch,
    /// The record references an item row that no longer exists.
    MissingItem,
    /// The item's live phase disagrees with its newest chain record.
    PhaseDrift,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::HashMismatch => "hash mismatch",
            Self::MissingItem => "missing item",
            Self::PhaseDrift => "phase drift",
        };
        f.write_str(s)
    }
}

/// Diagnostic context for a failed chain record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntegrityFailure {
    /// Kind of failure.
    pub kind: FailureKind,
    /// Sequence number of the failing record.
    pub sn: i64,
    /// Item the record refers to (raw microsecond id).
    pub item_id: i64,
    /// Hash stored in the log.
    pub stored_hash: String,
    /// Hash recomputed from live state.
    pub computed_hash: String,
    /// Canonical form the recomputed hash was taken over.
    pub canonical: String,
}

impl fmt::Display for IntegrityFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at sn={} (item {:x}): stored {} != computed {} over `{}`",
            self.kind, self.sn, self.item_id, self.stored_hash, self.computed_hash, self.canonical
        )
    }
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
