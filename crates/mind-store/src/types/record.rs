//! Chain records: the append-only log entries.

use serde::{Deserialize, Serialize};

use super::{Epoch, Phase, Transition};

/// One entry of the hash chain.
///
/// Record `sn = n` is the child of record `n - 1`; there is no stored parent
/// pointer. `sn = 0` is the "no parent" sentinel returned by
/// [`ChainRecord::zero`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRecord {
    /// Gap-free position in the chain, starting at 1.
    pub sn: i64,
    /// Hex digest binding this record to its parent and its change.
    pub hash: String,
    /// Item the change concerns.
    pub item_id: Epoch,
    /// When the change was made.
    pub stamp: Epoch,
    /// Declared phase change.
    pub transition: Transition,
}

impl ChainRecord {
    /// The zero-value record standing in for a missing parent.
    pub fn zero() -> Self {
        Self {
            sn: 0,
            hash: String::new(),
            item_id: Epoch::ZERO,
            stamp: Epoch::ZERO,
            transition: Transition::Init,
        }
    }

    /// Sequence number of this record's child.
    pub fn next(&self) -> i64 {
        self.sn + 1
    }

    /// Sequence number of this record's parent.
    pub fn parent(&self) -> i64 {
        self.sn - 1
    }

    /// Whether this is the first record of a chain.
    pub fn is_genesis(&self) -> bool {
        self.sn == 1
    }

    /// Phase before the change.
    pub fn phase_before(&self) -> Phase {
        self.transition.before()
    }

    /// Phase after the change.
    pub fn phase_after(&self) -> Phase {
        self.transition.after()
    }

    /// Parent rendering used inside a canonical change.
    pub fn canonical(&self) -> String {
        format!("Record [{},{}]", self.sn, self.hash)
    }
}

impl Default for ChainRecord {
    fn default() -> Self {
        Self::zero()
    }
}
