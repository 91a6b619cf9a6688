//! High-level store API.
//!
//! [`StuffStore`] composes the repositories into the mutation protocol:
//! every write lands in one `SQLite` transaction together with exactly one
//! chain record.

mod stuff_store;

use std::fmt;

pub use crate::sqlite::repositories::{ItemQuery, Order};
pub use stuff_store::StuffStore;

use crate::sqlite::ConnectionConfig;
use crate::types::{ChainRecord, Epoch, Item, Transition};

/// Location string that opens a private in-memory store.
pub const IN_MEMORY: &str = ":memory:";

/// Options for [`StuffStore::open`].
#[derive(Clone, Debug)]
pub struct OpenOptions {
    /// Fail on schema drift and verify the newest records on open and close.
    pub strict: bool,
    /// Records checked by the eager verification on open and close.
    pub verify_depth: usize,
    /// Connection pool settings.
    pub connection: ConnectionConfig,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            strict: true,
            verify_depth: 10,
            connection: ConnectionConfig::default(),
        }
    }
}

/// How a caller names an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemRef {
    /// 1-based position among the items of the relevant phase, newest first.
    Position(usize),
    /// Raw item id.
    Id(Epoch),
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(n) => write!(f, "{n}"),
            Self::Id(id) => write!(f, "{}", id.hex()),
        }
    }
}

/// Per-item result of a transition batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The transition was applied and logged.
    Applied {
        /// Item as it is now.
        item: Item,
        /// Record appended for the change.
        record: ChainRecord,
        /// What happened.
        transition: Transition,
    },
    /// The reference did not resolve; nothing was written.
    NotFound(ItemRef),
}

impl Outcome {
    /// Whether the transition was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// Confirmation line for the user.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied {
                item,
                transition: Transition::Add,
                ..
            } => write!(f, "Added {item}"),
            Self::Applied {
                item, transition, ..
            } => write!(f, "{}: {item}", transition.verb()),
            Self::NotFound(reference) => write!(f, "Stuff with ID {reference} not found."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Phase;

    fn applied(transition: Transition) -> Outcome {
        let item = Item {
            id: Epoch(0),
            body: "buy milk".into(),
            phase: transition.after(),
        };
        Outcome::Applied {
            item,
            record: ChainRecord::zero(),
            transition,
        }
    }

    #[test]
    fn confirmation_messages() {
        assert_eq!(applied(Transition::Tick).message(), "Done: 1970-01-01T00:00 -> buy milk");
        assert_eq!(applied(Transition::Forget).message(), "Hidden: 1970-01-01T00:00 -> buy milk");
        assert_eq!(applied(Transition::Untick).message(), "Active: 1970-01-01T00:00 -> buy milk");
        assert_eq!(applied(Transition::Unforget).message(), "Active: 1970-01-01T00:00 -> buy milk");
        assert_eq!(applied(Transition::Add).message(), "Added 1970-01-01T00:00 -> buy milk");
    }

    #[test]
    fn not_found_messages() {
        assert_eq!(
            Outcome::NotFound(ItemRef::Position(7)).message(),
            "Stuff with ID 7 not found."
        );
        assert_eq!(
            Outcome::NotFound(ItemRef::Id(Epoch(255))).message(),
            "Stuff with ID ff not found."
        );
        assert!(!Outcome::NotFound(ItemRef::Position(1)).is_applied());
    }

    #[test]
    fn default_options() {
        let options = OpenOptions::default();
        assert!(options.strict);
        assert_eq!(options.verify_depth, 10);
        assert_eq!(ItemQuery::default().phase, Phase::Active);
    }
}
