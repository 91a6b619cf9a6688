//! Canonical encoding of a pending change, and its digest.
//!
//! The rendering is part of the integrity contract: any change to the
//! format, the delimiters or the digest invalidates every existing chain.
//!
//! ```text
//! Change [Record [{sn},{hash}],Stuff [{id_hex},{body}],Phases [{BEFORE}->{AFTER}],Tags [{t1}, {t2}]]
//! ```
//!
//! When the resulting phase is not ACTIVE the body and the tag list are
//! rendered empty. Tag labels and hex ids are alphanumeric by construction,
//! so they can never contain a delimiter; bodies are not escaped.

use sha2::{Digest, Sha256};

use crate::types::{ChainRecord, Epoch, Item, Transition};

/// A state transition waiting to be appended to the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    /// Current chain head; the new record becomes its child.
    pub parent: ChainRecord,
    /// Item as it is after the change.
    pub item: Item,
    /// Declared phase change.
    pub transition: Transition,
    /// When the change is made.
    pub stamp: Epoch,
    /// Labels attached to the item.
    pub tags: Vec<String>,
}

impl Change {
    /// Canonical string the record hash is taken over.
    pub fn canonical(&self) -> String {
        canonicalize(&self.parent, &self.item, self.transition, &self.tags)
    }

    /// Build the chain record for this change.
    pub fn record(&self) -> ChainRecord {
        ChainRecord {
            sn: self.parent.next(),
            hash: digest(&self.canonical()),
            item_id: self.item.id,
            stamp: self.stamp,
            transition: self.transition,
        }
    }
}

/// Render `parent`, `item`, `transition` and `tags` as one canonical string.
pub fn canonicalize(
    parent: &ChainRecord,
    item: &Item,
    transition: Transition,
    tags: &[String],
) -> String {
    let reveal = transition.reveals_content();
    let body = if reveal { item.body.as_str() } else { "" };
    let mut labels: Vec<&str> = if reveal {
        tags.iter().map(String::as_str).collect()
    } else {
        Vec::new()
    };
    labels.sort_unstable();

    format!(
        "Change [{},Stuff [{},{}],Phases [{}],Tags [{}]]",
        parent.canonical(),
        item.id.hex(),
        body,
        transition,
        labels.join(", ")
    )
}

/// SHA-256 of `canonical`, as 64 lowercase hex characters.
pub fn digest(canonical: &str) -> String {
    format!("{:x}", Sha256::digest(canonical.as_bytes()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
