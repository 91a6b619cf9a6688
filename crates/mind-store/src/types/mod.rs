//! Value types for items, tags and chain records.
//!
//! Everything here is an immutable value: reads construct fresh copies and
//! nothing is shared across store operations.

mod epoch;
mod item;
mod phase;
mod record;

pub use epoch::Epoch;
pub use item::{Item, PREVIEW_LENGTH, Tag};
pub use phase::{Phase, Transition};
pub use record::ChainRecord;
