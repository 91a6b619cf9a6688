//! # mind-store
//!
//! Tamper-evident item store with a `SQLite` backend.
//!
//! Every mutation of an item passes through a hash-chained, append-only log:
//!
//! - **Canonical encoder**: renders a pending change as a byte-exact string
//! - **Chain records**: `sn`-ordered log entries, each the child of `sn - 1`
//! - **`SQLite` backend**: pooled connections, schema checking, stateless repositories
//! - **Mutation protocol**: item, tag and log rows written in one transaction
//! - **Verifier**: backward replay of the chain against live relational state

#![deny(unsafe_code)]

pub mod canonical;
pub mod content;
pub mod errors;
pub mod sqlite;
pub mod store;
pub mod types;
pub mod verify;

pub use canonical::{Change, digest};
pub use errors::{FailureKind, IntegrityFailure, Result, StoreError};
pub use sqlite::{ConnectionConfig, Statement};
pub use store::{ItemQuery, ItemRef, OpenOptions, Order, Outcome, StuffStore};
pub use types::{ChainRecord, Epoch, Item, Phase, Tag, Transition};
pub use verify::VerifyReport;
