//! Repository implementations for `SQLite` database operations.
//!
//! Each repository is a stateless struct whose methods take a `&Connection`
//! parameter, so the same calls work on a pooled connection or inside an
//! open transaction.

pub mod item;
pub mod log;
pub mod tag;

pub use item::{ItemQuery, ItemRepo, Order};
pub use log::LogRepo;
pub use tag::TagRepo;
