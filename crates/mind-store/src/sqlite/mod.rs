//! `SQLite` backend for the item store.
//!
//! # Architecture
//!
//! - **[`connection`]**: `r2d2` connection pool with WAL mode and performance
//!   pragmas applied to every connection.
//! - **[`schema`]**: static column-type table that builds the three `CREATE
//!   TABLE` statements, plus the compatibility check run on open.
//! - **[`adapter`]**: generic `execute` / all-or-nothing batch for callers
//!   that need raw statements.
//! - **[`row_types`]**: raw row structs and their conversion to value types.
//! - **[`repositories`]**: stateless repository structs, each method takes
//!   `&Connection` and executes SQL.

pub mod adapter;
pub mod connection;
pub mod repositories;
pub mod row_types;
pub mod schema;

pub use adapter::Statement;
pub use connection::{
    ConnectionConfig, ConnectionPool, PooledConnection, PragmaState, new_file, new_in_memory,
    verify_pragmas,
};
pub use schema::{ColumnType, SchemaState, TableSpec, check_schema, create_tables};
