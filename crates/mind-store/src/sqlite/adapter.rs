//! Raw statement execution for callers outside the mutation protocol.
//!
//! [`execute`] runs one parameterised statement and returns its rows as
//! dynamic values; [`run_batch`] applies a list of statements atomically.
//! Writes made this way bypass the hash chain and will be reported by the
//! next verification that reaches the affected records.

use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};
use tracing::debug;

use crate::errors::Result;

/// A statement with its positional parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    /// SQL text with `?` / `?N` placeholders.
    pub sql: String,
    /// Parameter values in placeholder order.
    pub params: Vec<Value>,
}

impl Statement {
    /// Build a statement from SQL and parameters.
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Run one statement and collect every returned row.
///
/// Statements that return no columns (`INSERT`, `UPDATE`, ...) yield an
/// empty vector.
pub fn execute(conn: &Connection, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>> {
    let mut stmt = conn.prepare(sql)?;
    let columns = stmt.column_count();
    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let values = (0..columns)
            .map(|i| row.get::<_, Value>(i))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        out.push(values);
    }
    debug!(rows = out.len(), "executed raw statement");
    Ok(out)
}

/// Apply `batch` as one transaction: either every statement lands or none.
pub fn run_batch(conn: &Connection, batch: &[Statement]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for statement in batch {
        let _ = tx.execute(&statement.sql, params_from_iter(statement.params.iter()))?;
    }
    tx.commit()?;
    debug!(statements = batch.len(), "committed raw batch");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
