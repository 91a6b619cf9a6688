//! Table definitions and the schema compatibility check.
//!
//! The three tables are described by a static column-type table rather
//! than hand-written DDL. [`TableSpec::create_statement`] renders the exact
//! text `SQLite` records in `sqlite_master`, which is what an existing store
//! is compared against on open.

use std::collections::HashMap;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::errors::{Result, StoreError};

/// Logical column type and its `SQLite` declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    /// Microsecond timestamp ([`Epoch`](crate::types::Epoch)).
    Epoch,
    /// Lifecycle phase ([`Phase`](crate::types::Phase)), range-checked.
    Phase,
    /// Free text.
    Text,
    /// Auto-incrementing sequence number.
    Serial,
}

impl ColumnType {
    /// Declared SQL type.
    pub fn declared(self) -> &'static str {
        match self {
            Self::Epoch | Self::Phase => "INTEGER",
            Self::Text => "TEXT",
            Self::Serial => "INTEGER PRIMARY KEY AUTOINCREMENT",
        }
    }

    /// Column constraint appended after `NOT NULL`, if any.
    pub fn check(self, column: &str) -> Option<String> {
        match self {
            Self::Phase => Some(format!("CHECK ({column} BETWEEN 1 AND 4)")),
            Self::Epoch | Self::Text | Self::Serial => None,
        }
    }
}

/// A single column of a table.
#[derive(Clone, Copy, Debug)]
pub struct Column {
    /// Column name.
    pub name: &'static str,
    /// Logical type.
    pub ty: ColumnType,
}

/// Static description of one table.
#[derive(Clone, Copy, Debug)]
pub struct TableSpec {
    /// Table name.
    pub name: &'static str,
    /// Columns in declaration order.
    pub columns: &'static [Column],
    /// Table-level primary key, if not declared on a column.
    pub primary_key: Option<&'static str>,
}

impl TableSpec {
    /// The `CREATE TABLE` statement for this table.
    pub fn create_statement(&self) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut col = format!("{} {} NOT NULL", c.name, c.ty.declared());
                if let Some(check) = c.ty.check(c.name) {
                    col.push(' ');
                    col.push_str(&check);
                }
                col
            })
            .collect();
        if let Some(pk) = self.primary_key {
            parts.push(format!("PRIMARY KEY ({pk})"));
        }
        format!("CREATE TABLE {}({})", self.name, parts.join(", "))
    }
}

/// `items(id, body, phase)`.
pub const ITEMS: TableSpec = TableSpec {
    name: "items",
    columns: &[
        Column { name: "id", ty: ColumnType::Epoch },
        Column { name: "body", ty: ColumnType::Text },
        Column { name: "phase", ty: ColumnType::Phase },
    ],
    primary_key: Some("id"),
};

/// `tags(item_id, label)`; no uniqueness constraint.
pub const TAGS: TableSpec = TableSpec {
    name: "tags",
    columns: &[
        Column { name: "item_id", ty: ColumnType::Epoch },
        Column { name: "label", ty: ColumnType::Text },
    ],
    primary_key: None,
};

/// `log(sn, hash, item_id, stamp, phase_before, phase_after)`.
pub const LOG: TableSpec = TableSpec {
    name: "log",
    columns: &[
        Column { name: "sn", ty: ColumnType::Serial },
        Column { name: "hash", ty: ColumnType::Text },
        Column { name: "item_id", ty: ColumnType::Epoch },
        Column { name: "stamp", ty: ColumnType::Epoch },
        Column { name: "phase_before", ty: ColumnType::Phase },
        Column { name: "phase_after", ty: ColumnType::Phase },
    ],
    primary_key: None,
};

/// Every table the store owns, in creation order.
pub const TABLES: [&TableSpec; 3] = [&ITEMS, &TAGS, &LOG];

/// What [`check_schema`] found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaState {
    /// None of the store's tables exist yet.
    Fresh,
    /// At least one table exists and has been checked.
    Existing,
}

/// Compare recorded `CREATE` statements with the expected ones.
///
/// A missing table in an otherwise existing store counts as a mismatch. In
/// strict mode the first mismatch is returned as
/// [`StoreError::SchemaMismatch`]; otherwise each one is logged and the
/// store carries on.
pub fn check_schema(conn: &Connection, strict: bool) -> Result<SchemaState> {
    let mut stmt = conn.prepare(
        "SELECT name, sql FROM sqlite_master WHERE type = 'table' AND name IN ('items', 'tags', 'log')",
    )?;
    let recorded: HashMap<String, String> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get::<_, Option<String>>(1)?.unwrap_or_default())))?
        .collect::<std::result::Result<_, _>>()?;

    if recorded.is_empty() {
        debug!("no tables found, store is fresh");
        return Ok(SchemaState::Fresh);
    }

    for table in TABLES {
        let expected = table.create_statement();
        let found = recorded.get(table.name).map_or("", |s| s.trim());
        if found == expected {
            continue;
        }
        if strict {
            return Err(StoreError::SchemaMismatch {
                table: table.name,
                expected,
                found: found.to_string(),
            });
        }
        warn!(table = table.name, %expected, %found, "schema mismatch, continuing best-effort");
    }
    Ok(SchemaState::Existing)
}

/// Whether a table called `name` exists.
pub fn has_table(conn: &Connection, name: &str) -> Result<bool> {
    let found = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(found > 0)
}

/// Create all tables. Callers run this inside the bootstrap transaction.
pub fn create_tables(conn: &Connection) -> Result<()> {
    for table in TABLES {
        conn.execute_batch(&table.create_statement())?;
    }
    info!(tables = TABLES.len(), "created store tables");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
