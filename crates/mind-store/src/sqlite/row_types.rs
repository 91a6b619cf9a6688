//! Database row types for mapping between `SQLite` rows and value types.
//!
//! These hold the raw column values. Conversion to [`Item`] and
//! [`ChainRecord`] validates phases and phase pairs, so a tampered or
//! corrupt row surfaces as a typed error instead of a silent coercion.

use rusqlite::Row;

use crate::errors::{Result, StoreError};
use crate::types::{ChainRecord, Epoch, Item, Phase, Transition};

/// Raw row from the `items` table.
#[derive(Clone, Debug)]
pub struct ItemRow {
    /// Item id (microseconds).
    pub id: i64,
    /// Body text.
    pub body: String,
    /// Phase storage value.
    pub phase: i64,
}

impl ItemRow {
    /// Map `id, body, phase` columns.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            body: row.get(1)?,
            phase: row.get(2)?,
        })
    }
}

impl TryFrom<ItemRow> for Item {
    type Error = StoreError;

    fn try_from(row: ItemRow) -> Result<Self> {
        Ok(Self {
            id: Epoch(row.id),
            body: row.body,
            phase: Phase::from_i64(row.phase)?,
        })
    }
}

/// Raw row from the `log` table.
#[derive(Clone, Debug)]
pub struct LogRow {
    /// Sequence number.
    pub sn: i64,
    /// Stored hash.
    pub hash: String,
    /// Referenced item id.
    pub item_id: i64,
    /// Mutation timestamp.
    pub stamp: i64,
    /// Phase before, storage value.
    pub phase_before: i64,
    /// Phase after, storage value.
    pub phase_after: i64,
}

impl LogRow {
    /// Map `sn, hash, item_id, stamp, phase_before, phase_after` columns.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            sn: row.get(0)?,
            hash: row.get(1)?,
            item_id: row.get(2)?,
            stamp: row.get(3)?,
            phase_before: row.get(4)?,
            phase_after: row.get(5)?,
        })
    }
}

impl TryFrom<LogRow> for ChainRecord {
    type Error = StoreError;

    fn try_from(row: LogRow) -> Result<Self> {
        let before = Phase::from_i64(row.phase_before)?;
        let after = Phase::from_i64(row.phase_after)?;
        Ok(Self {
            sn: row.sn,
            hash: row.hash,
            item_id: Epoch(row.item_id),
            stamp: Epoch(row.stamp),
            transition: Transition::between(before, after)?,
        })
    }
}
