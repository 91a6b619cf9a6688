//! Log repository: the append-only chain of [`ChainRecord`]s.
//!
//! Records are inserted with an explicit `sn`; the primary key rejects a
//! second record claiming the same position.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::sqlite::row_types::LogRow;
use crate::types::ChainRecord;

const SELECT: &str = "SELECT sn, hash, item_id, stamp, phase_before, phase_after FROM log";

/// Log repository: stateless, every method takes `&Connection`.
pub struct LogRepo;

impl LogRepo {
    /// Append a record.
    pub fn append(conn: &Connection, record: &ChainRecord) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO log (sn, hash, item_id, stamp, phase_before, phase_after)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.sn,
                record.hash,
                record.item_id,
                record.stamp,
                record.phase_before(),
                record.phase_after(),
            ],
        )?;
        Ok(())
    }

    /// Record at `sn`, if present.
    pub fn get(conn: &Connection, sn: i64) -> Result<Option<ChainRecord>> {
        let row = conn
            .query_row(&format!("{SELECT} WHERE sn = ?1"), params![sn], LogRow::from_row)
            .optional()?;
        row.map(ChainRecord::try_from).transpose()
    }

    /// Record with the highest `sn`, if any.
    pub fn head(conn: &Connection) -> Result<Option<ChainRecord>> {
        let row = conn
            .query_row(&format!("{SELECT} ORDER BY sn DESC LIMIT 1"), [], LogRow::from_row)
            .optional()?;
        row.map(ChainRecord::try_from).transpose()
    }

    /// Records newest first.
    pub fn history(conn: &Connection, offset: usize, limit: usize) -> Result<Vec<ChainRecord>> {
        let mut stmt = conn.prepare(&format!("{SELECT} ORDER BY sn DESC LIMIT ?1 OFFSET ?2"))?;
        let rows = stmt
            .query_map(
                params![
                    i64::try_from(limit).unwrap_or(i64::MAX),
                    i64::try_from(offset).unwrap_or(i64::MAX)
                ],
                LogRow::from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(ChainRecord::try_from).collect()
    }

    /// Number of records.
    pub fn count(conn: &Connection) -> Result<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM log", [], |row| row.get(0))?;
        Ok(count)
    }
}
