//! Tag repository.
//!
//! The table has no uniqueness constraint; labels are deduplicated when an
//! item is added, and reads return whatever rows are present so that a
//! duplicated or removed row shows up as a hash mismatch.

use rusqlite::{Connection, params};

use crate::errors::Result;
use crate::types::{Epoch, Tag};

/// Tag repository: stateless, every method takes `&Connection`.
pub struct TagRepo;

impl TagRepo {
    /// Attach `label` to an item.
    pub fn insert(conn: &Connection, item_id: Epoch, label: &str) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO tags (item_id, label) VALUES (?1, ?2)",
            params![item_id, label],
        )?;
        Ok(())
    }

    /// Labels of one item, sorted.
    pub fn labels_for(conn: &Connection, item_id: Epoch) -> Result<Vec<String>> {
        let mut stmt = conn.prepare("SELECT label FROM tags WHERE item_id = ?1 ORDER BY label")?;
        let labels = stmt
            .query_map(params![item_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(labels)
    }

    /// Tags of one item, sorted by label.
    pub fn for_item(conn: &Connection, item_id: Epoch) -> Result<Vec<Tag>> {
        Ok(Self::labels_for(conn, item_id)?
            .into_iter()
            .map(|label| Tag { item_id, label })
            .collect())
    }

    /// Distinct labels, most recently attached first.
    pub fn latest(conn: &Connection, limit: usize) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT label, MAX(item_id) AS m FROM tags GROUP BY label ORDER BY m DESC, label LIMIT ?1",
        )?;
        let labels = stmt
            .query_map(params![i64::try_from(limit).unwrap_or(i64::MAX)], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(labels)
    }
}
