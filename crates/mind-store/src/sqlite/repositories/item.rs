//! Item repository: the live relational state of every item.
//!
//! Listing and position lookups skip the genesis sentinel (`id = 0`), which
//! exists only to anchor the chain.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::sqlite::row_types::ItemRow;
use crate::types::{Epoch, Item, Phase};

const COLUMNS: &str = "i.id, i.body, i.phase";

/// Listing order by item id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Order {
    /// Newest first.
    #[default]
    Latest,
    /// Oldest first.
    Oldest,
}

impl Order {
    fn sql(self) -> &'static str {
        match self {
            Self::Latest => "DESC",
            Self::Oldest => "ASC",
        }
    }
}

/// Filters for [`ItemRepo::list`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemQuery {
    /// Phase to list.
    pub phase: Phase,
    /// Only items carrying this label.
    pub tag: Option<String>,
    /// Sort order.
    pub order: Order,
    /// Rows to skip.
    pub offset: usize,
    /// Maximum rows to return; `None` for all.
    pub limit: Option<usize>,
}

impl Default for ItemQuery {
    fn default() -> Self {
        Self {
            phase: Phase::Active,
            tag: None,
            order: Order::Latest,
            offset: 0,
            limit: None,
        }
    }
}

impl ItemQuery {
    /// Items in `phase`, newest first.
    pub fn phase(phase: Phase) -> Self {
        Self {
            phase,
            ..Self::default()
        }
    }

    /// Restrict to items tagged `label`.
    #[must_use]
    pub fn tagged(mut self, label: impl Into<String>) -> Self {
        self.tag = Some(label.into());
        self
    }

    /// Set the sort order.
    #[must_use]
    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Set offset and limit.
    #[must_use]
    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }
}

fn to_sql_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Item repository: stateless, every method takes `&Connection`.
pub struct ItemRepo;

impl ItemRepo {
    /// Insert a new item row.
    pub fn insert(conn: &Connection, item: &Item) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO items (id, body, phase) VALUES (?1, ?2, ?3)",
            params![item.id, item.body, item.phase],
        )?;
        Ok(())
    }

    /// Get an item by id, including the genesis sentinel.
    pub fn get(conn: &Connection, id: Epoch) -> Result<Option<Item>> {
        let row = conn
            .query_row(
                "SELECT id, body, phase FROM items WHERE id = ?1",
                params![id],
                ItemRow::from_row,
            )
            .optional()?;
        row.map(Item::try_from).transpose()
    }

    /// Move an item from `from` to `to`.
    ///
    /// Returns the number of rows changed: 0 when the item is not in `from`.
    pub fn set_phase(conn: &Connection, id: Epoch, from: Phase, to: Phase) -> Result<usize> {
        let changed = conn.execute(
            "UPDATE items SET phase = ?1 WHERE id = ?2 AND phase = ?3",
            params![to, id, from],
        )?;
        Ok(changed)
    }

    /// Highest id in the table (0 for a store holding only the sentinel).
    pub fn max_id(conn: &Connection) -> Result<Epoch> {
        let id: i64 = conn.query_row("SELECT COALESCE(MAX(id), 0) FROM items", [], |row| {
            row.get(0)
        })?;
        Ok(Epoch(id))
    }

    /// The `position`-th item (1-based, newest first) in `phase`.
    pub fn nth_in_phase(conn: &Connection, phase: Phase, position: usize) -> Result<Option<Item>> {
        let Some(offset) = position.checked_sub(1) else {
            return Ok(None);
        };
        let row = conn
            .query_row(
                "SELECT id, body, phase FROM items WHERE phase = ?1 AND id > 0
                 ORDER BY id DESC LIMIT 1 OFFSET ?2",
                params![phase, to_sql_int(offset)],
                ItemRow::from_row,
            )
            .optional()?;
        row.map(Item::try_from).transpose()
    }

    /// List items matching `query`.
    pub fn list(conn: &Connection, query: &ItemQuery) -> Result<Vec<Item>> {
        let limit = query.limit.map_or(-1, to_sql_int);
        let offset = to_sql_int(query.offset);
        let order = query.order.sql();

        let rows = if let Some(tag) = &query.tag {
            let sql = format!(
                "SELECT DISTINCT {COLUMNS} FROM items i JOIN tags t ON t.item_id = i.id
                 WHERE i.phase = ?1 AND i.id > 0 AND t.label = ?2
                 ORDER BY i.id {order} LIMIT ?3 OFFSET ?4"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![query.phase, tag, limit, offset], ItemRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        } else {
            let sql = format!(
                "SELECT {COLUMNS} FROM items i WHERE i.phase = ?1 AND i.id > 0
                 ORDER BY i.id {order} LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![query.phase, limit, offset], ItemRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        };
        rows.into_iter().map(Item::try_from).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
