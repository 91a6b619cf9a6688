//! The `StuffStore`: open/close lifecycle, mutation protocol and queries.

use std::collections::HashSet;

use rusqlite::Connection;
use rusqlite::types::Value;
use tracing::{debug, info, instrument, warn};

use super::{IN_MEMORY, ItemQuery, ItemRef, OpenOptions, Outcome};
use crate::canonical::Change;
use crate::content::parse_content;
use crate::errors::{Result, StoreError};
use crate::sqlite::adapter::{self, Statement};
use crate::sqlite::connection::{self, ConnectionPool, PooledConnection};
use crate::sqlite::repositories::{ItemRepo, LogRepo, TagRepo};
use crate::sqlite::schema::{LOG, SchemaState, check_schema, create_tables, has_table};
use crate::types::{ChainRecord, Epoch, Item, Phase, Tag, Transition};
use crate::verify::{self, VerifyReport};

/// Tamper-evident item store over a `SQLite` connection pool.
///
/// Writes are single-writer: callers serialize access to one store file.
pub struct StuffStore {
    pool: ConnectionPool,
    options: OpenOptions,
}

impl StuffStore {
    /// Open (or create) the store at `location`; [`IN_MEMORY`] opens a
    /// private in-memory store.
    ///
    /// A fresh database gets its tables and the genesis record in one
    /// transaction; existing tables with an empty log get the genesis
    /// record alone. In strict mode a schema mismatch is an error and the
    /// newest `verify_depth` records are verified before returning.
    #[instrument(skip(options), fields(strict = options.strict))]
    pub fn open(location: &str, options: &OpenOptions) -> Result<Self> {
        let pool = if location == IN_MEMORY {
            connection::new_in_memory(&options.connection)?
        } else {
            connection::new_file(location, &options.connection)?
        };

        {
            let conn = pool.get()?;
            match check_schema(&conn, options.strict)? {
                SchemaState::Fresh => bootstrap(&conn)?,
                SchemaState::Existing if needs_genesis(&conn)? => {
                    warn!("existing store has an empty log, writing genesis");
                    seed_genesis(&conn)?;
                }
                SchemaState::Existing => debug!("existing store"),
            }
            let pragmas = connection::verify_pragmas(&conn)?;
            debug!(
                journal_mode = %pragmas.journal_mode,
                busy_timeout_ms = pragmas.busy_timeout_ms,
                "connection ready"
            );
        }

        let store = Self {
            pool,
            options: options.clone(),
        };
        if options.strict {
            let report = store.verify(Some(options.verify_depth))?;
            debug!(checked = report.checked, head = report.head, "eager verification passed");
        }
        info!(location, "store opened");
        Ok(store)
    }

    /// Open a private in-memory store.
    pub fn open_in_memory(options: &OpenOptions) -> Result<Self> {
        Self::open(IN_MEMORY, options)
    }

    /// Close the store. In strict mode the newest records are verified first.
    pub fn close(self) -> Result<()> {
        if self.options.strict {
            let _ = self.verify(Some(self.options.verify_depth))?;
        }
        info!("store closed");
        Ok(())
    }

    /// Options the store was opened with.
    pub fn options(&self) -> &OpenOptions {
        &self.options
    }

    /// Underlying connection pool.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────

    /// Create an item from free text.
    ///
    /// Tag words are split off into tags; the item row, its tag rows and
    /// one `ADD` record are written in a single transaction. The id is the
    /// current time, bumped past the largest existing id if the clock has
    /// not moved on.
    pub fn add(&self, content: &str) -> Result<(Item, Vec<Tag>)> {
        let parsed = parse_content(content);
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        let stamp = Epoch::now();
        let next = ItemRepo::max_id(&tx)?
            .successor()
            .ok_or_else(|| StoreError::Internal("item id space exhausted".into()))?;
        let item = Item {
            id: stamp.max(next),
            body: parsed.body,
            phase: Phase::Active,
        };

        ItemRepo::insert(&tx, &item)?;
        for label in &parsed.tags {
            TagRepo::insert(&tx, item.id, label)?;
        }
        let record = append_change(&tx, &item, Transition::Add, stamp, parsed.tags.clone())?;
        tx.commit()?;

        info!(id = %item.id.hex(), sn = record.sn, tags = parsed.tags.len(), "item added");
        let tags = parsed
            .tags
            .into_iter()
            .map(|label| Tag {
                item_id: item.id,
                label,
            })
            .collect();
        Ok((item, tags))
    }

    /// Apply `transition` to every item `refs` names.
    ///
    /// All references are resolved first against one snapshot: positions
    /// count among items in the transition's source phase. References that
    /// do not resolve become [`Outcome::NotFound`]; references naming an
    /// item already named collapse into one. Each resolved item is then
    /// moved in its own transaction together with one chain record.
    ///
    /// `INIT` and `ADD` are not transitions of existing items and yield
    /// [`StoreError::IllegalTransition`].
    pub fn transition(&self, refs: &[ItemRef], transition: Transition) -> Result<Vec<Outcome>> {
        if transition.is_creation() {
            return Err(StoreError::IllegalTransition {
                before: transition.before(),
                after: transition.after(),
            });
        }
        let conn = self.conn()?;

        let mut seen_refs = HashSet::new();
        let mut seen_items = HashSet::new();
        let mut resolved = Vec::new();
        for &reference in refs {
            if !seen_refs.insert(reference) {
                continue;
            }
            match resolve(&conn, reference, transition.before())? {
                Some(item) => {
                    if seen_items.insert(item.id) {
                        resolved.push(Ok((reference, item)));
                    }
                }
                None => resolved.push(Err(reference)),
            }
        }

        let mut outcomes = Vec::with_capacity(resolved.len());
        for entry in resolved {
            let outcome = match entry {
                Ok((reference, item)) => apply(&conn, reference, &item, transition)?,
                Err(reference) => {
                    debug!(%reference, %transition, "reference did not resolve");
                    Outcome::NotFound(reference)
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Move one item, identified by id, to `phase`.
    ///
    /// The transition is derived from the item's current phase; a pair
    /// outside the legal six is [`StoreError::IllegalTransition`].
    pub fn transition_to(&self, id: Epoch, phase: Phase) -> Result<Outcome> {
        let reference = ItemRef::Id(id);
        let current = {
            let conn = self.conn()?;
            resolve_any(&conn, reference)?
        };
        let Some(item) = current else {
            return Ok(Outcome::NotFound(reference));
        };
        let transition = Transition::between(item.phase, phase)?;
        let mut outcomes = self.transition(&[reference], transition)?;
        Ok(outcomes.pop().unwrap_or(Outcome::NotFound(reference)))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    /// Items matching `query`; the genesis sentinel is never listed.
    pub fn query_items(&self, query: &ItemQuery) -> Result<Vec<Item>> {
        let conn = self.conn()?;
        ItemRepo::list(&conn, query)
    }

    /// Labels of one item, or the most recently used labels overall.
    pub fn query_tags(&self, item_id: Option<Epoch>, limit: usize) -> Result<Vec<String>> {
        let conn = self.conn()?;
        match item_id {
            Some(id) => {
                let mut labels = TagRepo::labels_for(&conn, id)?;
                labels.truncate(limit);
                Ok(labels)
            }
            None => TagRepo::latest(&conn, limit),
        }
    }

    /// One item with its tags. Positions count among ACTIVE items.
    pub fn show(&self, reference: ItemRef) -> Result<Option<(Item, Vec<Tag>)>> {
        let conn = self.conn()?;
        let item = match reference {
            ItemRef::Position(_) => resolve(&conn, reference, Phase::Active)?,
            ItemRef::Id(_) => resolve_any(&conn, reference)?,
        };
        let Some(item) = item else {
            return Ok(None);
        };
        let tags = TagRepo::for_item(&conn, item.id)?;
        Ok(Some((item, tags)))
    }

    /// Chain records, newest first.
    pub fn history(&self, offset: usize, limit: usize) -> Result<Vec<ChainRecord>> {
        let conn = self.conn()?;
        LogRepo::history(&conn, offset, limit)
    }

    /// The newest record, or the zero record for an empty log.
    pub fn head(&self) -> Result<ChainRecord> {
        let conn = self.conn()?;
        Ok(LogRepo::head(&conn)?.unwrap_or_default())
    }

    /// Record at `sn`, or the zero record when there is none.
    pub fn record_at(&self, sn: i64) -> Result<ChainRecord> {
        if sn < 1 {
            return Ok(ChainRecord::zero());
        }
        let conn = self.conn()?;
        Ok(LogRepo::get(&conn, sn)?.unwrap_or_default())
    }

    /// Verify `depth` records from the head, or the whole chain.
    pub fn verify(&self, depth: Option<usize>) -> Result<VerifyReport> {
        let conn = self.conn()?;
        verify::verify(&conn, depth)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Raw access
    // ─────────────────────────────────────────────────────────────────────

    /// Run one raw statement. Writes bypass the chain.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>> {
        let conn = self.conn()?;
        adapter::execute(&conn, sql, params)
    }

    /// Run raw statements all-or-nothing. Writes bypass the chain.
    pub fn transaction(&self, batch: &[Statement]) -> Result<()> {
        let conn = self.conn()?;
        adapter::run_batch(&conn, batch)
    }
}

/// Create the tables, the genesis item and the genesis record.
fn bootstrap(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    create_tables(&tx)?;
    let record = write_genesis(&tx)?;
    tx.commit()?;
    info!(sn = record.sn, hash = %record.hash, "store initialised");
    Ok(())
}

/// An existing store whose log table is present but holds no records.
fn needs_genesis(conn: &Connection) -> Result<bool> {
    Ok(has_table(conn, LOG.name)? && LogRepo::head(conn)?.is_none())
}

/// Write the genesis record into tables that already exist.
fn seed_genesis(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    let record = write_genesis(&tx)?;
    tx.commit()?;
    info!(sn = record.sn, hash = %record.hash, "genesis written");
    Ok(())
}

/// Genesis item (unless a row with id 0 is already there) plus the `INIT` record.
fn write_genesis(conn: &Connection) -> Result<ChainRecord> {
    let genesis = Item {
        id: Epoch::ZERO,
        body: String::new(),
        phase: Phase::Hidden,
    };
    if ItemRepo::get(conn, genesis.id)?.is_none() {
        ItemRepo::insert(conn, &genesis)?;
    }
    append_change(conn, &genesis, Transition::Init, Epoch::now(), Vec::new())
}

/// Build the record for `item` (already in its new phase) and append it.
fn append_change(
    conn: &Connection,
    item: &Item,
    transition: Transition,
    stamp: Epoch,
    tags: Vec<String>,
) -> Result<ChainRecord> {
    let parent = LogRepo::head(conn)?.unwrap_or_default();
    let change = Change {
        parent,
        item: item.clone(),
        transition,
        stamp,
        tags,
    };
    let record = change.record();
    LogRepo::append(conn, &record)?;
    Ok(record)
}

/// Resolve `reference` to an item currently in `phase`.
fn resolve(conn: &Connection, reference: ItemRef, phase: Phase) -> Result<Option<Item>> {
    match reference {
        ItemRef::Position(n) => ItemRepo::nth_in_phase(conn, phase, n),
        ItemRef::Id(_) => Ok(resolve_any(conn, reference)?.filter(|item| item.phase == phase)),
    }
}

/// Resolve an id reference in any phase. The genesis sentinel never resolves.
fn resolve_any(conn: &Connection, reference: ItemRef) -> Result<Option<Item>> {
    match reference {
        ItemRef::Id(id) if id > Epoch::ZERO => ItemRepo::get(conn, id),
        ItemRef::Id(_) => Ok(None),
        ItemRef::Position(n) => ItemRepo::nth_in_phase(conn, Phase::Active, n),
    }
}

/// Move one resolved item in its own transaction.
fn apply(
    conn: &Connection,
    reference: ItemRef,
    item: &Item,
    transition: Transition,
) -> Result<Outcome> {
    let tx = conn.unchecked_transaction()?;
    let changed = ItemRepo::set_phase(&tx, item.id, transition.before(), transition.after())?;
    if changed == 0 {
        return Ok(Outcome::NotFound(reference));
    }
    let tags = if transition.reveals_content() {
        TagRepo::labels_for(&tx, item.id)?
    } else {
        Vec::new()
    };
    let updated = item.with_phase(transition.after());
    let record = append_change(&tx, &updated, transition, Epoch::now(), tags)?;
    tx.commit()?;

    info!(id = %updated.id.hex(), sn = record.sn, %transition, "item moved");
    Ok(Outcome::Applied {
        item: updated,
        record,
        transition,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
