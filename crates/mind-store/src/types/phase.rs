//! Item lifecycle phases and the six legal transitions between them.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, StoreError};

/// Lifecycle phase of an item.
///
/// Stored as an integer in `1..=4`; the names are part of the canonical
/// encoding and must never change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Pseudo-phase before an item exists.
    Absent = 1,
    /// Visible in default listings.
    Active = 2,
    /// Ticked off.
    Done = 3,
    /// Forgotten.
    Hidden = 4,
}

impl Phase {
    /// All phases in storage order.
    pub const ALL: [Self; 4] = [Self::Absent, Self::Active, Self::Done, Self::Hidden];

    /// Canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "ABSENT",
            Self::Active => "ACTIVE",
            Self::Done => "DONE",
            Self::Hidden => "HIDDEN",
        }
    }

    /// Storage value.
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    /// Decode a storage value.
    pub fn from_i64(value: i64) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_i64() == value)
            .ok_or(StoreError::InvalidPhase(value))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown phase: {s}"))
    }
}

impl ToSql for Phase {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_i64()))
    }
}

impl FromSql for Phase {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = i64::column_result(value)?;
        Self::from_i64(raw).map_err(|_| FromSqlError::OutOfRange(raw))
    }
}

/// A declared phase change. Exactly six exist.
///
/// Every `match` on this enum is exhaustive, so adding a variant forces
/// the encoder, verifier and mutation protocol to be revisited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Transition {
    /// Genesis bootstrap: ABSENT → HIDDEN.
    Init,
    /// Item creation: ABSENT → ACTIVE.
    Add,
    /// Completion: ACTIVE → DONE.
    Tick,
    /// Hiding: ACTIVE → HIDDEN.
    Forget,
    /// Reopen a completed item: DONE → ACTIVE.
    Untick,
    /// Restore a hidden item: HIDDEN → ACTIVE.
    Unforget,
}

impl Transition {
    /// All legal transitions.
    pub const ALL: [Self; 6] = [
        Self::Init,
        Self::Add,
        Self::Tick,
        Self::Forget,
        Self::Untick,
        Self::Unforget,
    ];

    /// Phase the item must be in before the transition.
    pub fn before(self) -> Phase {
        match self {
            Self::Init | Self::Add => Phase::Absent,
            Self::Tick | Self::Forget => Phase::Active,
            Self::Untick => Phase::Done,
            Self::Unforget => Phase::Hidden,
        }
    }

    /// Phase the item is in afterwards.
    pub fn after(self) -> Phase {
        match self {
            Self::Init | Self::Forget => Phase::Hidden,
            Self::Add | Self::Untick | Self::Unforget => Phase::Active,
            Self::Tick => Phase::Done,
        }
    }

    /// Look up the transition for a phase pair.
    ///
    /// Any pair outside the six legal ones is a contract violation and
    /// yields [`StoreError::IllegalTransition`].
    pub fn between(before: Phase, after: Phase) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.before() == before && t.after() == after)
            .ok_or(StoreError::IllegalTransition { before, after })
    }

    /// Whether the transition creates an item (source phase ABSENT).
    pub fn is_creation(self) -> bool {
        self.before() == Phase::Absent
    }

    /// Whether the resulting phase exposes body and tags to the hash.
    pub fn reveals_content(self) -> bool {
        self.after() == Phase::Active
    }

    /// Word used in confirmation messages.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Init => "Initialised",
            Self::Add => "Added",
            Self::Tick => "Done",
            Self::Forget => "Hidden",
            Self::Untick | Self::Unforget => "Active",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.before(), self.after())
    }
}
