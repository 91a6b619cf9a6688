//! Microsecond timestamps used as item ids and record stamps.

use std::fmt;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Microseconds since the Unix epoch.
///
/// Item ids are epochs: one value is both the primary key and the creation
/// time. The hex form feeds the canonical encoder; the human form is what
/// listings show.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Epoch(pub i64);

impl Epoch {
    /// The zero epoch (1970-01-01T00:00).
    pub const ZERO: Self = Self(0);

    /// Current wall-clock time.
    pub fn now() -> Self {
        Self(Utc::now().timestamp_micros())
    }

    /// Raw microsecond value.
    pub fn as_micros(self) -> i64 {
        self.0
    }

    /// Lowercase hex without prefix, e.g. `Epoch(15)` → `"f"`.
    pub fn hex(self) -> String {
        format!("{:x}", self.0)
    }

    /// Minute-precision UTC timestamp, e.g. `"1970-01-01T00:00"`.
    pub fn human(self) -> String {
        DateTime::<Utc>::from_timestamp_micros(self.0).map_or_else(
            || format!("#{}", self.hex()),
            |dt| dt.format("%Y-%m-%dT%H:%M").to_string(),
        )
    }

    /// The next representable epoch, if any.
    pub fn successor(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.human())
    }
}

impl From<i64> for Epoch {
    fn from(micros: i64) -> Self {
        Self(micros)
    }
}

impl ToSql for Epoch {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Epoch {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_unix_epoch() {
        assert_eq!(Epoch::ZERO.as_micros(), 0);
        assert_eq!(Epoch::ZERO.to_string(), "1970-01-01T00:00");
    }

    #[test]
    fn human_form_is_sixteen_chars() {
        assert_eq!(Epoch::now().human().len(), 16);
    }

    #[test]
    fn hex_form() {
        assert_eq!(Epoch(15).hex(), "f");
        assert_eq!(Epoch(100_000_000).hex(), "5f5e100");
        assert_eq!(Epoch(946_684_800).hex(), "386d4380");
    }

    #[test]
    fn now_is_close_to_system_time() {
        let before = Utc::now().timestamp_micros();
        let now = Epoch::now();
        let after = Utc::now().timestamp_micros();
        assert!(now.as_micros() >= before);
        assert!(now.as_micros() <= after);
    }

    #[test]
    fn successor_saturates_at_max() {
        assert_eq!(Epoch(1).successor(), Some(Epoch(2)));
        assert_eq!(Epoch(i64::MAX).successor(), None);
    }

    #[test]
    fn sql_round_trip() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let back: Epoch = conn
            .query_row("SELECT ?1", [Epoch(1_700_000_000_000_000)], |row| row.get(0))
            .unwrap();
        assert_eq!(back, Epoch(1_700_000_000_000_000));
    }
}
