//! Settings type definitions.
//!
//! Field names are camelCase in JSON. Every struct is `#[serde(default)]`,
//! so a settings file only needs the keys it changes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root settings for the `mind` tool.
///
/// ```json
/// { "dbPath": "~/notes/mind.db", "pageSize": 20, "connection": { "poolSize": 2 } }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MindSettings {
    /// Store file; a leading `~/` is expanded against `$HOME`.
    pub db_path: String,
    /// Fail on schema drift and verify recent records on open and close.
    pub strict: bool,
    /// Items per listing page.
    pub page_size: usize,
    /// Records checked by eager verification.
    pub verify_depth: usize,
    /// Labels shown by the `tags` command.
    pub tag_limit: usize,
    /// Connection pool settings.
    pub connection: ConnectionSettings,
}

impl Default for MindSettings {
    fn default() -> Self {
        Self {
            db_path: "~/.mind.db".to_string(),
            strict: true,
            page_size: 9,
            verify_depth: 10,
            tag_limit: 15,
            connection: ConnectionSettings::default(),
        }
    }
}

impl MindSettings {
    /// `db_path` with `~` expanded. `:memory:` is returned unchanged.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_home(&self.db_path)
    }
}

/// `SQLite` connection pool settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionSettings {
    /// Maximum pooled connections for file stores.
    pub pool_size: u32,
    /// `PRAGMA busy_timeout` in milliseconds.
    pub busy_timeout_ms: u32,
    /// Page cache size in KiB.
    pub cache_size_kib: i64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            pool_size: 4,
            busy_timeout_ms: 30_000,
            cache_size_kib: 8192,
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    let home = || std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    if path == "~" {
        PathBuf::from(home())
    } else if let Some(rest) = path.strip_prefix("~/") {
        PathBuf::from(home()).join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = MindSettings::default();
        assert_eq!(settings.db_path, "~/.mind.db");
        assert!(settings.strict);
        assert_eq!(settings.page_size, 9);
        assert_eq!(settings.verify_depth, 10);
        assert_eq!(settings.tag_limit, 15);
        assert_eq!(settings.connection.pool_size, 4);
        assert_eq!(settings.connection.busy_timeout_ms, 30_000);
        assert_eq!(settings.connection.cache_size_kib, 8192);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(MindSettings::default()).unwrap();
        assert_eq!(json["dbPath"], "~/.mind.db");
        assert_eq!(json["verifyDepth"], 10);
        assert_eq!(json["connection"]["busyTimeoutMs"], 30_000);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: MindSettings =
            serde_json::from_str(r#"{"pageSize": 20, "connection": {"poolSize": 2}}"#).unwrap();
        assert_eq!(settings.page_size, 20);
        assert_eq!(settings.connection.pool_size, 2);
        assert_eq!(settings.connection.cache_size_kib, 8192);
        assert!(settings.strict);
    }

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(expand_home("/var/db/mind.db"), PathBuf::from("/var/db/mind.db"));
        assert_eq!(expand_home(":memory:"), PathBuf::from(":memory:"));
        assert!(!expand_home("~/.mind.db").starts_with("~"));
    }
}
