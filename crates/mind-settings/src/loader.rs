//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`MindSettings::default()`]
//! 2. If `~/.mind/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `MIND_*` environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::MindSettings;

/// Resolve the path to the settings file (`~/.mind/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".mind").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<MindSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. Invalid JSON and values
/// that fail [`validate`] are errors.
pub fn load_settings_from_path(path: &Path) -> Result<MindSettings> {
    let mut settings = read_file_layer(path)?;
    apply_overrides(&mut settings, |name| std::env::var(name).ok());
    validate(&settings)?;
    Ok(settings)
}

fn read_file_layer(path: &Path) -> Result<MindSettings> {
    let defaults = serde_json::to_value(MindSettings::default())?;
    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };
    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `MIND_*` overrides read through `lookup`.
///
/// Unparseable or out-of-range values are logged and ignored.
pub fn apply_overrides(settings: &mut MindSettings, lookup: impl Fn(&str) -> Option<String>) {
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let read_usize = |name: &str, min: usize, max: usize| {
        let val = read(name)?;
        let parsed = parse_usize_range(&val, min, max);
        if parsed.is_none() {
            warn!(key = name, value = %val, "invalid number env var, ignoring");
        }
        parsed
    };

    if let Some(v) = read("MIND_DB") {
        settings.db_path = v;
    }
    if let Some(val) = read("MIND_STRICT") {
        match parse_bool(&val) {
            Some(v) => settings.strict = v,
            None => warn!(key = "MIND_STRICT", value = %val, "invalid boolean env var, ignoring"),
        }
    }
    if let Some(v) = read_usize("MIND_PAGE_SIZE", 1, 10_000) {
        settings.page_size = v;
    }
    if let Some(v) = read_usize("MIND_VERIFY_DEPTH", 0, usize::MAX) {
        settings.verify_depth = v;
    }
    if let Some(v) = read_usize("MIND_TAG_LIMIT", 1, 10_000) {
        settings.tag_limit = v;
    }
}

/// Reject settings the store cannot work with.
pub fn validate(settings: &MindSettings) -> Result<()> {
    if settings.db_path.is_empty() {
        return Err(SettingsError::InvalidValue("dbPath must not be empty".into()));
    }
    if settings.page_size == 0 {
        return Err(SettingsError::InvalidValue("pageSize must be at least 1".into()));
    }
    if settings.connection.pool_size == 0 {
        return Err(SettingsError::InvalidValue(
            "connection.poolSize must be at least 1".into(),
        ));
    }
    Ok(())
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"connection": {"poolSize": 4, "busyTimeoutMs": 1}});
        let source = serde_json::json!({"connection": {"poolSize": 1}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["connection"]["poolSize"], 1);
        assert_eq!(merged["connection"]["busyTimeoutMs"], 1);
    }

    #[test]
    fn merge_null_preserves_target() {
        let merged = deep_merge(serde_json::json!({"a": 1}), serde_json::json!({"a": null}));
        assert_eq!(merged["a"], 1);
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let merged = deep_merge(
            serde_json::json!({"a": {"nested": true}}),
            serde_json::json!({"a": 42}),
        );
        assert_eq!(merged["a"], 42);
    }

    // ── file layer ──────────────────────────────────────────────────

    #[test]
    fn missing_file_gives_defaults() {
        let settings = read_file_layer(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings, MindSettings::default());
    }

    #[test]
    fn partial_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"strict": false, "connection": {"poolSize": 2}}"#).unwrap();

        let settings = read_file_layer(&path).unwrap();
        assert!(!settings.strict);
        assert_eq!(settings.connection.pool_size, 2);
        assert_eq!(settings.connection.busy_timeout_ms, 30_000);
        assert_eq!(settings.page_size, 9);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();
        assert!(matches!(read_file_layer(&path), Err(SettingsError::Json(_))));
    }

    #[test]
    fn zero_page_size_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"pageSize": 0}"#).unwrap();
        assert!(matches!(
            load_settings_from_path(&path),
            Err(SettingsError::InvalidValue(_))
        ));
    }

    // ── env overrides ───────────────────────────────────────────────

    #[test]
    fn overrides_apply() {
        let mut settings = MindSettings::default();
        apply_overrides(
            &mut settings,
            env(&[
                ("MIND_DB", "/tmp/other.db"),
                ("MIND_STRICT", "off"),
                ("MIND_PAGE_SIZE", "25"),
                ("MIND_VERIFY_DEPTH", "0"),
                ("MIND_TAG_LIMIT", "3"),
            ]),
        );
        assert_eq!(settings.db_path, "/tmp/other.db");
        assert!(!settings.strict);
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.verify_depth, 0);
        assert_eq!(settings.tag_limit, 3);
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let mut settings = MindSettings::default();
        apply_overrides(
            &mut settings,
            env(&[("MIND_DB", ""), ("MIND_STRICT", "maybe"), ("MIND_PAGE_SIZE", "0")]),
        );
        assert_eq!(settings, MindSettings::default());
    }

    // ── parsing ─────────────────────────────────────────────────────

    #[test]
    fn parse_bool_variants() {
        for val in ["true", "1", "yes", "ON"] {
            assert_eq!(parse_bool(val), Some(true), "failed for {val}");
        }
        for val in ["false", "0", "no", "Off"] {
            assert_eq!(parse_bool(val), Some(false), "failed for {val}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn parse_usize_bounds() {
        assert_eq!(parse_usize_range("50", 1, 100), Some(50));
        assert_eq!(parse_usize_range("0", 1, 100), None);
        assert_eq!(parse_usize_range("101", 1, 100), None);
        assert_eq!(parse_usize_range("x", 1, 100), None);
    }
}
