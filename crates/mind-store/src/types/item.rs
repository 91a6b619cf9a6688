//! Items ("stuff") and their tags.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Epoch, Phase};

/// Default preview width for listings.
pub const PREVIEW_LENGTH: usize = 40;

/// A tracked item.
///
/// `id` never changes once assigned; `phase` is the only field a mutation
/// may alter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Creation time, doubling as the primary key.
    pub id: Epoch,
    /// Free text.
    pub body: String,
    /// Lifecycle phase.
    pub phase: Phase,
}

impl Item {
    /// Minute-precision creation time, as shown to people.
    pub fn human_id(&self) -> String {
        self.id.human()
    }

    /// First body line, cut to `length` characters with a trailing `...`.
    pub fn preview(&self, length: usize) -> String {
        let Some(first_line) = self.body.lines().next().filter(|l| !l.is_empty()) else {
            return "EMPTY".to_string();
        };
        if first_line.chars().count() > length {
            let cut: String = first_line.chars().take(length).collect();
            format!("{}...", cut.trim())
        } else {
            first_line.to_string()
        }
    }

    /// Copy of this item in another phase.
    pub fn with_phase(&self, phase: Phase) -> Self {
        Self {
            phase,
            ..self.clone()
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.human_id(), self.preview(PREVIEW_LENGTH))
    }
}

/// A label attached to an item when it was created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Owning item.
    pub item_id: Epoch,
    /// Lowercase alphanumeric label.
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: &str = "This description is longer than forty characters. Really!";

    fn item(body: &str) -> Item {
        Item {
            id: Epoch(100_000_000),
            body: body.to_string(),
            phase: Phase::Active,
        }
    }

    #[test]
    fn preview_truncates_long_lines() {
        let preview = item(LONG).preview(PREVIEW_LENGTH);
        assert_eq!(preview, "This description is longer than forty ch...");
    }

    #[test]
    fn preview_keeps_short_lines() {
        assert_eq!(item("short").preview(PREVIEW_LENGTH), "short");
    }

    #[test]
    fn preview_uses_first_line_only() {
        assert_eq!(item("first\nsecond").preview(PREVIEW_LENGTH), "first");
    }

    #[test]
    fn preview_of_empty_body() {
        assert_eq!(item("").preview(PREVIEW_LENGTH), "EMPTY");
    }

    #[test]
    fn preview_counts_chars_not_bytes() {
        let body = "é".repeat(50);
        let preview = item(&body).preview(10);
        assert_eq!(preview, format!("{}...", "é".repeat(10)));
    }

    #[test]
    fn display_shows_time_and_preview() {
        assert_eq!(item("hello").to_string(), "1970-01-01T00:01 -> hello");
    }

    #[test]
    fn with_phase_keeps_id_and_body() {
        let done = item("x").with_phase(Phase::Done);
        assert_eq!(done.id, Epoch(100_000_000));
        assert_eq!(done.body, "x");
        assert_eq!(done.phase, Phase::Done);
    }
}
