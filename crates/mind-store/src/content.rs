//! Splitting free text into an item body and its tags.
//!
//! A word is a tag when it is `#` followed by one or more ASCII
//! alphanumerics; the label is lowercased. Every other word is body text.
//! Words within a line are re-joined with single spaces and lines are
//! re-joined with `\n`.

use std::collections::BTreeSet;

/// Marker that starts a tag word.
pub const TAG_PREFIX: char = '#';

/// Body text and the distinct, sorted tag labels found in it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedContent {
    /// Text with tag words removed.
    pub body: String,
    /// Lowercase labels, deduplicated and sorted.
    pub tags: Vec<String>,
}

/// Parse a whole (possibly multi-line) entry.
pub fn parse_content(content: &str) -> ParsedContent {
    let mut tags = BTreeSet::new();
    let lines: Vec<String> = content
        .lines()
        .map(|line| extract_tags(line, &mut tags))
        .collect();
    ParsedContent {
        body: lines.join("\n"),
        tags: tags.into_iter().collect(),
    }
}

/// The label a word carries, if it is a tag word.
pub fn tag_label(word: &str) -> Option<String> {
    let label = word.strip_prefix(TAG_PREFIX)?;
    (!label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric()))
        .then(|| label.to_ascii_lowercase())
}

fn extract_tags(line: &str, tags: &mut BTreeSet<String>) -> String {
    let mut words = Vec::new();
    for word in line.split_whitespace() {
        match tag_label(word) {
            Some(label) => {
                let _ = tags.insert(label);
            }
            None => words.push(word),
        }
    }
    words.join(" ")
}
