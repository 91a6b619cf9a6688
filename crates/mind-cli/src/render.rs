//! Text rendering of store results.

use mind_store::{ChainRecord, Item, Order, Tag, VerifyReport};

/// Line shown in place of an empty page.
pub const EMPTY_PAGE: &str = "  Hmm, couldn't find anything here.";

/// Horizontal rule between sections.
pub const RULE_WIDTH: usize = 80;

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

fn join_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> String {
    labels.into_iter().collect::<Vec<_>>().join(", ")
}

/// Listing header, e.g. ` # Currently minding [latest] [ALL] [num=9]...`.
pub fn list_header(order: Order, tag: Option<&str>, num: usize) -> String {
    let order = match order {
        Order::Latest => "latest",
        Order::Oldest => "oldest",
    };
    format!(
        " # Currently minding [{order}] [{}] [num={num}]...",
        tag.unwrap_or("ALL")
    )
}

/// A page of items numbered from `first`, followed by the latest tags.
///
/// `items` may hold one row more than `num`; that row only signals that
/// another page exists.
pub fn listing(header: String, items: &[Item], first: usize, num: usize, tags: &[String]) -> Vec<String> {
    let mut out = vec![header];
    if items.is_empty() {
        out.push(EMPTY_PAGE.to_string());
    }
    out.extend(
        items
            .iter()
            .take(num)
            .enumerate()
            .map(|(i, item)| format!(" {}. {item}", first + i)),
    );
    if items.len() > num {
        out.push("And more...".to_string());
    }
    out.push(rule());
    out.push(format!("  Latest tags: {}", join_labels(tags.iter().map(String::as_str))));
    out.push(rule());
    out
}

/// Confirmation for a new item.
pub fn added(item: &Item, tags: &[Tag]) -> String {
    format!(
        "Added {item} Tags [{}]",
        join_labels(tags.iter().map(|t| t.label.as_str()))
    )
}

/// Full view of one item.
pub fn show(item: &Item, tags: &[Tag]) -> Vec<String> {
    vec![
        format!("Stuff [{}]", item.human_id()),
        rule(),
        format!("Tags: {}", join_labels(tags.iter().map(|t| t.label.as_str()))),
        rule(),
        item.body.clone(),
    ]
}

/// One line per chain record.
pub fn history(records: &[ChainRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| {
            format!(
                " {}. {} {} {} {}",
                r.sn,
                r.stamp.human(),
                r.transition,
                r.item_id.hex(),
                r.hash.get(..12).unwrap_or(&r.hash)
            )
        })
        .collect()
}

/// Tag summary line.
pub fn tags(labels: &[String]) -> String {
    format!("Latest tags: {}", join_labels(labels.iter().map(String::as_str)))
}

/// Verification summary.
pub fn verified(report: &VerifyReport) -> String {
    let scope = if report.reached_genesis() { "all" } else { "latest" };
    format!(
        "Verified {scope} {} records (head sn={}).",
        report.checked, report.head
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mind_store::{Epoch, Phase, Transition};

    fn item(id: i64, body: &str) -> Item {
        Item {
            id: Epoch(id),
            body: body.into(),
            phase: Phase::Active,
        }
    }

    fn tag(label: &str) -> Tag {
        Tag {
            item_id: Epoch(0),
            label: label.into(),
        }
    }

    #[test]
    fn header_matches_default_listing() {
        assert_eq!(
            list_header(Order::Latest, None, 9),
            " # Currently minding [latest] [ALL] [num=9]..."
        );
        assert_eq!(
            list_header(Order::Oldest, Some("home"), 3),
            " # Currently minding [oldest] [home] [num=3]..."
        );
    }

    #[test]
    fn listing_layout() {
        let items = vec![item(0, "a"), item(0, "b"), item(0, "c")];
        let out = listing("H".into(), &items, 1, 2, &["x".into(), "y".into()]);
        assert_eq!(out[0], "H");
        assert_eq!(out[1], " 1. 1970-01-01T00:00 -> a");
        assert_eq!(out[2], " 2. 1970-01-01T00:00 -> b");
        assert_eq!(out[3], "And more...");
        assert_eq!(out[out.len() - 3], "-".repeat(80));
        assert_eq!(out[out.len() - 2], "  Latest tags: x, y");
        assert_eq!(out[out.len() - 1], "-".repeat(80));
    }

    #[test]
    fn empty_page_has_placeholder() {
        let out = listing("H".into(), &[], 1, 9, &[]);
        assert_eq!(out[1], "  Hmm, couldn't find anything here.");
        assert_eq!(out[2], "-".repeat(80));
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn listing_numbers_continue_across_pages() {
        let out = listing("H".into(), &[item(0, "a")], 10, 9, &[]);
        assert_eq!(out[1], " 10. 1970-01-01T00:00 -> a");
        assert_eq!(out[2], "-".repeat(80));
    }

    #[test]
    fn added_lists_tags() {
        let line = added(&item(0, "note"), &[tag("markdown"), tag("nohello")]);
        assert_eq!(line, "Added 1970-01-01T00:00 -> note Tags [markdown, nohello]");
        assert!(added(&item(0, "x"), &[]).ends_with(" -> x Tags []"));
    }

    #[test]
    fn show_layout() {
        let out = show(&item(0, "line one\nline two"), &[tag("a")]);
        assert_eq!(out[0], "Stuff [1970-01-01T00:00]");
        assert_eq!(out[2], "Tags: a");
        assert_eq!(out[4], "line one\nline two");
    }

    #[test]
    fn history_line() {
        let record = ChainRecord {
            sn: 2,
            hash: "0123456789abcdef".into(),
            item_id: Epoch(255),
            stamp: Epoch(0),
            transition: Transition::Add,
        };
        assert_eq!(
            history(&[record]),
            vec![" 2. 1970-01-01T00:00 ABSENT->ACTIVE ff 0123456789ab"]
        );
    }

    #[test]
    fn verified_summary() {
        let full = VerifyReport { checked: 3, head: 3 };
        assert_eq!(verified(&full), "Verified all 3 records (head sn=3).");
        let partial = VerifyReport { checked: 2, head: 9 };
        assert_eq!(verified(&partial), "Verified latest 2 records (head sn=9).");
    }
}
