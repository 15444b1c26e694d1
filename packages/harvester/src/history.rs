//! Consolidation history extraction.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use crate::classify::{classify, Part, Role, Scope, HISTORY_BLOCK_ID};
use crate::error::ParseWarning;
use crate::markup::{node_text, MarkupTree, Node};
use crate::types::HistoryEntry;

/// Date format printed by the portal.
const DATE_FORMAT: &str = "%d.%m.%Y";

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static VERSION_HREF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)(?:\?|$)").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2}\.\d{2}\.\d{4})").expect("valid regex"));

/// History entries plus the position of the current version, if marked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    /// Entries in source order.
    pub entries: Vec<HistoryEntry>,

    /// Index in `entries` at which the unlinked current-version item sits.
    pub current_slot: Option<usize>,
}

/// Previous/next version identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionLinks {
    pub prev_ver: Option<String>,
    pub next_ver: Option<String>,
}

fn find_date(text: &str) -> Option<String> {
    let date = DATE_PATTERN.captures(text)?.get(1)?.as_str();
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .ok()
        .map(|_| date.to_string())
}

/// Parse one history link. `None` means "not a usable entry".
fn parse_entry(link: Node<'_>) -> Option<HistoryEntry> {
    let href = link.attribute("href")?;
    let ver_id = VERSION_HREF_PATTERN.captures(href)?.get(1)?.as_str();

    let text = classify(link, Scope::History).label.unwrap_or_default();
    let date = find_date(&text).or_else(|| link.attribute("title").and_then(find_date))?;

    Some(HistoryEntry::new(ver_id, date))
}

/// Extract the consolidation history block.
///
/// Links are read in source order. A link without `href` marks where the
/// current version sits in the list. Links without a version id or a valid
/// date are skipped.
pub fn extract_history(tree: &MarkupTree) -> History {
    let mut history = History::default();
    let Some(block) = tree.find_by_element_id(HISTORY_BLOCK_ID) else {
        return history;
    };

    for node in block.descendants().skip(1) {
        if !classify(node, Scope::History).is(Role::HistoryEntry, Part::Whole) {
            continue;
        }

        if node.attribute("href").is_none_or(|href| href.trim().is_empty()) {
            history.current_slot.get_or_insert(history.entries.len());
            continue;
        }

        match parse_entry(node) {
            Some(entry) => history.entries.push(entry),
            None => tracing::debug!(
                href = node.attribute("href").unwrap_or_default(),
                text = %node_text(node),
                "Skipping history link without version id or date"
            ),
        }
    }

    history
}

/// Whether the entries are listed newest first.
///
/// Decided by comparing the first and last dates; lists that cannot be
/// compared are assumed newest first, as the portal prints them.
fn is_newest_first(entries: &[HistoryEntry]) -> bool {
    let parse = |entry: &HistoryEntry| NaiveDate::parse_from_str(&entry.date, DATE_FORMAT).ok();
    match (entries.first().and_then(parse), entries.last().and_then(parse)) {
        (Some(first), Some(last)) => first >= last,
        _ => true,
    }
}

/// Resolve the previous (older) and next (newer) version of `ver_id`.
///
/// The current version is located by identifier, or by the unlinked slot
/// when it is not listed. If neither locates it, both links stay unset and
/// an [`ParseWarning::UnresolvedHistoryLink`] is reported for non-empty
/// histories.
pub fn resolve_links(
    history: &History,
    ver_id: &str,
    warnings: &mut Vec<ParseWarning>,
) -> VersionLinks {
    let entries = &history.entries;

    // (entry before, entry after) the current version in source order
    let neighbours = if let Some(pos) = entries.iter().position(|e| e.ver_id == ver_id) {
        Some((pos.checked_sub(1), Some(pos + 1)))
    } else {
        history
            .current_slot
            .map(|slot| (slot.checked_sub(1), Some(slot)))
    };

    let Some((before, after)) = neighbours else {
        if !entries.is_empty() {
            tracing::warn!(
                ver_id,
                entries = entries.len(),
                "Current version not found in history; previous/next left unset"
            );
            warnings.push(ParseWarning::UnresolvedHistoryLink {
                ver_id: ver_id.to_string(),
                entries: entries.len(),
            });
        }
        return VersionLinks::default();
    };

    let lookup = |index: Option<usize>| {
        index
            .and_then(|i| entries.get(i))
            .map(|entry| entry.ver_id.clone())
    };
    let (before, after) = (lookup(before), lookup(after));

    if is_newest_first(entries) {
        VersionLinks {
            prev_ver: after,
            next_ver: before,
        }
    } else {
        VersionLinks {
            prev_ver: before,
            next_ver: after,
        }
    }
}

/// Where an unlisted current version sits, given its resolved links.
///
/// Inverse of the slot lookup in [`resolve_links`]: returns the index at
/// which an unlinked entry must be placed so the same links resolve again.
/// Listed versions and versions without links need no slot.
pub fn locate_current_slot(
    entries: &[HistoryEntry],
    ver_id: &str,
    links: &VersionLinks,
) -> Option<usize> {
    if entries.iter().any(|e| e.ver_id == ver_id) {
        return None;
    }
    let index_of = |ver: &Option<String>| {
        ver.as_deref()
            .and_then(|ver| entries.iter().position(|e| e.ver_id == ver))
    };

    // The entry after the slot is the older one when listed newest first
    let (after, before) = if is_newest_first(entries) {
        (&links.prev_ver, &links.next_ver)
    } else {
        (&links.next_ver, &links.prev_ver)
    };
    index_of(after).or_else(|| index_of(before).map(|i| i + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BLOCK: &str = r#"<html><body><div id="istoric_fa">
        <a href="/Public/DetaliiDocument/300">Forma 3 din 10.01.2022</a>
        <a>Forma curentă</a>
        <a href="/Public/DetaliiDocument/200" title="Consolidare 05.06.2021">Forma 2</a>
        <a href="/Public/DetaliiDocument/100?x=1">01.02.2020</a>
        <a href="/Public/DetaliiDocument/abc">11.11.2011</a>
        <a href="/Public/DetaliiDocument/99">31.02.2019</a>
    </div></body></html>"#;

    fn history() -> History {
        extract_history(&MarkupTree::parse(BLOCK).unwrap())
    }

    #[test]
    fn test_extract_history_entries() {
        let history = history();
        assert_eq!(
            history.entries,
            vec![
                HistoryEntry::new("300", "10.01.2022"),
                HistoryEntry::new("200", "05.06.2021"),
                HistoryEntry::new("100", "01.02.2020"),
            ]
        );
        assert_eq!(history.current_slot, Some(1));
    }

    #[test]
    fn test_missing_block_is_empty() {
        let tree = MarkupTree::parse("<html><body></body></html>").unwrap();
        assert_eq!(extract_history(&tree), History::default());
    }

    #[test]
    fn test_resolve_listed_version_newest_first() {
        let mut warnings = Vec::new();
        let links = resolve_links(&history(), "200", &mut warnings);

        assert_eq!(links.prev_ver.as_deref(), Some("100"));
        assert_eq!(links.next_ver.as_deref(), Some("300"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_resolve_by_current_slot() {
        let mut warnings = Vec::new();
        let links = resolve_links(&history(), "250", &mut warnings);

        assert_eq!(links.prev_ver.as_deref(), Some("200"));
        assert_eq!(links.next_ver.as_deref(), Some("300"));
    }

    #[test]
    fn test_resolve_oldest_first() {
        let history = History {
            entries: vec![
                HistoryEntry::new("1", "01.01.2019"),
                HistoryEntry::new("2", "01.01.2020"),
                HistoryEntry::new("3", "01.01.2021"),
            ],
            current_slot: None,
        };
        let links = resolve_links(&history, "2", &mut Vec::new());

        assert_eq!(links.prev_ver.as_deref(), Some("1"));
        assert_eq!(links.next_ver.as_deref(), Some("3"));
    }

    #[test]
    fn test_unresolved_version_leaves_links_unset() {
        let history = History {
            entries: vec![
                HistoryEntry::new("1", "01.01.2021"),
                HistoryEntry::new("2", "01.01.2020"),
                HistoryEntry::new("3", "01.01.2019"),
            ],
            current_slot: None,
        };
        let mut warnings = Vec::new();
        let links = resolve_links(&history, "9", &mut warnings);

        assert_eq!(links, VersionLinks::default());
        assert_eq!(
            warnings,
            vec![ParseWarning::UnresolvedHistoryLink {
                ver_id: "9".to_string(),
                entries: 3
            }]
        );
    }

    #[test]
    fn test_locate_current_slot_inverts_resolution() {
        let history = history();
        let links = resolve_links(&history, "250", &mut Vec::new());
        assert_eq!(locate_current_slot(&history.entries, "250", &links), Some(1));

        // Oldest current version: only a next link, slot at the end
        let links = VersionLinks {
            prev_ver: None,
            next_ver: Some("100".to_string()),
        };
        assert_eq!(locate_current_slot(&history.entries, "50", &links), Some(3));

        let listed = resolve_links(&history, "200", &mut Vec::new());
        assert_eq!(locate_current_slot(&history.entries, "200", &listed), None);
        assert_eq!(
            locate_current_slot(&history.entries, "9", &VersionLinks::default()),
            None
        );
    }

    #[test]
    fn test_empty_history_does_not_warn() {
        let mut warnings = Vec::new();
        let links = resolve_links(&History::default(), "9", &mut warnings);
        assert_eq!(links, VersionLinks::default());
        assert!(warnings.is_empty());
    }
}
