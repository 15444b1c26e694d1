//! Label extraction helpers.

use regex::Regex;
use std::sync::LazyLock;

/// Word the portal prints in front of article numbers.
const ARTICLE_PREFIX: &str = "articolul";

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LEADING_LABEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\(\d+\)|\d+\.|[a-z]\))\s*").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PARAGRAPH_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\d+\)$").expect("valid regex"));

/// Strip the "Articolul" prefix from an article marker.
///
/// The comparison ignores case. Markers without the prefix are returned
/// trimmed but otherwise unchanged.
///
/// # Examples
/// ```
/// use legis_harvester::classify::strip_article_prefix;
///
/// assert_eq!(strip_article_prefix("Articolul 5"), "5");
/// assert_eq!(strip_article_prefix("ARTICOLUL unic"), "unic");
/// assert_eq!(strip_article_prefix("Art. 7"), "Art. 7");
/// ```
pub fn strip_article_prefix(marker: &str) -> String {
    let trimmed = marker.trim();
    let prefix_len = ARTICLE_PREFIX.len();
    match trimmed.get(..prefix_len) {
        Some(head) if head.eq_ignore_ascii_case(ARTICLE_PREFIX) => {
            trimmed[prefix_len..].trim().to_string()
        }
        _ => trimmed.to_string(),
    }
}

/// Normalize a paragraph or item label.
///
/// Removes the surrounding punctuation the portal prints around labels:
/// `(1)` becomes `1`, `a)` becomes `a` and `1.` becomes `1`.
///
/// # Examples
/// ```
/// use legis_harvester::classify::normalize_label;
///
/// assert_eq!(normalize_label("(1)"), "1");
/// assert_eq!(normalize_label(" a) "), "a");
/// assert_eq!(normalize_label("1."), "1");
/// ```
pub fn normalize_label(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('(')
        .trim_end_matches(['.', ')'])
        .trim()
        .to_string()
}

/// Split a leading `(N)`, `N.` or `a)` label off the start of a text.
///
/// Returns the raw label and the remaining text.
pub fn split_leading_label(text: &str) -> Option<(&str, &str)> {
    let caps = LEADING_LABEL_PATTERN.captures(text)?;
    let whole = caps.get(0)?;
    let label = caps.get(1)?;
    Some((label.as_str(), &text[whole.end()..]))
}

/// Whether a raw label is a parenthesized paragraph number such as `(2)`.
pub fn is_paragraph_number(raw: &str) -> bool {
    PARAGRAPH_NUMBER_PATTERN.is_match(raw.trim())
}
