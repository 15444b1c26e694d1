//! Text extraction and normalization for markup nodes.

use regex::{Captures, Regex};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use super::tree::Node;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ENTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WHITESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SPACE_BEFORE_PUNCT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,.;:!?)])").expect("valid regex"));

/// Elements whose content never contributes to document text.
const NON_TEXT_TAGS: &[&str] = &["script", "style", "head"];

fn named_entity(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "bdquo" => '\u{201E}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "laquo" => '\u{00AB}',
        "raquo" => '\u{00BB}',
        "hellip" => '\u{2026}',
        _ => return None,
    };
    Some(ch)
}

/// Decode HTML character references.
///
/// Unknown named references are left untouched.
///
/// # Examples
/// ```
/// use legis_harvester::markup::decode_entities;
///
/// assert_eq!(decode_entities("a&nbsp;&amp;&#259;"), "a &ă");
/// assert_eq!(decode_entities("&unknown;"), "&unknown;");
/// ```
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    ENTITY_PATTERN
        .replace_all(input, |caps: &Captures<'_>| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body
                .strip_prefix("#x")
                .or_else(|| body.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

/// Normalize extracted text.
///
/// Collapses whitespace runs (including non-breaking spaces) to a single
/// space, trims, removes spaces before closing punctuation and applies
/// Unicode NFC so Romanian diacritics compare equal regardless of encoding.
///
/// # Examples
/// ```
/// use legis_harvester::markup::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  Art.\n 5 ,  alin. (2) ."), "Art. 5, alin. (2).");
/// ```
pub fn normalize_whitespace(text: &str) -> String {
    let collapsed = WHITESPACE_PATTERN.replace_all(text, " ");
    let tightened = SPACE_BEFORE_PUNCT_PATTERN.replace_all(collapsed.trim(), "$1");
    tightened.nfc().collect()
}

/// Collect normalized text of a node and its descendants.
///
/// Subtrees for which `skip` returns `true` are left out entirely, as are
/// script and style elements. Text pieces are joined with single spaces.
pub fn collect_text<F>(node: Node<'_>, skip: F) -> String
where
    F: Fn(Node<'_>) -> bool,
{
    let mut pieces: Vec<&str> = Vec::new();
    let mut stack = vec![node];

    while let Some(current) = stack.pop() {
        if let Some(text) = current.text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                pieces.push(trimmed);
            }
            continue;
        }
        if NON_TEXT_TAGS.contains(&current.tag_name()) || (current != node && skip(current)) {
            continue;
        }
        let children: Vec<Node<'_>> = current.children().collect();
        stack.extend(children.into_iter().rev());
    }

    normalize_whitespace(&pieces.join(" "))
}

/// Collect all normalized text below a node.
///
/// # Examples
/// ```
/// use legis_harvester::markup::{node_text, MarkupTree};
///
/// let tree = MarkupTree::parse("<p>Art.  <b>5</b> ,</p>").unwrap();
/// let p = tree.root_elements().next().unwrap();
/// assert_eq!(node_text(p), "Art. 5,");
/// ```
pub fn node_text(node: Node<'_>) -> String {
    collect_text(node, |_| false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::MarkupTree;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_named_and_numeric() {
        assert_eq!(decode_entities("&bdquo;x&rdquo;"), "\u{201E}x\u{201D}");
        assert_eq!(decode_entities("&#x219;"), "ș");
        assert_eq!(decode_entities("a &amp b"), "a &amp b");
    }

    #[test]
    fn test_normalize_nbsp_and_punctuation() {
        assert_eq!(normalize_whitespace("a\u{00A0}\u{00A0}b ;"), "a b;");
        assert_eq!(normalize_whitespace("(în vigoare )"), "(în vigoare)");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn test_normalize_composes_diacritics() {
        // s + combining comma below
        let decomposed = "s\u{0326}i";
        assert_eq!(normalize_whitespace(decomposed), "\u{0219}i");
    }

    #[test]
    fn test_collect_text_skips_subtrees() {
        let tree = MarkupTree::parse(
            r#"<span>Intro <span class="S_PAR">note</span> tail<script>x()</script></span>"#,
        )
        .unwrap();
        let root = tree.root_elements().next().unwrap();

        assert_eq!(collect_text(root, |n| n.classes().any(|c| c == "S_PAR")), "Intro tail");
        assert_eq!(node_text(root), "Intro note tail");
    }
}
