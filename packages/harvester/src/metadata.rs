//! Document metadata extraction.

use regex::Regex;
use std::sync::LazyLock;

use crate::classify::{classify, Role, Scope};
use crate::markup::{node_text, normalize_whitespace, MarkupTree, Node};

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DOCUMENT_URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DetaliiDocument(?:Afis)?/(\d+)").expect("valid regex"));

/// Title, description and keywords of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
}

fn metadata_nodes(tree: &MarkupTree) -> impl Iterator<Item = Node<'_>> {
    tree.descendants()
        .filter(|n| n.is_element() && classify(*n, Scope::Document).role == Role::Metadata)
}

fn meta_content(tree: &MarkupTree, name: &str) -> Option<String> {
    metadata_nodes(tree)
        .find(|n| {
            n.has_tag("meta")
                && (n.attribute("name").is_some_and(|v| v.eq_ignore_ascii_case(name))
                    || n.attribute("property").is_some_and(|v| v.eq_ignore_ascii_case(name)))
        })
        .and_then(|n| n.attribute("content"))
        .map(normalize_whitespace)
        .filter(|content| !content.is_empty())
}

/// Read the document's title, description and keywords.
///
/// The title comes from `<meta name="title">`, falling back to `<title>`.
pub fn extract_metadata(tree: &MarkupTree) -> Metadata {
    let title = meta_content(tree, "title").or_else(|| {
        metadata_nodes(tree)
            .find(|n| n.has_tag("title"))
            .map(node_text)
            .filter(|t| !t.is_empty())
    });

    Metadata {
        title,
        description: meta_content(tree, "description"),
        keywords: meta_content(tree, "keywords"),
    }
}

/// Resolve the document's version identifier from its markup.
///
/// Looks at the canonical link, then `og:url`, then any link or form
/// target pointing at a document page.
///
/// # Examples
/// ```
/// use legis_harvester::markup::MarkupTree;
/// use legis_harvester::metadata::resolve_ver_id;
///
/// let tree = MarkupTree::parse(
///     r#"<html><head><link rel="canonical" href="https://legislatie.just.ro/Public/DetaliiDocument/109884"></head></html>"#,
/// ).unwrap();
/// assert_eq!(resolve_ver_id(&tree).as_deref(), Some("109884"));
/// ```
pub fn resolve_ver_id(tree: &MarkupTree) -> Option<String> {
    let from_url = |url: &str| {
        DOCUMENT_URL_PATTERN
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    };

    let canonical = metadata_nodes(tree)
        .filter(|n| n.has_tag("link") && n.attribute("rel").is_some_and(|r| r.eq_ignore_ascii_case("canonical")))
        .find_map(|n| n.attribute("href").and_then(from_url));
    if canonical.is_some() {
        return canonical;
    }

    let og_url = meta_content(tree, "og:url").and_then(|url| from_url(&url));
    if og_url.is_some() {
        return og_url;
    }

    tree.descendants()
        .filter(|n| n.is_element())
        .find_map(|n| {
            ["href", "action"]
                .iter()
                .find_map(|attr| n.attribute(attr).and_then(from_url))
        })
}
