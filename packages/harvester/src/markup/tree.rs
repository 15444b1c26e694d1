//! Read-only markup tree built from the portal HTML.
//!
//! The HTML is tokenized with `tl` and copied once into an owned arena so the
//! rest of the crate can walk it with small `Copy` node handles, free of
//! the parser's borrow of the input buffer.

use std::collections::BTreeMap;

use super::text::decode_entities;
use crate::error::{HarvesterError, Result};

/// Index of a node inside a [`MarkupTree`].
type NodeId = usize;

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Owned, immutable view of a parsed HTML document.
#[derive(Debug, Clone, Default)]
pub struct MarkupTree {
    nodes: Vec<NodeData>,
    roots: Vec<NodeId>,
}

impl MarkupTree {
    /// Parse markup into a tree.
    ///
    /// # Errors
    /// Returns `MalformedMarkup` if the input is blank, cannot be tokenized,
    /// or contains no element at all.
    ///
    /// # Examples
    /// ```
    /// use legis_harvester::markup::MarkupTree;
    ///
    /// let tree = MarkupTree::parse(r#"<span class="S_ART" id="a1">x</span>"#).unwrap();
    /// let span = tree.root_elements().next().unwrap();
    /// assert_eq!(span.tag_name(), "span");
    /// assert_eq!(span.element_id(), Some("a1"));
    /// assert!(MarkupTree::parse("   ").is_err());
    /// ```
    pub fn parse(markup: &str) -> Result<Self> {
        if markup.trim().is_empty() {
            return Err(HarvesterError::MalformedMarkup("empty markup".to_string()));
        }

        let dom = tl::parse(markup, tl::ParserOptions::default())
            .map_err(|e| HarvesterError::MalformedMarkup(format!("failed to parse HTML: {e:?}")))?;
        let parser = dom.parser();

        let mut tree = Self::default();
        let mut pending: Vec<(tl::NodeHandle, Option<NodeId>)> =
            dom.children().iter().rev().map(|h| (*h, None)).collect();

        while let Some((handle, parent)) = pending.pop() {
            let Some(node) = handle.get(parser) else {
                continue;
            };

            let kind = match node {
                tl::Node::Tag(tag) => NodeKind::Element {
                    tag: tag.name().as_utf8_str().to_ascii_lowercase(),
                    attributes: collect_attributes(tag),
                },
                tl::Node::Raw(raw) => NodeKind::Text(decode_entities(&raw.as_utf8_str())),
                tl::Node::Comment(_) => continue,
            };

            let id = tree.push(kind, parent);
            if let tl::Node::Tag(tag) = node {
                // InlineVec iterators only run forward
                let children: Vec<tl::NodeHandle> = tag.children().top().iter().copied().collect();
                pending.extend(children.into_iter().rev().map(|child| (child, Some(id))));
            }
        }

        if !tree.nodes.iter().any(|n| matches!(n.kind, NodeKind::Element { .. })) {
            return Err(HarvesterError::MalformedMarkup(
                "no root element".to_string(),
            ));
        }

        Ok(tree)
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Top-level nodes in document order.
    pub fn roots(&self) -> impl Iterator<Item = Node<'_>> {
        self.roots.iter().map(move |&id| Node { tree: self, id })
    }

    /// Top-level element nodes in document order.
    pub fn root_elements(&self) -> impl Iterator<Item = Node<'_>> {
        self.roots().filter(|n| n.is_element())
    }

    /// Depth-first, pre-order traversal of every node in the document.
    pub fn descendants(&self) -> impl Iterator<Item = Node<'_>> {
        self.roots().flat_map(|root| root.descendants())
    }

    /// Find the first element whose `id` attribute equals `id`.
    #[must_use]
    pub fn find_by_element_id(&self, id: &str) -> Option<Node<'_>> {
        self.descendants().find(|n| n.element_id() == Some(id))
    }
}

fn collect_attributes(tag: &tl::HTMLTag<'_>) -> BTreeMap<String, String> {
    let attrs = tag.attributes();
    let mut map: BTreeMap<String, String> = attrs
        .iter()
        .map(|(name, value)| {
            (
                name.to_ascii_lowercase(),
                value.map(|v| decode_entities(&v)).unwrap_or_default(),
            )
        })
        .collect();

    // tl keeps id and class outside the generic attribute map
    if let Some(id) = attrs.id() {
        map.insert("id".to_string(), decode_entities(&id.as_utf8_str()));
    }
    if let Some(class) = attrs.class() {
        map.insert("class".to_string(), decode_entities(&class.as_utf8_str()));
    }
    map
}

/// Lightweight handle to a node of a [`MarkupTree`].
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t MarkupTree,
    id: NodeId,
}

impl<'t> Node<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id]
    }

    /// Whether this node is an element.
    #[must_use]
    pub fn is_element(&self) -> bool {
        matches!(self.data().kind, NodeKind::Element { .. })
    }

    /// Whether this node is a text node.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.data().kind, NodeKind::Text(_))
    }

    /// Lowercase tag name, or an empty string for text nodes.
    #[must_use]
    pub fn tag_name(&self) -> &'t str {
        match &self.data().kind {
            NodeKind::Element { tag, .. } => tag,
            NodeKind::Text(_) => "",
        }
    }

    /// Check if the node is an element with the given tag name.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.is_element() && self.tag_name() == tag
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&'t str> {
        match &self.data().kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            NodeKind::Text(_) => None,
        }
    }

    /// Non-empty `id` attribute.
    #[must_use]
    pub fn element_id(&self) -> Option<&'t str> {
        self.attribute("id").map(str::trim).filter(|s| !s.is_empty())
    }

    /// Class tokens of the element. These carry the portal's structural markers.
    pub fn classes(&self) -> impl Iterator<Item = &'t str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_whitespace()
    }

    /// Raw content of a text node.
    #[must_use]
    pub fn text(&self) -> Option<&'t str> {
        match &self.data().kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    /// Parent node.
    #[must_use]
    pub fn parent(&self) -> Option<Node<'t>> {
        self.data().parent.map(|id| Node {
            tree: self.tree,
            id,
        })
    }

    /// Iterate over the ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'t>> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// Direct children in document order.
    pub fn children(&self) -> impl Iterator<Item = Node<'t>> {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&id| Node { tree, id })
    }

    /// Direct element children.
    pub fn element_children(&self) -> impl Iterator<Item = Node<'t>> {
        self.children().filter(|c| c.is_element())
    }

    /// Pre-order traversal of this node and everything below it.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'t> {
        Descendants {
            tree: self.tree,
            stack: vec![self.id],
        }
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data().kind {
            NodeKind::Element { tag, attributes } => f
                .debug_struct("Element")
                .field("id", &self.id)
                .field("tag", tag)
                .field("attributes", attributes)
                .finish(),
            NodeKind::Text(text) => f
                .debug_struct("Text")
                .field("id", &self.id)
                .field("text", text)
                .finish(),
        }
    }
}

/// Pre-order iterator returned by [`Node::descendants`].
pub struct Descendants<'t> {
    tree: &'t MarkupTree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[id].children.iter().rev().copied());
        Some(Node {
            tree: self.tree,
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_spans() {
        let tree = MarkupTree::parse(
            r#"<div id="outer"><span class="S_ART" id="a1">one <b>two</b></span></div>"#,
        )
        .unwrap();

        let outer = tree.root_elements().next().unwrap();
        assert_eq!(outer.tag_name(), "div");
        let span = outer.element_children().next().unwrap();
        assert!(span.classes().any(|c| c == "S_ART"));
        assert_eq!(span.parent(), Some(outer));
        assert_eq!(span.children().filter_map(|c| c.text()).collect::<String>(), "one ");
    }

    #[test]
    fn test_parse_rejects_text_only() {
        let err = MarkupTree::parse("just text").unwrap_err();
        assert!(err.to_string().contains("no root element"));
    }

    #[test]
    fn test_descendants_pre_order() {
        let tree = MarkupTree::parse("<a><b><c/></b><d/></a>").unwrap();
        let tags: Vec<&str> = tree
            .descendants()
            .filter(|n| n.is_element())
            .map(|n| n.tag_name())
            .collect();
        assert_eq!(tags, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_attribute_lookup_and_classes() {
        let tree =
            MarkupTree::parse(r#"<span class="S_LIT extra" id="x" title="T &amp; C">y</span>"#)
                .unwrap();
        let span = tree.root_elements().next().unwrap();

        assert_eq!(span.attribute("title"), Some("T & C"));
        assert_eq!(span.classes().collect::<Vec<_>>(), vec!["S_LIT", "extra"]);
        assert!(span.attribute("missing").is_none());
    }

    #[test]
    fn test_find_by_element_id() {
        let tree = MarkupTree::parse(r#"<html><body><div id="istoric_fa"></div></body></html>"#)
            .unwrap();
        assert!(tree.find_by_element_id("istoric_fa").is_some());
        assert!(tree.find_by_element_id("nope").is_none());
    }
}
