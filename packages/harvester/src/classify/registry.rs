//! Marker registry mapping portal class markers to structural roles.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use super::config::create_portal_registry;
use super::labels::strip_article_prefix;
use super::roles::{Classified, Part, Role, Scope};
use crate::markup::{node_text, Node};

/// Element id of the consolidation history block.
pub const HISTORY_BLOCK_ID: &str = "istoric_fa";

static DEFAULT_REGISTRY: LazyLock<MarkerRegistry> = LazyLock::new(create_portal_registry);

/// Registry mapping class markers and tag names to roles.
///
/// Markers are matched on the `class` attribute of an element; the first
/// class token with a registered marker wins. Tags can additionally be
/// registered as metadata or marked to be skipped entirely.
#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    markers: HashMap<String, (Role, Part)>,
    scoped: HashMap<(Scope, String), (Role, Part)>,
    metadata_tags: HashSet<String>,
    skip_tags: HashSet<String>,
}

impl MarkerRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class marker.
    pub fn register(&mut self, marker: impl Into<String>, role: Role, part: Part) {
        self.markers.insert(marker.into(), (role, part));
    }

    /// Register a class marker that means something else inside `scope`.
    pub fn register_scoped(
        &mut self,
        scope: Scope,
        marker: impl Into<String>,
        role: Role,
        part: Part,
    ) {
        self.scoped.insert((scope, marker.into()), (role, part));
    }

    /// Register tags carrying document metadata.
    pub fn metadata(&mut self, tag_names: impl IntoIterator<Item = impl Into<String>>) {
        for tag in tag_names {
            self.metadata_tags.insert(tag.into());
        }
    }

    /// Mark tags as skip (no text, no structure).
    pub fn skip(&mut self, tag_names: impl IntoIterator<Item = impl Into<String>>) {
        for tag in tag_names {
            self.skip_tags.insert(tag.into());
        }
    }

    /// Check if a tag should be skipped.
    #[must_use]
    pub fn should_skip(&self, tag_name: &str) -> bool {
        self.skip_tags.contains(tag_name)
    }

    /// Check if a marker is registered (in any scope).
    #[must_use]
    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers.contains_key(marker) || self.scoped.keys().any(|(_, m)| m == marker)
    }

    /// Look up the role of a single class marker in a scope.
    #[must_use]
    pub fn lookup(&self, marker: &str, scope: Scope) -> Option<(Role, Part)> {
        self.scoped
            .get(&(scope, marker.to_string()))
            .or_else(|| self.markers.get(marker))
            .copied()
    }

    /// Classify a node.
    ///
    /// Pure function of the node and scope: unrecognized markers yield
    /// [`Role::Unknown`], never an error.
    #[must_use]
    pub fn classify(&self, node: Node<'_>, scope: Scope) -> Classified {
        if !node.is_element() {
            return Classified::unknown();
        }

        let tag = node.tag_name();
        if self.should_skip(tag) {
            return Classified::unknown();
        }
        if self.metadata_tags.contains(tag) {
            return Classified::new(Role::Metadata, Part::Whole);
        }
        if node.element_id() == Some(HISTORY_BLOCK_ID) {
            return Classified::new(Role::HistoryEntry, Part::Body);
        }
        if scope == Scope::History && tag == "a" {
            return Classified::new(Role::HistoryEntry, Part::Whole).with_label(node_text(node));
        }

        let Some((role, part)) = node.classes().find_map(|class| self.lookup(class, scope)) else {
            return Classified::unknown();
        };

        let classified = Classified::new(role, part);
        match extract_label(self, node, role, part, scope) {
            Some(label) => classified.with_label(label),
            None => classified,
        }
    }

    fn find_part<'t>(
        &self,
        node: Node<'t>,
        role: Role,
        part: Part,
        scope: Scope,
    ) -> Option<Node<'t>> {
        node.element_children().find(|child| {
            child
                .classes()
                .any(|class| self.lookup(class, scope) == Some((role, part)))
        })
    }
}

fn extract_label(
    registry: &MarkerRegistry,
    node: Node<'_>,
    role: Role,
    part: Part,
    scope: Scope,
) -> Option<String> {
    match (role, part) {
        (Role::NoteShortPlaceholder, _) | (Role::Metadata | Role::Unknown, _) => None,
        (_, Part::Body) => None,
        (Role::Article, Part::Heading) => Some(strip_article_prefix(&node_text(node))),
        (Role::Article, Part::Whole) => registry
            .find_part(node, Role::Article, Part::Heading, scope)
            .map(|heading| strip_article_prefix(&node_text(heading))),
        (Role::Paragraph | Role::SubParagraph, Part::Whole) => registry
            .find_part(node, role, Part::Heading, scope)
            .map(node_text),
        (Role::Note | Role::Annex, Part::Whole) => registry
            .find_part(node, role, Part::Heading, scope)
            .map(node_text),
        _ => Some(node_text(node)),
    }
}

/// Classify a node with the portal registry.
///
/// # Examples
/// ```
/// use legis_harvester::classify::{classify, Part, Role, Scope};
/// use legis_harvester::markup::MarkupTree;
///
/// let tree = MarkupTree::parse(r#"<span class="S_ART_TTL">Articolul 5</span>"#).unwrap();
/// let node = tree.root_elements().next().unwrap();
/// let classified = classify(node, Scope::Document);
///
/// assert_eq!(classified.role, Role::Article);
/// assert_eq!(classified.part, Part::Heading);
/// assert_eq!(classified.label.as_deref(), Some("5"));
/// ```
#[must_use]
pub fn classify(node: Node<'_>, scope: Scope) -> Classified {
    DEFAULT_REGISTRY.classify(node, scope)
}

/// The shared portal registry.
#[must_use]
pub fn portal_registry() -> &'static MarkerRegistry {
    &DEFAULT_REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::MarkupTree;

    fn classify_first(html: &str, scope: Scope) -> Classified {
        let tree = MarkupTree::parse(html).unwrap();
        let node = tree.root_elements().next().unwrap();
        classify(node, scope)
    }

    #[test]
    fn test_registry_register_and_lookup() {
        let mut registry = MarkerRegistry::new();
        registry.register("S_X", Role::Chapter, Part::Heading);

        assert!(registry.has_marker("S_X"));
        assert_eq!(
            registry.lookup("S_X", Scope::Document),
            Some((Role::Chapter, Part::Heading))
        );
        assert_eq!(registry.lookup("S_Y", Scope::Document), None);
    }

    #[test]
    fn test_scoped_marker_overrides() {
        let mut registry = MarkerRegistry::new();
        registry.register("S_PAR", Role::Paragraph, Part::Whole);
        registry.register_scoped(Scope::ParagraphBody, "S_PAR", Role::Note, Part::Whole);

        assert_eq!(
            registry.lookup("S_PAR", Scope::ArticleBody),
            Some((Role::Paragraph, Part::Whole))
        );
        assert_eq!(
            registry.lookup("S_PAR", Scope::ParagraphBody),
            Some((Role::Note, Part::Whole))
        );
    }

    #[test]
    fn test_classify_container_heading() {
        let c = classify_first(
            r#"<span class="S_CAP_TTL">Capitolul  I</span>"#,
            Scope::Document,
        );
        assert_eq!(c.role, Role::Chapter);
        assert_eq!(c.part, Part::Heading);
        assert_eq!(c.label.as_deref(), Some("Capitolul I"));
    }

    #[test]
    fn test_classify_article_whole_uses_heading() {
        let c = classify_first(
            r#"<span class="S_ART"><span class="S_ART_TTL">Articolul 12</span><span class="S_ART_BDY">x</span></span>"#,
            Scope::Document,
        );
        assert!(c.is(Role::Article, Part::Whole));
        assert_eq!(c.label.as_deref(), Some("12"));
    }

    #[test]
    fn test_classify_paragraph_label() {
        let c = classify_first(
            r#"<span class="S_ALN"><span class="S_ALN_TTL">(2)</span><span class="S_ALN_BDY">text</span></span>"#,
            Scope::ArticleBody,
        );
        assert!(c.is(Role::Paragraph, Part::Whole));
        assert_eq!(c.label.as_deref(), Some("(2)"));
    }

    #[test]
    fn test_classify_par_depends_on_scope() {
        let html = r#"<span class="S_PAR">Text</span>"#;
        assert_eq!(classify_first(html, Scope::ArticleBody).role, Role::Paragraph);
        assert_eq!(classify_first(html, Scope::ParagraphBody).role, Role::Note);
    }

    #[test]
    fn test_classify_placeholder_and_unknown() {
        let c = classify_first(r#"<span class="S_LIT_SHORT">...</span>"#, Scope::ArticleBody);
        assert_eq!(c.role, Role::NoteShortPlaceholder);
        assert_eq!(c.label, None);

        let c = classify_first(r#"<span class="S_WHATEVER">x</span>"#, Scope::Document);
        assert_eq!(c, Classified::unknown());
    }

    #[test]
    fn test_classify_history() {
        let c = classify_first(r#"<div id="istoric_fa"></div>"#, Scope::Document);
        assert!(c.is(Role::HistoryEntry, Part::Body));

        let c = classify_first(r#"<a href="/x/1">01.01.2020</a>"#, Scope::History);
        assert!(c.is(Role::HistoryEntry, Part::Whole));
        assert_eq!(c.label.as_deref(), Some("01.01.2020"));
    }

    #[test]
    fn test_classify_metadata() {
        let c = classify_first(r#"<meta name="title" content="X">"#, Scope::Document);
        assert_eq!(c.role, Role::Metadata);
    }
}
