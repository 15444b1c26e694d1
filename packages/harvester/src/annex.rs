//! Annex extraction.

use crate::classify::{portal_registry, Part, Role, Scope};
use crate::error::ParseWarning;
use crate::ids::IdAllocator;
use crate::markup::{collect_text, node_text, Node};
use crate::notes::extract_note;
use crate::types::Annex;

/// Heading, description and body spans of one annex.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnexParts<'t> {
    pub heading: Option<Node<'t>>,
    pub description: Option<Node<'t>>,
    pub body: Option<Node<'t>>,
}

impl<'t> AnnexParts<'t> {
    /// Split an `S_ANX` wrapper into its parts.
    ///
    /// Without an explicit body span the wrapper itself is the body.
    #[must_use]
    pub fn from_wrapper(node: Node<'t>) -> Self {
        let registry = portal_registry();
        let part_of = |part: Part| {
            node.element_children().find(|c| {
                c.classes()
                    .any(|class| registry.lookup(class, Scope::Document) == Some((Role::Annex, part)))
            })
        };

        Self {
            heading: part_of(Part::Heading),
            description: part_of(Part::Description),
            body: part_of(Part::Body).or(Some(node)),
        }
    }
}

/// Build an annex from its parts.
///
/// The text excludes the heading, the description, amendment notes and
/// ellipsis placeholders; notes are parsed separately.
pub fn build_annex(
    id: String,
    parts: AnnexParts<'_>,
    ids: &mut IdAllocator,
    warnings: &mut Vec<ParseWarning>,
) -> Annex {
    let registry = portal_registry();
    let is_excluded = |n: Node<'_>| {
        let classified = registry.classify(n, Scope::ArticleBody);
        matches!(
            (classified.role, classified.part),
            (Role::Note | Role::NoteShortPlaceholder, _)
                | (Role::Annex, Part::Heading | Part::Description)
        )
    };

    let mut annex = Annex {
        title: parts.heading.map(node_text).unwrap_or_default(),
        description: parts.description.map(node_text).filter(|d| !d.is_empty()),
        text: parts
            .body
            .map(|body| collect_text(body, is_excluded))
            .unwrap_or_default(),
        notes: Vec::new(),
        id,
    };

    if let Some(body) = parts.body {
        let note_nodes = body.descendants().skip(1).filter(|n| {
            n.is_element()
                && registry.classify(*n, Scope::ArticleBody).is(Role::Note, Part::Whole)
                && !n
                    .ancestors()
                    .take_while(|a| *a != body)
                    .any(|a| registry.classify(a, Scope::ArticleBody).is(Role::Note, Part::Whole))
        });
        for note_node in note_nodes {
            let note_id = ids.for_node(Some(note_node), &format!("{}_note", annex.id));
            annex.notes.push(extract_note(note_node, note_id, warnings));
        }
    }

    annex
}
