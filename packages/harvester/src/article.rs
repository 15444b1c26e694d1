//! Article and paragraph building.
//!
//! An article's content is a sequence of nodes: the children of its body
//! span, or the siblings that follow a bare article heading. Paragraph,
//! item and note markers split that sequence into paragraphs; free text
//! between markers belongs to the current paragraph, or to an implicit
//! paragraph when no marker opened one.

use crate::classify::{
    is_paragraph_number, normalize_label, portal_registry, split_leading_label, Classified,
    MarkerRegistry, Part, Role, Scope,
};
use crate::error::ParseWarning;
use crate::ids::IdAllocator;
use crate::markup::{collect_text, node_text, normalize_whitespace, Node};
use crate::notes::extract_note;
use crate::types::{Article, Note, Paragraph, SubParagraph};

/// Incremental builder for one article.
pub struct ArticleBuilder<'a> {
    article_id: String,
    registry: &'static MarkerRegistry,
    ids: &'a mut IdAllocator,
    warnings: &'a mut Vec<ParseWarning>,
    paragraphs: Vec<Paragraph>,
    notes: Vec<Note>,

    /// Paragraph that items attach to.
    current: Option<usize>,

    /// Whether free text still flows into the current paragraph.
    open_text: bool,
}

/// An `S_LIT`/`S_LIN` item read from the markup.
struct Item {
    id_node: Option<String>,
    raw_label: String,
    text: String,
    notes: Vec<Note>,
}

impl<'a> ArticleBuilder<'a> {
    /// Start building the article with the given identifier.
    pub fn new(
        article_id: impl Into<String>,
        ids: &'a mut IdAllocator,
        warnings: &'a mut Vec<ParseWarning>,
    ) -> Self {
        Self {
            article_id: article_id.into(),
            registry: portal_registry(),
            ids,
            warnings,
            paragraphs: Vec::new(),
            notes: Vec::new(),
            current: None,
            open_text: false,
        }
    }

    fn classify(&self, node: Node<'_>, scope: Scope) -> Classified {
        self.registry.classify(node, scope)
    }

    /// Feed one content node (and its subtree) to the builder.
    pub fn push(&mut self, node: Node<'_>) {
        let mut pending = vec![node];

        while let Some(node) = pending.pop() {
            if let Some(text) = node.text() {
                self.append_text(text);
                continue;
            }
            if self.registry.should_skip(node.tag_name()) {
                continue;
            }

            let classified = self.classify(node, Scope::ArticleBody);
            match (classified.role, classified.part) {
                (Role::NoteShortPlaceholder | Role::Metadata, _) | (Role::Article, Part::Heading) => {}
                (Role::Note, _) => {
                    let note = self.note(node);
                    self.notes.push(note);
                    self.open_text = false;
                }
                (Role::Paragraph, Part::Whole) => {
                    let part = |part: Part| {
                        node.element_children()
                            .find(|c| self.classify(*c, Scope::ArticleBody).is(Role::Paragraph, part))
                    };
                    let raw_label = part(Part::Heading).map(node_text);
                    let body = part(Part::Body).unwrap_or(node);
                    self.paragraph(node, body, raw_label.as_deref());
                }
                (Role::Paragraph, Part::Body) => self.paragraph(node, node, None),
                (Role::Paragraph, _) => {
                    let label = classified.label.as_deref().map(normalize_label);
                    let id = self.ids.fresh(&format!("{}_par", self.article_id));
                    self.open_paragraph(Paragraph::new(id, "", label));
                }
                (Role::SubParagraph, Part::Whole) => {
                    let item = self.item(node);
                    self.place_item(item);
                }
                _ if self.has_structure(node) => {
                    let children: Vec<Node<'_>> = node.children().collect();
                    pending.extend(children.into_iter().rev());
                }
                _ => {
                    let text = node_text(node);
                    self.append_text(&text);
                }
            }
        }
    }

    /// Finish the article. `full_text` is composed from the stored
    /// paragraphs so it always matches them.
    pub fn finish(mut self, label: impl Into<String>) -> Article {
        for paragraph in &mut self.paragraphs {
            paragraph.text = normalize_whitespace(&paragraph.text);
        }
        Article {
            full_text: Article::compose_full_text(&self.paragraphs),
            id: self.article_id,
            label: label.into(),
            paragraphs: self.paragraphs,
            notes: self.notes,
        }
    }

    fn has_structure(&self, node: Node<'_>) -> bool {
        node.descendants()
            .skip(1)
            .any(|n| n.is_element() && self.classify(n, Scope::ArticleBody).role.is_structural())
    }

    fn append_text(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        match self.current.filter(|_| self.open_text) {
            Some(index) => {
                let paragraph = &mut self.paragraphs[index];
                if !paragraph.text.is_empty() {
                    paragraph.text.push(' ');
                }
                paragraph.text.push_str(text.trim());
            }
            None => {
                let id = self.ids.fresh(&format!("{}_par", self.article_id));
                self.open_paragraph(Paragraph::new(id, text.trim(), None));
            }
        }
    }

    fn open_paragraph(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
        self.current = Some(self.paragraphs.len() - 1);
        self.open_text = true;
    }

    fn note(&mut self, node: Node<'_>) -> Note {
        let id = self
            .ids
            .for_node(Some(node), &format!("{}_note", self.article_id));
        extract_note(node, id, self.warnings)
    }

    /// Whether a node inside a paragraph body is kept out of its text.
    fn excluded_from_paragraph_text(&self, node: Node<'_>) -> bool {
        let classified = self.classify(node, Scope::ParagraphBody);
        matches!(
            (classified.role, classified.part),
            (Role::Note | Role::NoteShortPlaceholder | Role::SubParagraph, _)
                | (Role::Paragraph, Part::Heading)
        )
    }

    /// Outermost descendants of `root` classified (in paragraph scope) as `role`.
    fn outermost<'t>(&self, root: Node<'t>, role: Role, stop: Role) -> Vec<Node<'t>> {
        let mut found = Vec::new();
        let mut stack: Vec<Node<'t>> = root.element_children().collect();
        stack.reverse();
        while let Some(node) = stack.pop() {
            let classified = self.classify(node, Scope::ParagraphBody);
            if classified.is(role, Part::Whole) {
                found.push(node);
                continue;
            }
            if classified.role == stop && classified.part == Part::Whole {
                continue;
            }
            let children: Vec<Node<'t>> = node.element_children().collect();
            stack.extend(children.into_iter().rev());
        }
        found
    }

    fn paragraph(&mut self, node: Node<'_>, body: Node<'_>, raw_label: Option<&str>) {
        let id = self
            .ids
            .for_node(Some(node), &format!("{}_par", self.article_id));
        let text = collect_text(body, |n| self.excluded_from_paragraph_text(n));

        // An explicit label span wins even when empty; only paragraphs
        // without one get their label from the text.
        let (label, text) = match raw_label {
            Some(raw) => (Some(normalize_label(raw)).filter(|l| !l.is_empty()), text),
            None => match split_leading_label(&text) {
                Some((raw, rest)) if !raw.ends_with(')') || is_paragraph_number(raw) => {
                    (Some(normalize_label(raw)), rest.to_string())
                }
                _ => (None, text.clone()),
            },
        };

        let mut paragraph = Paragraph::new(id, text, label);

        // Notes inside items are collected with their item below.
        for note_node in self.outermost(node, Role::Note, Role::SubParagraph) {
            let note = self.note(note_node);
            paragraph.notes.push(note);
        }
        for item_node in self.outermost(node, Role::SubParagraph, Role::Note) {
            let item = self.item(item_node);
            paragraph.notes.extend(item.notes);
            let sub_id = match item.id_node {
                Some(id) => self.ids.claim(&id),
                None => self.ids.fresh(&format!("{}_sub", paragraph.id)),
            };
            paragraph.subparagraphs.push(SubParagraph::new(
                sub_id,
                normalize_label(&item.raw_label),
                item.text,
            ));
        }

        self.open_paragraph(paragraph);
    }

    /// Read an item's label, text and notes.
    fn item(&mut self, node: Node<'_>) -> Item {
        let heading = node
            .element_children()
            .find(|c| self.classify(*c, Scope::ParagraphBody).is(Role::SubParagraph, Part::Heading));
        let body = node
            .element_children()
            .find(|c| self.classify(*c, Scope::ParagraphBody).is(Role::SubParagraph, Part::Body))
            .unwrap_or(node);

        let text = collect_text(body, |n| {
            let classified = self.classify(n, Scope::ParagraphBody);
            matches!(
                (classified.role, classified.part),
                (Role::Note | Role::NoteShortPlaceholder, _) | (Role::SubParagraph, Part::Heading)
            )
        });

        let (raw_label, text) = match heading.map(node_text) {
            Some(label) => (label, text),
            None => match split_leading_label(&text) {
                Some((raw, rest)) => (raw.to_string(), rest.to_string()),
                None => (String::new(), text.clone()),
            },
        };

        let notes = self
            .outermost(node, Role::Note, Role::Note)
            .into_iter()
            .map(|note_node| self.note(note_node))
            .collect();

        Item {
            id_node: node.element_id().map(str::to_string),
            raw_label,
            text,
            notes,
        }
    }

    /// Attach a body-level item.
    ///
    /// An item labelled `(N)` starts a new paragraph unless the current
    /// paragraph is unlabelled; other items are sub-paragraphs of the
    /// current paragraph. With no paragraph at all the item becomes an
    /// unlabelled paragraph.
    fn place_item(&mut self, item: Item) {
        let starts_paragraph = is_paragraph_number(&item.raw_label)
            && self
                .current
                .is_none_or(|index| self.paragraphs[index].label.is_some());

        match self.current {
            Some(index) if !starts_paragraph => {
                let sub_id = match &item.id_node {
                    Some(id) => self.ids.claim(id),
                    None => self.ids.fresh(&format!("{}_sub", self.paragraphs[index].id)),
                };
                let paragraph = &mut self.paragraphs[index];
                paragraph.subparagraphs.push(SubParagraph::new(
                    sub_id,
                    normalize_label(&item.raw_label),
                    item.text,
                ));
                paragraph.notes.extend(item.notes);
                self.open_text = false;
            }
            _ => {
                let id = match &item.id_node {
                    Some(id) => self.ids.claim(id),
                    None => self.ids.fresh(&format!("{}_par", self.article_id)),
                };
                let label = starts_paragraph.then(|| normalize_label(&item.raw_label));
                let mut paragraph = Paragraph::new(id, item.text, label);
                paragraph.notes = item.notes;
                self.open_paragraph(paragraph);
            }
        }
    }
}

/// Build an article from its content nodes.
///
/// # Examples
/// ```
/// use legis_harvester::article::build_article;
/// use legis_harvester::ids::IdAllocator;
/// use legis_harvester::markup::MarkupTree;
///
/// let tree = MarkupTree::parse(
///     r#"<span class="S_ART_BDY"><span class="S_ALN" id="p1"><span class="S_ALN_TTL">(1)</span><span class="S_ALN_BDY">Textul.</span></span></span>"#,
/// ).unwrap();
/// let body = tree.root_elements().next().unwrap();
/// let (mut ids, mut warnings) = (IdAllocator::new(), Vec::new());
///
/// let article = build_article("art1", "1", body.children(), &mut ids, &mut warnings);
/// assert_eq!(article.paragraphs[0].label.as_deref(), Some("1"));
/// assert_eq!(article.full_text, "Textul.");
/// ```
pub fn build_article<'t>(
    id: impl Into<String>,
    label: impl Into<String>,
    content: impl IntoIterator<Item = Node<'t>>,
    ids: &mut IdAllocator,
    warnings: &mut Vec<ParseWarning>,
) -> Article {
    let mut builder = ArticleBuilder::new(id, ids, warnings);
    for node in content {
        builder.push(node);
    }
    builder.finish(label)
}
