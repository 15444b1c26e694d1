//! Document assembly.
//!
//! Walks the markup once, in document order, with an explicit stack of
//! sibling sequences instead of recursion. Container headings open entries
//! on the container path, body spans are associated with the container they
//! belong to and close it when left, and every article is attached to the
//! innermost open container. Containers and articles left without a book
//! are gathered into one synthetic default book at the end.

use crate::annex::{build_annex, AnnexParts};
use crate::article::build_article;
use crate::classify::{portal_registry, Classified, MarkerRegistry, Part, Role, Scope};
use crate::config::{document_url, validate_ver_id};
use crate::error::{HarvesterError, ParseWarning, Result};
use crate::history::{extract_history, resolve_links};
use crate::ids::IdAllocator;
use crate::markup::{MarkupTree, Node};
use crate::metadata::{extract_metadata, resolve_ver_id};
use crate::nesting::SectionNester;
use crate::types::{
    Annex, Article, Book, Chapter, DocumentInfo, DocumentModel, Parsed, Section, Title,
};

/// Identifier of the synthetic book that roots orphaned content.
pub const DEFAULT_BOOK_ID: &str = "default_book";

/// Depth of a container role on the container path.
fn tier(role: Role) -> usize {
    match role {
        Role::Book => 0,
        Role::Title => 1,
        Role::Chapter => 2,
        _ => 3,
    }
}

fn id_prefix(role: Role) -> &'static str {
    match role {
        Role::Book => "book",
        Role::Title => "title",
        Role::Chapter => "chapter",
        Role::SubSection => "subsection",
        _ => "section",
    }
}

/// A container under construction.
#[derive(Debug)]
struct ContainerDraft {
    role: Role,
    id: String,
    title: String,
    description: Option<String>,
    level: usize,
    has_body: bool,
    articles: Vec<String>,
    children: Vec<usize>,
}

/// Something with no enclosing container, in document order.
#[derive(Debug, Clone, Copy)]
enum Root {
    Container(usize),
    Article(usize),
}

/// A sibling sequence being walked.
struct Frame<'t> {
    siblings: Vec<Node<'t>>,
    index: usize,

    /// Container closed when this sequence is exhausted.
    closes: Option<usize>,
}

impl<'t> Frame<'t> {
    fn new(parent: Node<'t>, closes: Option<usize>) -> Self {
        Self {
            siblings: parent.children().collect(),
            index: 0,
            closes,
        }
    }
}

struct Assembler {
    registry: &'static MarkerRegistry,
    ids: IdAllocator,
    warnings: Vec<ParseWarning>,
    drafts: Vec<ContainerDraft>,
    roots: Vec<Root>,
    path: Vec<usize>,
    nester: SectionNester<usize>,
    articles: Vec<Article>,
    annexes: Vec<Annex>,
}

impl Assembler {
    fn new() -> Self {
        Self {
            registry: portal_registry(),
            ids: IdAllocator::new(),
            warnings: Vec::new(),
            drafts: Vec::new(),
            roots: Vec::new(),
            path: Vec::new(),
            nester: SectionNester::new(),
            articles: Vec::new(),
            annexes: Vec::new(),
        }
    }

    fn classify(&self, node: Node<'_>) -> Classified {
        self.registry.classify(node, Scope::Document)
    }

    /// Walk every top-level node of the document.
    fn walk(&mut self, tree: &MarkupTree) {
        let mut frames = vec![Frame {
            siblings: tree.roots().collect(),
            index: 0,
            closes: None,
        }];

        while let Some(frame) = frames.last_mut() {
            let Some(&node) = frame.siblings.get(frame.index) else {
                if let Some(closed) = frame.closes {
                    self.close(closed);
                }
                frames.pop();
                continue;
            };
            frame.index += 1;

            if !node.is_element() || self.registry.should_skip(node.tag_name()) {
                continue;
            }

            let classified = self.classify(node);
            match (classified.role, classified.part) {
                (Role::Metadata | Role::HistoryEntry, _) => {}
                (role, Part::Heading) if role.is_container() => {
                    self.open(role, Some(node), classified.label.unwrap_or_default());
                }
                (role, Part::Description) if role.is_container() => {
                    self.describe(role, classified.label);
                }
                (role, Part::Body) if role.is_container() => {
                    let index = self.enter_body(role, node);
                    frames.push(Frame::new(node, Some(index)));
                }
                (Role::Article, Part::Whole) => {
                    let body = node.element_children().find(|c| {
                        self.registry
                            .classify(*c, Scope::Document)
                            .is(Role::Article, Part::Body)
                    });
                    let content: Vec<Node<'_>> = match body {
                        Some(body) => body.children().collect(),
                        None => node.children().collect(),
                    };
                    let label = classified.label.unwrap_or_default();
                    self.article(node.element_id(), label, content);
                }
                (Role::Article, Part::Heading) => {
                    let content = self.take_article_content(frame);
                    let label = classified.label.unwrap_or_default();
                    self.article(node.element_id(), label, content);
                }
                (Role::Article, Part::Body) => {
                    self.article(node.element_id(), String::new(), node.children().collect());
                }
                (Role::Annex, Part::Whole) => {
                    self.annex(node.element_id(), AnnexParts::from_wrapper(node));
                }
                (Role::Annex, Part::Heading) => {
                    let parts = self.take_annex_parts(node, frame);
                    self.annex(node.element_id(), parts);
                }
                (Role::Annex, Part::Body) => {
                    let parts = AnnexParts {
                        body: Some(node),
                        ..AnnexParts::default()
                    };
                    self.annex(node.element_id(), parts);
                }
                (Role::Paragraph | Role::SubParagraph | Role::Note, _) => {
                    tracing::debug!(
                        role = ?classified.role,
                        id = node.element_id().unwrap_or_default(),
                        "Ignoring content outside of any article"
                    );
                }
                _ => frames.push(Frame::new(node, None)),
            }
        }
    }

    /// Open a container from its heading (or body, when no heading exists).
    fn open(&mut self, role: Role, heading: Option<Node<'_>>, title: String) -> usize {
        self.open_with_id(role, heading.and_then(|h| h.element_id()), title)
    }

    fn open_with_id(&mut self, role: Role, source_id: Option<&str>, title: String) -> usize {
        let index = self.drafts.len();
        let tier = tier(role);

        let (level, parent) = match role {
            Role::Section | Role::SubSection => {
                let placement = if role == Role::Section {
                    self.nester.place(index, &title)
                } else {
                    let enclosing = self.innermost_section();
                    self.nester.place_subsection(index, enclosing.as_ref())
                };
                self.warnings.extend(placement.anomaly);
                // The parent section may have left the path when its body closed
                match placement.parent.and_then(|p| self.path.iter().position(|&open| open == p)) {
                    Some(pos) => self.path.truncate(pos + 1),
                    None => self.truncate_path_below(tier),
                }
                (placement.level, placement.parent.or_else(|| self.path.last().copied()))
            }
            _ => {
                self.nester.reset();
                self.truncate_path_below(tier);
                (0, self.path.last().copied())
            }
        };

        let id = self.ids.first_of([source_id], id_prefix(role));
        self.drafts.push(ContainerDraft {
            role,
            id,
            title,
            description: None,
            level,
            has_body: false,
            articles: Vec::new(),
            children: Vec::new(),
        });

        match parent {
            Some(parent) => self.drafts[parent].children.push(index),
            None => self.roots.push(Root::Container(index)),
        }
        self.path.push(index);
        index
    }

    /// Innermost section or subsection on the container path.
    fn innermost_section(&self) -> Option<usize> {
        self.path
            .iter()
            .rev()
            .copied()
            .find(|&open| matches!(self.drafts[open].role, Role::Section | Role::SubSection))
    }

    fn truncate_path_below(&mut self, tier_limit: usize) {
        while self
            .path
            .last()
            .is_some_and(|&open| tier(self.drafts[open].role) >= tier_limit)
        {
            self.path.pop();
        }
    }

    /// Most recent open container of a role, optionally only one still
    /// waiting for its body.
    fn latest_open(&self, role: Role, without_body: bool) -> Option<usize> {
        self.path
            .iter()
            .rev()
            .copied()
            .find(|&open| self.drafts[open].role == role && !(without_body && self.drafts[open].has_body))
    }

    fn describe(&mut self, role: Role, description: Option<String>) {
        match self.latest_open(role, false) {
            Some(open) => self.drafts[open].description = description,
            None => tracing::debug!(?role, "Description without an open container"),
        }
    }

    /// Associate a body span with its container, opening one if needed.
    fn enter_body(&mut self, role: Role, body: Node<'_>) -> usize {
        let index = match self.latest_open(role, true) {
            Some(open) => {
                if let Some(pos) = self.path.iter().position(|&p| p == open) {
                    self.path.truncate(pos + 1);
                }
                open
            }
            None => self.open_with_id(role, body.element_id(), String::new()),
        };
        self.drafts[index].has_body = true;
        index
    }

    /// Leaving a body closes its container and everything opened inside it.
    ///
    /// Sections stay open in the nester: their numbered headings are
    /// siblings of the body, so `1.1` after the body of `1` still nests
    /// under it.
    fn close(&mut self, index: usize) {
        if let Some(pos) = self.path.iter().position(|&open| open == index) {
            self.path.truncate(pos);
        }
        if tier(self.drafts[index].role) < tier(Role::Section) {
            self.nester.reset();
        }
    }

    /// Siblings that belong to a bare article heading: everything up to the
    /// next container, article or annex marker.
    fn take_article_content<'t>(&self, frame: &mut Frame<'t>) -> Vec<Node<'t>> {
        let start = frame.index;
        while let Some(&next) = frame.siblings.get(frame.index) {
            if next.is_element() {
                let classified = self.classify(next);
                let ends = classified.role.is_container()
                    || classified.role == Role::Annex
                    || classified.is(Role::Article, Part::Whole)
                    || classified.is(Role::Article, Part::Heading)
                    || classified.is(Role::HistoryEntry, Part::Body);
                if ends {
                    break;
                }
            }
            frame.index += 1;
        }
        frame.siblings[start..frame.index].to_vec()
    }

    /// Description and body spans directly following a bare annex heading.
    fn take_annex_parts<'t>(&self, heading: Node<'t>, frame: &mut Frame<'t>) -> AnnexParts<'t> {
        let mut parts = AnnexParts {
            heading: Some(heading),
            ..AnnexParts::default()
        };
        while let Some(&next) = frame.siblings.get(frame.index) {
            if next.is_text() && next.text().is_some_and(|t| t.trim().is_empty()) {
                frame.index += 1;
                continue;
            }
            let classified = self.classify(next);
            match (classified.role, classified.part) {
                (Role::Annex, Part::Description) if parts.description.is_none() && parts.body.is_none() => {
                    parts.description = Some(next);
                }
                (Role::Annex, Part::Body) if parts.body.is_none() => parts.body = Some(next),
                _ => break,
            }
            frame.index += 1;
        }
        parts
    }

    fn article(&mut self, source_id: Option<&str>, label: String, content: Vec<Node<'_>>) {
        let id = self.ids.first_of([source_id], "art");
        let article = build_article(id, label, content, &mut self.ids, &mut self.warnings);

        match self.path.last() {
            Some(&open) => self.drafts[open].articles.push(article.id.clone()),
            None => self.roots.push(Root::Article(self.articles.len())),
        }
        self.articles.push(article);
    }

    fn annex(&mut self, source_id: Option<&str>, parts: AnnexParts<'_>) {
        let id = self.ids.first_of([source_id], "annex");
        let annex = build_annex(id, parts, &mut self.ids, &mut self.warnings);
        self.annexes.push(annex);
    }

    /// Turn the drafts into the owned book forest.
    fn into_books(mut self) -> (Vec<Book>, Vec<Article>, Vec<Annex>, Vec<ParseWarning>) {
        let mut built: Vec<Option<Built>> = Vec::with_capacity(self.drafts.len());
        built.resize_with(self.drafts.len(), || None);

        // Children are always created after their parent
        for index in (0..self.drafts.len()).rev() {
            let draft = &mut self.drafts[index];
            let mut node = Built::from_draft(draft);
            for &child in &draft.children {
                if let Some(child) = built[child].take() {
                    node.adopt(child);
                }
            }
            built[index] = Some(node);
        }

        let mut books = Vec::new();
        let mut default_book: Option<Book> = None;
        let mut default_position = 0;

        for root in std::mem::take(&mut self.roots) {
            let orphan = match root {
                Root::Container(index) => match built[index].take() {
                    Some(Built::Book(book)) => {
                        books.push(book);
                        continue;
                    }
                    Some(container) => Orphan::Container(container),
                    None => continue,
                },
                Root::Article(index) => match self.articles.get(index) {
                    Some(article) => Orphan::Article(article.id.clone()),
                    None => continue,
                },
            };

            let book = default_book.get_or_insert_with(|| {
                default_position = books.len();
                synthetic_book(self.ids.claim(DEFAULT_BOOK_ID))
            });
            match orphan {
                Orphan::Article(id) => book.articles.push(id),
                Orphan::Container(container) => attach_to_book(book, container),
            }
        }

        if let Some(book) = default_book {
            books.insert(default_position, book);
        }

        (books, self.articles, self.annexes, self.warnings)
    }
}

/// A finished container.
enum Built {
    Book(Book),
    Title(Title),
    Chapter(Chapter),
    Section(Section),
}

impl Built {
    fn from_draft(draft: &mut ContainerDraft) -> Self {
        let id = std::mem::take(&mut draft.id);
        let title = std::mem::take(&mut draft.title);
        let description = draft.description.take();
        let articles = std::mem::take(&mut draft.articles);
        match draft.role {
            Role::Book => Built::Book(Book {
                id,
                title,
                description,
                synthetic: false,
                titles: Vec::new(),
                chapters: Vec::new(),
                sections: Vec::new(),
                articles,
            }),
            Role::Title => Built::Title(Title {
                id,
                title,
                description,
                chapters: Vec::new(),
                sections: Vec::new(),
                articles,
            }),
            Role::Chapter => Built::Chapter(Chapter {
                id,
                title,
                description,
                sections: Vec::new(),
                articles,
            }),
            _ => Built::Section(Section {
                id,
                title,
                description,
                level: draft.level,
                subsections: Vec::new(),
                articles,
            }),
        }
    }

    /// Attach a child container. Parents always sit on a shallower tier.
    fn adopt(&mut self, child: Built) {
        match (self, child) {
            (Built::Book(book), child) => attach_to_book(book, child),
            (Built::Title(title), Built::Chapter(chapter)) => title.chapters.push(chapter),
            (Built::Title(title), Built::Section(section)) => title.sections.push(section),
            (Built::Chapter(chapter), Built::Section(section)) => chapter.sections.push(section),
            (Built::Section(parent), Built::Section(section)) => parent.subsections.push(section),
            (_, child) => tracing::debug!(
                child = child.id(),
                "Dropping container that cannot nest under its parent"
            ),
        }
    }

    fn id(&self) -> &str {
        match self {
            Built::Book(b) => &b.id,
            Built::Title(t) => &t.id,
            Built::Chapter(c) => &c.id,
            Built::Section(s) => &s.id,
        }
    }
}

/// Content without an enclosing book.
enum Orphan {
    Container(Built),
    Article(String),
}

fn synthetic_book(id: String) -> Book {
    Book {
        id,
        title: String::new(),
        description: None,
        synthetic: true,
        titles: Vec::new(),
        chapters: Vec::new(),
        sections: Vec::new(),
        articles: Vec::new(),
    }
}

fn attach_to_book(book: &mut Book, child: Built) {
    match child {
        Built::Title(title) => book.titles.push(title),
        Built::Chapter(chapter) => book.chapters.push(chapter),
        Built::Section(section) => book.sections.push(section),
        Built::Book(nested) => tracing::debug!(
            book = %book.id,
            nested = %nested.id,
            "Dropping book nested inside another book"
        ),
    }
}

/// Parse a document, resolving its version identifier from the markup.
///
/// # Errors
/// Returns `MalformedMarkup` when the markup has no elements or no
/// resolvable version identifier.
pub fn parse(markup: &str) -> Result<Parsed> {
    let tree = MarkupTree::parse(markup)?;
    let ver_id = resolve_ver_id(&tree).ok_or_else(|| {
        HarvesterError::MalformedMarkup("no document version identifier found".to_string())
    })?;
    Ok(assemble(&tree, &ver_id))
}

/// Parse a document whose version identifier is known.
///
/// # Errors
/// Returns `InvalidVersionId` for a non-numeric identifier and
/// `MalformedMarkup` when the markup has no elements.
pub fn parse_version(markup: &str, ver_id: &str) -> Result<Parsed> {
    validate_ver_id(ver_id)?;
    let tree = MarkupTree::parse(markup)?;
    Ok(assemble(&tree, ver_id))
}

/// Assemble the document model from a parsed tree.
pub fn assemble(tree: &MarkupTree, ver_id: &str) -> Parsed {
    let metadata = extract_metadata(tree);
    let history = extract_history(tree);

    let mut assembler = Assembler::new();
    let links = resolve_links(&history, ver_id, &mut assembler.warnings);
    assembler.walk(tree);
    let (books, articles, annexes, warnings) = assembler.into_books();

    tracing::debug!(
        ver_id,
        books = books.len(),
        articles = articles.len(),
        annexes = annexes.len(),
        warnings = warnings.len(),
        "Assembled document"
    );

    Parsed {
        model: DocumentModel {
            document: DocumentInfo {
                source: document_url(ver_id),
                ver_id: ver_id.to_string(),
                title: metadata.title,
                description: metadata.description,
                keywords: metadata.keywords,
                history: history.entries,
                prev_ver: links.prev_ver,
                next_ver: links.next_ver,
            },
            books,
            articles,
            annexes,
        },
        warnings,
    }
}
