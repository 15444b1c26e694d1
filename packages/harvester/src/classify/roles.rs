//! Structural roles assigned to markup nodes.

/// Structural role of a markup node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Book,
    Title,
    Chapter,
    Section,
    SubSection,
    Annex,
    Article,
    Paragraph,
    SubParagraph,
    Note,
    /// Ellipsis placeholder shown for collapsed items; never contributes text.
    NoteShortPlaceholder,
    HistoryEntry,
    Metadata,
    Unknown,
}

impl Role {
    /// Whether the role is a hierarchy container (book down to subsection).
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Role::Book | Role::Title | Role::Chapter | Role::Section | Role::SubSection
        )
    }

    /// Whether nodes with this role carry document structure that text
    /// collection must not swallow.
    #[must_use]
    pub fn is_structural(self) -> bool {
        !matches!(self, Role::Unknown | Role::Metadata)
    }
}

/// Which part of a role's markup a node represents.
///
/// The portal splits most structures into a heading span (`_TTL`), an
/// optional description span (`_DEN`) and a body span (`_BDY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    /// The node wraps the whole structure (e.g. `S_ART`).
    Whole,
    Heading,
    Description,
    Body,
}

/// Context a node is classified in.
///
/// The same marker means different things depending on where it appears:
/// `S_PAR` is a paragraph inside an article body but an amendment note
/// inside a paragraph body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    #[default]
    Document,
    ArticleBody,
    ParagraphBody,
    History,
}

/// Result of classifying a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub role: Role,
    pub part: Part,

    /// Raw label text (heading text, article marker, item label).
    pub label: Option<String>,
}

impl Classified {
    /// Create a classification without a label.
    #[must_use]
    pub fn new(role: Role, part: Part) -> Self {
        Self {
            role,
            part,
            label: None,
        }
    }

    /// The classification for anything the registry does not know.
    #[must_use]
    pub fn unknown() -> Self {
        Self::new(Role::Unknown, Part::Whole)
    }

    /// Attach a label, ignoring empty strings.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.label = (!label.is_empty()).then_some(label);
        self
    }

    /// Check role and part at once.
    #[must_use]
    pub fn is(&self, role: Role, part: Part) -> bool {
        self.role == role && self.part == part
    }
}
