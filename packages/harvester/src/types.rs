//! Core data types for the harvester.
//!
//! These types form the document model produced by [`crate::parse`]: a forest
//! of books, titles, chapters and sections that reference articles by
//! identifier, plus the flat list that owns every article.

use serde::{Deserialize, Serialize};

use crate::error::ParseWarning;

/// One entry of the consolidation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Version identifier of the earlier consolidation.
    pub ver_id: String,

    /// Consolidation date as printed by the portal (DD.MM.YYYY).
    pub date: String,
}

impl HistoryEntry {
    /// Create a new history entry.
    #[must_use]
    pub fn new(ver_id: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            ver_id: ver_id.into(),
            date: date.into(),
        }
    }
}

/// Metadata about the parsed document version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Portal URL of this version.
    pub source: String,

    /// Version identifier.
    pub ver_id: String,

    /// Title from `<meta name="title">` or `<title>`.
    pub title: Option<String>,

    /// Description from `<meta name="description">`.
    pub description: Option<String>,

    /// Keywords from `<meta name="keywords">`.
    pub keywords: Option<String>,

    /// Earlier versions in source order.
    pub history: Vec<HistoryEntry>,

    /// Identifier of the previous (older) version, if resolvable.
    pub prev_ver: Option<String>,

    /// Identifier of the next (newer) version, if resolvable.
    pub next_ver: Option<String>,
}

/// Top-level division of a code ("Cartea I").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub description: Option<String>,

    /// `true` for the default book generated to root orphaned content.
    pub synthetic: bool,

    pub titles: Vec<Title>,
    pub chapters: Vec<Chapter>,
    pub sections: Vec<Section>,

    /// Identifiers of articles directly under the book.
    pub articles: Vec<String>,
}

/// Title division ("Titlul II").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub chapters: Vec<Chapter>,
    pub sections: Vec<Section>,
    pub articles: Vec<String>,
}

/// Chapter division ("Capitolul III").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub sections: Vec<Section>,
    pub articles: Vec<String>,
}

/// Section or subsection. Sections nest to arbitrary depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub description: Option<String>,

    /// Depth of the section; root sections have level 1.
    pub level: usize,

    pub subsections: Vec<Section>,
    pub articles: Vec<String>,
}

/// A single article. Owned exclusively by [`DocumentModel::articles`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,

    /// Article marker without the "Articolul" prefix (e.g. "5", "unic").
    pub label: String,

    /// Paragraph and sub-paragraph text joined in document order.
    pub full_text: String,

    pub paragraphs: Vec<Paragraph>,

    /// Notes attached to the article rather than to a paragraph.
    pub notes: Vec<Note>,
}

impl Article {
    /// Join paragraph and sub-paragraph text in document order.
    ///
    /// Empty segments are skipped so the result never contains doubled
    /// separators.
    ///
    /// # Examples
    /// ```
    /// use legis_harvester::types::{Article, Paragraph, SubParagraph};
    ///
    /// let mut paragraph = Paragraph::new("p1", "Intro:", Some("1".to_string()));
    /// paragraph.subparagraphs.push(SubParagraph::new("s1", "a", "first;"));
    /// assert_eq!(Article::compose_full_text(&[paragraph]), "Intro: first;");
    /// ```
    #[must_use]
    pub fn compose_full_text(paragraphs: &[Paragraph]) -> String {
        paragraphs
            .iter()
            .flat_map(|p| {
                std::iter::once(p.text.as_str())
                    .chain(p.subparagraphs.iter().map(|s| s.text.as_str()))
            })
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Paragraph ("alineat") of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub id: String,
    pub text: String,

    /// Normalized number of an explicitly numbered paragraph ("1" for "(1)").
    pub label: Option<String>,

    pub subparagraphs: Vec<SubParagraph>,
    pub notes: Vec<Note>,
}

impl Paragraph {
    /// Create a paragraph without sub-paragraphs or notes.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>, label: Option<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            label,
            subparagraphs: Vec::new(),
            notes: Vec::new(),
        }
    }
}

/// Lettered or numbered item of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubParagraph {
    pub id: String,
    pub label: String,
    pub text: String,
}

impl SubParagraph {
    /// Create a new sub-paragraph.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Amendment note with the fields recognized in its text.
///
/// Every field that could not be found is `None`; nothing is inferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub text: String,
    pub date: Option<String>,
    pub subject: Option<String>,
    pub law_number: Option<String>,
    pub law_date: Option<String>,
    pub monitor_number: Option<String>,
    pub monitor_date: Option<String>,
    pub replaced: Option<String>,
    pub replacement: Option<String>,
}

impl Note {
    /// Create a note carrying only its text.
    #[must_use]
    pub fn text_only(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            date: None,
            subject: None,
            law_number: None,
            law_date: None,
            monitor_number: None,
            monitor_date: None,
            replaced: None,
            replacement: None,
        }
    }

    /// Whether any structured field was recognized.
    #[must_use]
    pub fn has_structured_fields(&self) -> bool {
        [
            &self.date,
            &self.subject,
            &self.law_number,
            &self.law_date,
            &self.monitor_number,
            &self.monitor_date,
            &self.replaced,
            &self.replacement,
        ]
        .iter()
        .any(|field| field.is_some())
    }
}

/// Annex ("Anexa") attached to the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annex {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub text: String,
    pub notes: Vec<Note>,
}

/// Complete parsed document version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentModel {
    pub document: DocumentInfo,
    pub books: Vec<Book>,
    pub articles: Vec<Article>,
    pub annexes: Vec<Annex>,
}

impl DocumentModel {
    /// Look up an article by identifier.
    #[must_use]
    pub fn article(&self, id: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }

    /// All sections and subsections of the forest, in pre-order.
    #[must_use]
    pub fn sections(&self) -> Vec<&Section> {
        let mut roots: Vec<&Section> = Vec::new();
        for book in &self.books {
            roots.extend(&book.sections);
            for chapter in &book.chapters {
                roots.extend(&chapter.sections);
            }
            for title in &book.titles {
                roots.extend(&title.sections);
                for chapter in &title.chapters {
                    roots.extend(&chapter.sections);
                }
            }
        }

        let mut out = Vec::new();
        let mut stack: Vec<&Section> = roots.into_iter().rev().collect();
        while let Some(section) = stack.pop() {
            out.push(section);
            stack.extend(section.subsections.iter().rev());
        }
        out
    }

    /// Every article identifier referenced by a container of the forest.
    #[must_use]
    pub fn referenced_article_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for book in &self.books {
            ids.extend(book.articles.iter().map(String::as_str));
            for title in &book.titles {
                ids.extend(title.articles.iter().map(String::as_str));
                for chapter in &title.chapters {
                    ids.extend(chapter.articles.iter().map(String::as_str));
                }
            }
            for chapter in &book.chapters {
                ids.extend(chapter.articles.iter().map(String::as_str));
            }
        }
        for section in self.sections() {
            ids.extend(section.articles.iter().map(String::as_str));
        }
        ids
    }
}

/// Result of a parse: the model plus recoverable anomalies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parsed {
    pub model: DocumentModel,
    pub warnings: Vec<ParseWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: &str, level: usize, subsections: Vec<Section>) -> Section {
        Section {
            id: id.to_string(),
            title: id.to_string(),
            description: None,
            level,
            subsections,
            articles: vec![format!("art_{id}")],
        }
    }

    fn model_with_sections(sections: Vec<Section>) -> DocumentModel {
        DocumentModel {
            document: DocumentInfo {
                source: String::new(),
                ver_id: "1".to_string(),
                title: None,
                description: None,
                keywords: None,
                history: Vec::new(),
                prev_ver: None,
                next_ver: None,
            },
            books: vec![Book {
                id: "b".to_string(),
                title: "Cartea I".to_string(),
                description: None,
                synthetic: false,
                titles: Vec::new(),
                chapters: Vec::new(),
                sections,
                articles: vec!["art_b".to_string()],
            }],
            articles: Vec::new(),
            annexes: Vec::new(),
        }
    }

    #[test]
    fn test_compose_full_text_skips_empty_segments() {
        let mut first = Paragraph::new("p1", "", Some("1".to_string()));
        first.subparagraphs.push(SubParagraph::new("s1", "a", "alpha;"));
        let second = Paragraph::new("p2", "Closing.", None);

        assert_eq!(
            Article::compose_full_text(&[first, second]),
            "alpha; Closing."
        );
    }

    #[test]
    fn test_sections_pre_order() {
        let model = model_with_sections(vec![
            section("1", 1, vec![section("1.1", 2, Vec::new())]),
            section("2", 1, Vec::new()),
        ]);

        let ids: Vec<&str> = model.sections().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "1.1", "2"]);
    }

    #[test]
    fn test_referenced_article_ids() {
        let model = model_with_sections(vec![section("1", 1, vec![section("1.1", 2, Vec::new())])]);

        assert_eq!(
            model.referenced_article_ids(),
            vec!["art_b", "art_1", "art_1.1"]
        );
    }

    #[test]
    fn test_note_text_only_has_no_fields() {
        let note = Note::text_only("n1", "Some note.");
        assert!(!note.has_structured_fields());

        let json = serde_json::to_value(&note).unwrap();
        assert!(json["law_number"].is_null());
        assert!(json.as_object().unwrap().contains_key("law_number"));
    }
}
