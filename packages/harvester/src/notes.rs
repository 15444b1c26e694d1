//! Amendment note extraction.
//!
//! Notes are free-form sentences such as
//! "Litera a) a fost modificată de pct. 1 al art. I din LEGEA nr. 5 din 7 ianuarie 2020,
//! publicată în MONITORUL OFICIAL nr. 12 din 8 ianuarie 2020." Each field is
//! matched independently; anything not found stays `None`.

use regex::Regex;
use std::sync::LazyLock;

use crate::classify::{portal_registry, Part, Role, Scope};
use crate::error::ParseWarning;
use crate::markup::{collect_text, Node};
use crate::types::Note;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bla (\d{2}[.-]\d{2}[.-]\d{4})").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SUBJECT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*(.*?)\s+a fost").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LAW_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)LEGEA nr\.\s*(\d+)\s+din\s+([0-9]{1,2} [a-zăâîșțşţ]+ [0-9]{4})")
        .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static MONITOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)MONITORUL OFICIAL nr\.\s*(\d+)\s+din\s+([0-9]{1,2} [a-zăâîșțşţ]+ [0-9]{4})")
        .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static REPLACEMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)înlocuirea sintagmei\s*["„“]([^"”“]+)["”“]\s*cu sintagma\s*["„“]([^"”“]+)["”“]"#,
    )
    .expect("valid regex")
});

/// Parse the structured fields of a note's text.
///
/// # Examples
/// ```
/// use legis_harvester::notes::parse_note;
///
/// let note = parse_note(
///     "n1",
///     "La 01.02.2020, Articolul 3 a fost modificat de LEGEA nr. 10 din 20 ianuarie 2020.",
/// );
/// assert_eq!(note.date.as_deref(), Some("01.02.2020"));
/// assert_eq!(note.subject.as_deref(), Some("Articolul 3"));
/// assert_eq!(note.law_number.as_deref(), Some("10"));
/// assert_eq!(note.monitor_number, None);
/// ```
pub fn parse_note(id: impl Into<String>, text: impl Into<String>) -> Note {
    let text = text.into();
    let mut note = Note::text_only(id, text.clone());

    let date = DATE_PATTERN.captures(&text);
    note.date = date.as_ref().map(|caps| caps[1].to_string());

    if note.date.is_some() {
        note.subject = SUBJECT_PATTERN
            .captures(&text)
            .map(|caps| caps[1].trim().to_string())
            .filter(|subject| !subject.is_empty());
    }

    if let Some(caps) = LAW_PATTERN.captures(&text) {
        note.law_number = Some(caps[1].to_string());
        note.law_date = Some(caps[2].to_string());
    }

    if let Some(caps) = MONITOR_PATTERN.captures(&text) {
        note.monitor_number = Some(caps[1].to_string());
        note.monitor_date = Some(caps[2].to_string());
    }

    if let Some(caps) = REPLACEMENT_PATTERN.captures(&text) {
        note.replaced = Some(caps[1].to_string());
        note.replacement = Some(caps[2].to_string());
    }

    note
}

/// Whether a note carries none of the amendment references.
fn is_unrecognized(note: &Note) -> bool {
    note.date.is_none() && note.law_number.is_none() && note.monitor_number.is_none()
}

/// Extract a note from its markup node.
///
/// The note heading (`S_NTA_TTL`) is excluded from the text. A note with no
/// recognizable date, law or monitor reference is kept with text only and
/// reported as [`ParseWarning::UnrecognizedNoteFormat`].
pub fn extract_note(node: Node<'_>, id: String, warnings: &mut Vec<ParseWarning>) -> Note {
    let registry = portal_registry();
    let text = collect_text(node, |n| {
        n.classes()
            .any(|class| registry.lookup(class, Scope::ArticleBody) == Some((Role::Note, Part::Heading)))
    });

    let note = parse_note(id, text);
    if is_unrecognized(&note) {
        tracing::warn!(note_id = %note.id, "Note has no recognizable amendment reference");
        warnings.push(ParseWarning::UnrecognizedNoteFormat {
            note_id: note.id.clone(),
        });
    }
    note
}
