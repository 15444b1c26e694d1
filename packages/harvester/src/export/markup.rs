//! Portal-style markup rendering.
//!
//! Re-emits a [`DocumentModel`] with the same `S_*` class markers the portal
//! uses. Every element carries its final identifier, so parsing the output
//! with the same version id yields an equal model.

use crate::config::document_url;
use crate::history::{locate_current_slot, VersionLinks};
use crate::nesting::numeric_prefix;
use crate::types::{Annex, Article, Book, Chapter, DocumentModel, Note, Paragraph, Section, Title};

/// Escape text for element content and attribute values.
///
/// # Examples
/// ```
/// use legis_harvester::export::escape;
///
/// assert_eq!(escape(r#"a < b & "c""#), "a &lt; b &amp; &quot;c&quot;");
/// ```
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Container marker prefixes.
const BOOK: &str = "S_CRT";
const TITLE: &str = "S_TTL";
const CHAPTER: &str = "S_CAP";
const SECTION: &str = "S_SEC";
const SUBSECTION: &str = "S_SSEC";

/// What encloses a run of sibling sections.
#[derive(Clone, Copy)]
enum SectionParent<'a> {
    /// A book, title or chapter.
    Root,
    /// A section emitted as `S_SEC` with these numeric segments.
    Numbered(&'a [&'a str]),
    /// Any other section.
    Unnumbered,
}

#[derive(Default)]
struct MarkupWriter {
    out: String,
}

impl MarkupWriter {
    fn open(&mut self, class: &str, id: Option<&str>) {
        self.out.push_str("<span class=\"");
        self.out.push_str(class);
        self.out.push('"');
        if let Some(id) = id {
            self.out.push_str(" id=\"");
            self.out.push_str(&escape(id));
            self.out.push('"');
        }
        self.out.push('>');
    }

    fn close(&mut self) {
        self.out.push_str("</span>");
    }

    fn text(&mut self, text: &str) {
        self.out.push_str(&escape(text));
    }

    fn span(&mut self, class: &str, id: Option<&str>, text: &str) {
        self.open(class, id);
        self.text(text);
        self.close();
    }

    fn raw(&mut self, markup: &str) {
        self.out.push_str(markup);
    }

    fn head(&mut self, model: &DocumentModel) {
        let info = &model.document;
        self.raw("<head>");
        if let Some(title) = &info.title {
            self.raw("<title>");
            self.text(title);
            self.raw("</title>");
        }
        for (name, content) in [
            ("title", &info.title),
            ("description", &info.description),
            ("keywords", &info.keywords),
        ] {
            if let Some(content) = content {
                self.raw(&format!(
                    "<meta name=\"{name}\" content=\"{}\">",
                    escape(content)
                ));
            }
        }
        self.raw(&format!(
            "<link rel=\"canonical\" href=\"{}\">",
            escape(&document_url(&info.ver_id))
        ));
        self.raw("</head>");
    }

    fn history(&mut self, model: &DocumentModel) {
        let info = &model.document;
        let links = VersionLinks {
            prev_ver: info.prev_ver.clone(),
            next_ver: info.next_ver.clone(),
        };
        let slot = locate_current_slot(&info.history, &info.ver_id, &links);

        self.raw("<div id=\"istoric_fa\">");
        for (index, entry) in info.history.iter().enumerate() {
            if slot == Some(index) {
                self.raw("<a>Forma curentă</a>");
            }
            self.raw(&format!(
                "<a href=\"/Public/DetaliiDocument/{}\">{}</a>",
                escape(&entry.ver_id),
                escape(&entry.date)
            ));
        }
        if slot == Some(info.history.len()) {
            self.raw("<a>Forma curentă</a>");
        }
        self.raw("</div>");
    }

    /// Heading, description and the opening of the body span.
    fn open_container(&mut self, prefix: &str, id: &str, title: &str, description: Option<&str>) {
        self.span(&format!("{prefix}_TTL"), Some(id), title);
        if let Some(description) = description {
            self.span(&format!("{prefix}_DEN"), None, description);
        }
        self.open(&format!("{prefix}_BDY"), None);
    }

    fn book_content(&mut self, model: &DocumentModel, book: &Book) {
        self.articles(model, &book.articles);
        for title in &book.titles {
            self.title(model, title);
        }
        for chapter in &book.chapters {
            self.chapter(model, chapter);
        }
        self.sections(model, &book.sections, SectionParent::Root);
    }

    fn book(&mut self, model: &DocumentModel, book: &Book) {
        // The default book only exists in the model
        if book.synthetic {
            self.book_content(model, book);
            return;
        }
        self.open_container(BOOK, &book.id, &book.title, book.description.as_deref());
        self.book_content(model, book);
        self.close();
    }

    fn title(&mut self, model: &DocumentModel, title: &Title) {
        self.open_container(TITLE, &title.id, &title.title, title.description.as_deref());
        self.articles(model, &title.articles);
        for chapter in &title.chapters {
            self.chapter(model, chapter);
        }
        self.sections(model, &title.sections, SectionParent::Root);
        self.close();
    }

    fn chapter(&mut self, model: &DocumentModel, chapter: &Chapter) {
        self.open_container(
            CHAPTER,
            &chapter.id,
            &chapter.title,
            chapter.description.as_deref(),
        );
        self.articles(model, &chapter.articles);
        self.sections(model, &chapter.sections, SectionParent::Root);
        self.close();
    }

    /// Render sibling sections.
    ///
    /// A section is emitted as `S_SEC` only when its number alone puts it
    /// back in the same place at the same level; everything else becomes an
    /// `S_SSEC` of the enclosing section.
    fn sections(&mut self, model: &DocumentModel, sections: &[Section], parent: SectionParent<'_>) {
        for section in sections {
            let segments = numeric_prefix(&section.title);
            let numbered = match (&segments, parent) {
                (Some(segments), SectionParent::Numbered(parent)) => {
                    segments.len() == parent.len() + 1
                        && segments.starts_with(parent)
                        && section.level == segments.len()
                }
                (Some(segments), SectionParent::Root) => section.level == segments.len(),
                (None, SectionParent::Root) => section.level == 1,
                (_, SectionParent::Numbered(_) | SectionParent::Unnumbered) => false,
            };
            let prefix = if numbered { SECTION } else { SUBSECTION };

            self.open_container(prefix, &section.id, &section.title, section.description.as_deref());
            self.articles(model, &section.articles);
            let children = match segments.as_deref() {
                Some(segments) if numbered => SectionParent::Numbered(segments),
                _ => SectionParent::Unnumbered,
            };
            self.sections(model, &section.subsections, children);
            self.close();
        }
    }

    fn articles(&mut self, model: &DocumentModel, ids: &[String]) {
        for id in ids {
            match model.article(id) {
                Some(article) => self.article(article),
                None => tracing::debug!(article = %id, "Skipping reference to unknown article"),
            }
        }
    }

    fn article(&mut self, article: &Article) {
        self.open("S_ART", Some(&article.id));
        self.span("S_ART_TTL", None, &format!("Articolul {}", article.label));
        self.open("S_ART_BDY", None);
        for paragraph in &article.paragraphs {
            self.paragraph(paragraph);
        }
        self.notes(&article.notes);
        self.close();
        self.close();
    }

    fn paragraph(&mut self, paragraph: &Paragraph) {
        self.open("S_ALN", Some(&paragraph.id));
        // An empty label span keeps the body text from being read as a label
        let label = paragraph
            .label
            .as_deref()
            .map(|label| format!("({label})"))
            .unwrap_or_default();
        self.span("S_ALN_TTL", None, &label);

        self.open("S_ALN_BDY", None);
        self.text(&paragraph.text);
        self.notes(&paragraph.notes);
        for item in &paragraph.subparagraphs {
            self.open("S_LIT", Some(&item.id));
            let label = if item.label.is_empty() {
                String::new()
            } else {
                format!("{})", item.label)
            };
            self.span("S_LIT_TTL", None, &label);
            self.span("S_LIT_BDY", None, &item.text);
            self.close();
        }
        self.close();
        self.close();
    }

    fn notes(&mut self, notes: &[Note]) {
        for note in notes {
            self.open("S_NTA", Some(&note.id));
            self.span("S_NTA_PAR", None, &note.text);
            self.close();
        }
    }

    fn annex(&mut self, annex: &Annex) {
        self.open("S_ANX", Some(&annex.id));
        self.span("S_ANX_TTL", None, &annex.title);
        if let Some(description) = &annex.description {
            self.span("S_ANX_DEN", None, description);
        }
        self.open("S_ANX_BDY", None);
        self.text(&annex.text);
        self.notes(&annex.notes);
        self.close();
        self.close();
    }
}

/// Render a document model as portal-style markup.
///
/// Articles are emitted inside the container that references them, before
/// the container's child divisions. Annexes follow the book forest.
///
/// # Examples
/// ```
/// use legis_harvester::{export::render_markup, parse_version};
///
/// let html = r#"<html><body><span class="S_ART" id="a1"><span class="S_ART_TTL">Articolul 1</span>
///     <span class="S_ART_BDY">Textul articolului.</span></span></body></html>"#;
/// let parsed = parse_version(html, "7").unwrap();
///
/// let rendered = render_markup(&parsed.model);
/// assert_eq!(parse_version(&rendered, "7").unwrap().model, parsed.model);
/// ```
#[must_use]
pub fn render_markup(model: &DocumentModel) -> String {
    let mut writer = MarkupWriter::default();
    writer.raw("<html>");
    writer.head(model);
    writer.raw("<body>");
    writer.history(model);
    for book in &model.books {
        writer.book(model, book);
    }
    for annex in &model.annexes {
        writer.annex(annex);
    }
    writer.raw("</body></html>");
    writer.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::parse_version;
    use pretty_assertions::assert_eq;

    fn round_trip(html: &str) {
        let parsed = parse_version(html, "500").unwrap();
        let rendered = render_markup(&parsed.model);
        let reparsed = parse_version(&rendered, "500").unwrap();
        assert_eq!(reparsed.model, parsed.model);
    }

    #[test]
    fn test_escape_round_trips_through_parser() {
        round_trip(
            r#"<html><head><meta name="title" content="Lege &quot;x&quot; &amp; y"></head><body>
            <span class="S_ART" id="a1"><span class="S_ART_TTL">Articolul 1</span>
            <span class="S_ART_BDY">Dacă a &lt; b &amp; c, atunci...</span></span></body></html>"#,
        );
    }

    #[test]
    fn test_numbered_and_plain_sections_round_trip() {
        round_trip(
            r#"<html><body>
            <span class="S_CAP_TTL" id="c1">Capitolul I</span>
            <span class="S_SEC_TTL" id="s1">1. Generalități</span>
            <span class="S_ART" id="a1"><span class="S_ART_TTL">Articolul 1</span><span class="S_ART_BDY">Unu.</span></span>
            <span class="S_SEC_TTL" id="s11">1.1 Definiții</span>
            <span class="S_SSEC_TTL" id="ss1">Paragraf</span>
            <span class="S_ART" id="a2"><span class="S_ART_TTL">Articolul 2</span><span class="S_ART_BDY">Doi.</span></span>
            <span class="S_SEC_TTL" id="s3">3.2 Fără părinte</span>
            <span class="S_SEC_TTL" id="s4">Dispoziții finale</span>
            <span class="S_SSEC_TTL" id="ss2">Alte</span>
            </body></html>"#,
        );
    }

    #[test]
    fn test_unlisted_current_version_keeps_links() {
        let html = r#"<html><body><div id="istoric_fa">
            <a href="/Public/DetaliiDocument/900">01.01.2024</a>
            <a>curentă</a>
            <a href="/Public/DetaliiDocument/400">01.01.2020</a>
            </div></body></html>"#;
        let parsed = parse_version(html, "500").unwrap();
        assert_eq!(parsed.model.document.prev_ver.as_deref(), Some("400"));

        let rendered = render_markup(&parsed.model);
        assert!(rendered.contains("<a>Forma curentă</a>"));
        assert_eq!(parse_version(&rendered, "500").unwrap().model, parsed.model);
    }

    #[test]
    fn test_synthetic_book_is_not_wrapped() {
        let html = r#"<html><body><span class="S_ART" id="a1"><span class="S_ART_TTL">Articolul 1</span>
            <span class="S_ART_BDY">Text.</span></span></body></html>"#;
        let parsed = parse_version(html, "500").unwrap();
        assert!(parsed.model.books[0].synthetic);

        let rendered = render_markup(&parsed.model);
        assert!(!rendered.contains("S_CRT"));
    }
}
