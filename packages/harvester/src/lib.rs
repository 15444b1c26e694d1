//! Legis Harvester - Convert consolidated Romanian legislation into a typed
//! document model.
//!
//! This crate parses the HTML pages of legislatie.just.ro into a hierarchy of
//! books, titles, chapters, sections and articles, with paragraphs,
//! amendment notes, annexes and the consolidation history of the version.
//!
//! # Example
//!
//! ```
//! use legis_harvester::parse_version;
//!
//! let html = r#"<html><body>
//!     <span class="S_CAP_TTL" id="cap1">Capitolul I</span>
//!     <span class="S_ART" id="art1">
//!         <span class="S_ART_TTL">Articolul 1</span>
//!         <span class="S_ART_BDY"><span class="S_ALN" id="aln1">
//!             <span class="S_ALN_TTL">(1)</span>
//!             <span class="S_ALN_BDY">Prezenta lege reglementează...</span>
//!         </span></span>
//!     </span>
//! </body></html>"#;
//!
//! let parsed = parse_version(html, "109884").unwrap();
//! let article = parsed.model.article("art1").unwrap();
//! assert_eq!(article.label, "1");
//! assert_eq!(article.paragraphs[0].label.as_deref(), Some("1"));
//! assert_eq!(parsed.model.books[0].chapters[0].articles, vec!["art1"]);
//! ```
//!
//! # Architecture
//!
//! The harvester is organized into several modules:
//!
//! - [`markup`]: Owned markup tree and text extraction
//! - [`classify`]: Marker registry and label classification
//! - [`nesting`]: Numeric section nesting
//! - [`article`]: Article and paragraph building
//! - [`notes`]: Amendment note parsing
//! - [`history`]: Consolidation history extraction
//! - [`metadata`]: Document title, description and version id
//! - [`annex`]: Annex extraction
//! - [`assembler`]: Document assembly and the parse entry points
//! - [`ids`]: Identifier allocation
//! - [`types`]: Core data types (DocumentModel, Article, Note, etc.)
//! - [`error`]: Error and warning types
//! - [`config`]: Configuration constants and validation
//! - [`http`], [`retrieval`]: Downloading and caching document pages
//! - [`export`]: JSON/YAML output and markup rendering
//! - [`cli`]: Command-line interface

pub mod annex;
pub mod article;
pub mod assembler;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod http;
pub mod ids;
pub mod markup;
pub mod metadata;
pub mod nesting;
pub mod notes;
pub mod retrieval;
pub mod types;

// Re-export main functions
pub use assembler::{assemble, parse, parse_version};
pub use retrieval::fetch_raw_markup;

// Re-export commonly used items
pub use config::validate_ver_id;
pub use error::{HarvesterError, ParseWarning, Result};
pub use types::{
    Annex, Article, Book, Chapter, DocumentInfo, DocumentModel, HistoryEntry, Note, Paragraph,
    Parsed, Section, SubParagraph, Title,
};
