//! Error types for the harvester.
//!
//! Uses the dual-error pattern: `HarvesterError` for failures that abort an
//! operation, and `ParseWarning` for recoverable anomalies that are reported
//! next to a successfully parsed document.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// The markup has no usable root or lacks mandatory document metadata.
    #[error("Malformed markup: {0}")]
    MalformedMarkup(String),

    /// Invalid document version identifier.
    #[error("Invalid version id: '{0}'. Expected a numeric identifier (e.g., 120341)")]
    InvalidVersionId(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to retrieve the document markup from the portal.
    #[error("Failed to retrieve document {ver_id}: {source}")]
    Retrieval {
        ver_id: String,
        #[source]
        source: reqwest::Error,
    },

    /// All retry attempts failed.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// Response body exceeded the configured limit.
    #[error("Response too large: {size} bytes (limit {limit} bytes)")]
    ResponseTooLarge { size: u64, limit: u64 },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;

/// Recoverable anomaly encountered while parsing a document.
///
/// Warnings never abort a parse. They travel alongside the model so callers
/// can surface them without failing.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// A numbered section whose expected parent was never seen.
    #[error("Section '{section}' expected parent '{expected_parent}' which was not seen; promoted to top level")]
    AnomalousNesting {
        section: String,
        expected_parent: String,
    },

    /// A note without any recognizable date, law or monitor reference.
    #[error("Note '{note_id}' has no recognizable amendment reference; kept with text only")]
    UnrecognizedNoteFormat { note_id: String },

    /// The current version does not appear in the consolidation history.
    #[error("Version {ver_id} not found among {entries} history entries; previous/next links left unset")]
    UnresolvedHistoryLink { ver_id: String, entries: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HarvesterError::InvalidVersionId("abc".to_string());
        assert!(err.to_string().contains("abc"));
        assert!(err.to_string().contains("numeric"));
    }

    #[test]
    fn test_malformed_markup_display() {
        let err = HarvesterError::MalformedMarkup("no root element".to_string());
        assert_eq!(err.to_string(), "Malformed markup: no root element");
    }

    #[test]
    fn test_anomalous_nesting_display() {
        let warning = ParseWarning::AnomalousNesting {
            section: "2.1 Dispoziții".to_string(),
            expected_parent: "2".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "Section '2.1 Dispoziții' expected parent '2' which was not seen; promoted to top level"
        );
    }

    #[test]
    fn test_warning_serialization_is_tagged() {
        let warning = ParseWarning::UnrecognizedNoteFormat {
            note_id: "n1".to_string(),
        };
        let json = serde_json::to_string(&warning).unwrap();
        assert_eq!(json, r#"{"kind":"unrecognized_note_format","note_id":"n1"}"#);
    }
}
