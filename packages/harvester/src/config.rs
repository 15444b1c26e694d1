//! Configuration constants and validation functions for the harvester.

use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

use crate::error::{HarvesterError, Result};

/// Base URL of the consolidated legislation portal.
pub const PORTAL_BASE_URL: &str = "https://legislatie.just.ro/Public/DetaliiDocument";

/// HTTP timeout in seconds.
///
/// Large codes (civil code, fiscal code) render to several megabytes of HTML.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Default maximum HTTP response size in bytes (50 MB).
pub const DEFAULT_MAX_RESPONSE_SIZE: u64 = 50 * 1024 * 1024;

/// Environment variable overriding the HTML cache directory.
pub const CACHE_DIR_ENV: &str = "LEGIS_CACHE_DIR";

/// Cache directory name created under the user's home directory.
pub const CACHE_DIR_NAME: &str = ".legis";

/// Version identifier pattern: one or more ASCII digits.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static VER_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));

/// Validate a document version identifier.
///
/// # Examples
/// ```
/// use legis_harvester::config::validate_ver_id;
///
/// assert!(validate_ver_id("120341").is_ok());
/// assert!(validate_ver_id("../etc").is_err());
/// ```
pub fn validate_ver_id(ver_id: &str) -> Result<()> {
    if VER_ID_PATTERN.is_match(ver_id) {
        Ok(())
    } else {
        Err(HarvesterError::InvalidVersionId(ver_id.to_string()))
    }
}

/// Build the public portal URL for a document version.
///
/// # Examples
/// ```
/// use legis_harvester::config::document_url;
///
/// assert_eq!(
///     document_url("120341"),
///     "https://legislatie.just.ro/Public/DetaliiDocument/120341"
/// );
/// ```
pub fn document_url(ver_id: &str) -> String {
    format!("{PORTAL_BASE_URL}/{ver_id}")
}

/// Resolve the HTML cache directory.
///
/// Priority: explicit argument, then `LEGIS_CACHE_DIR`, then `$HOME/.legis`,
/// then `.legis` in the working directory.
pub fn resolve_cache_dir(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    if let Some(dir) = std::env::var_os(CACHE_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(|home| PathBuf::from(home).join(CACHE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(CACHE_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ver_id_valid() {
        assert!(validate_ver_id("1").is_ok());
        assert!(validate_ver_id("120341").is_ok());
    }

    #[test]
    fn test_validate_ver_id_invalid() {
        assert!(validate_ver_id("").is_err());
        assert!(validate_ver_id("12a").is_err());
        assert!(validate_ver_id(" 12").is_err());
        assert!(validate_ver_id("../12").is_err());
    }

    #[test]
    fn test_document_url() {
        assert_eq!(
            document_url("113617"),
            "https://legislatie.just.ro/Public/DetaliiDocument/113617"
        );
    }

    #[test]
    fn test_resolve_cache_dir_explicit_wins() {
        let dir = resolve_cache_dir(Some(PathBuf::from("/tmp/cache")));
        assert_eq!(dir, PathBuf::from("/tmp/cache"));
    }
}
