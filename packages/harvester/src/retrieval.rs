//! Document retrieval with an on-disk HTML cache.
//!
//! The parser never touches the network or the filesystem; this module hands
//! it a fully materialized markup string.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;

use crate::config::{validate_ver_id, PORTAL_BASE_URL};
use crate::error::{HarvesterError, Result};
use crate::http::{bytes_to_string, create_client, download_bytes};

/// Path of the cached page for a version.
#[must_use]
pub fn cache_path(cache_dir: &Path, ver_id: &str) -> PathBuf {
    cache_dir.join(format!("{ver_id}.html"))
}

/// Fetch the raw markup of a document version.
///
/// Returns the cached copy when present; otherwise downloads the page from
/// the portal and stores it in `cache_dir`.
///
/// # Errors
/// `InvalidVersionId` for non-numeric identifiers, `Retrieval` for network
/// failures, `Io` when the cache cannot be read or written.
pub fn fetch_raw_markup(ver_id: &str, cache_dir: &Path) -> Result<String> {
    let client = create_client()?;
    fetch_raw_markup_from(&client, PORTAL_BASE_URL, ver_id, cache_dir)
}

/// Like [`fetch_raw_markup`], against an arbitrary base URL.
pub fn fetch_raw_markup_from(
    client: &Client,
    base_url: &str,
    ver_id: &str,
    cache_dir: &Path,
) -> Result<String> {
    validate_ver_id(ver_id)?;

    let path = cache_path(cache_dir, ver_id);
    if path.is_file() {
        tracing::debug!(path = %path.display(), "Using cached document");
        return Ok(fs::read_to_string(&path)?);
    }

    let url = format!("{}/{ver_id}", base_url.trim_end_matches('/'));
    tracing::debug!(%url, "Downloading document");
    let bytes = download_bytes(client, &url).map_err(|e| match e {
        HarvesterError::Http(source) => HarvesterError::Retrieval {
            ver_id: ver_id.to_string(),
            source,
        },
        other => other,
    })?;
    let markup = bytes_to_string(&bytes, &format!("document {ver_id}"));

    fs::create_dir_all(cache_dir)?;
    fs::write(&path, &markup)?;
    Ok(markup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cache_path() {
        assert_eq!(
            cache_path(Path::new("/tmp/legis"), "123"),
            PathBuf::from("/tmp/legis/123.html")
        );
    }

    #[test]
    fn test_cached_markup_is_returned_without_network() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("55.html"), "<html>cached</html>").unwrap();
        let client = create_client().unwrap();

        // Unroutable base URL: only the cache can satisfy this
        let markup = fetch_raw_markup_from(&client, "http://127.0.0.1:9", "55", dir.path()).unwrap();
        assert_eq!(markup, "<html>cached</html>");
    }

    #[test]
    fn test_invalid_ver_id_rejected() {
        let dir = TempDir::new().unwrap();
        let err = fetch_raw_markup("../etc/passwd", dir.path()).unwrap_err();
        assert!(matches!(err, HarvesterError::InvalidVersionId(_)));
    }
}
