use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::TransferError;

/// `scheme://host[:port][/path][?query][#fragment]` for `http`/`https`.
///
/// The host may be a bracketed IPv6 literal; otherwise it must not contain
/// whitespace, path separators, or the characters that start a port, query
/// or fragment.
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^https?://(\[[0-9a-f:.]+\]|[^\s/\\?#:\[\]]+)(:\d{1,5})?(/[^\s?#]*)?(\?[^\s#]*)?(#\S*)?$",
    )
    .expect("URL pattern is a valid regex")
});

/// Check a URL and a local path before any resource is touched.
///
/// # Examples
///
/// ```
/// use ferry_transfer::{TransferError, validate};
///
/// assert!(validate("https://example.com/a.zip", "/tmp/a.zip").is_ok());
/// assert_eq!(validate("", "/tmp/a.zip"), Err(TransferError::EmptyUrl));
/// ```
pub fn validate(url: &str, file_path: &str) -> Result<(), TransferError> {
    validate_url(url)?;
    validate_path(file_path)
}

pub fn validate_url(url: &str) -> Result<(), TransferError> {
    if url.trim().is_empty() {
        return Err(TransferError::EmptyUrl);
    }
    if !URL_PATTERN.is_match(url) {
        return Err(TransferError::InvalidUrl {
            url: url.to_string(),
        });
    }
    Ok(())
}

/// Accepts absolute paths (after `file:` prefix stripping) and host content
/// identifiers.
pub fn validate_path(file_path: &str) -> Result<(), TransferError> {
    let invalid = || TransferError::InvalidPath {
        path: file_path.to_string(),
    };

    if file_path.trim().is_empty() {
        return Err(invalid());
    }
    if ferry_fs::is_content_uri(file_path) {
        return Ok(());
    }

    let normalized = ferry_fs::normalize_path(file_path);
    if normalized.trim().is_empty() || !Path::new(normalized).is_absolute() {
        return Err(invalid());
    }
    Ok(())
}
