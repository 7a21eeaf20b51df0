use std::path::Path;

use crate::{Error, Result, from_io};

/// Scheme of opaque content identifiers handed out by host platforms.
///
/// Such paths are not filesystem paths and are only meaningful to a host
/// resolver.
pub const CONTENT_SCHEME: &str = "content://";

/// Strips a leading `file://`, `file:/` or `file:` prefix.
///
/// `file:/tmp/a` keeps its leading slash, so the three spellings of the same
/// absolute path normalize to the same string.
pub fn normalize_path(path: &str) -> &str {
    path.strip_prefix("file://")
        .or_else(|| path.strip_prefix("file:"))
        .unwrap_or(path)
}

pub fn is_content_uri(path: &str) -> bool { path.starts_with(CONTENT_SCHEME) }

/// Returns `true` when `path` is absolute once normalized.
pub fn is_absolute(path: &str) -> bool { Path::new(normalize_path(path)).is_absolute() }

/// Creates every missing ancestor directory of `path`.
///
/// Returns `Ok(true)` when something had to be created and `Ok(false)` when
/// the parent already existed.
pub fn create_parent_dirs(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(false);
    };

    match parent.metadata() {
        Ok(meta) if meta.is_dir() => Ok(false),
        Ok(_) => Err(Error::Io {
            path:   parent.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "parent exists and is not a directory",
            ),
        }),
        Err(_) => {
            std::fs::create_dir_all(parent).map_err(|e| from_io(parent, e))?;
            Ok(true)
        }
    }
}
