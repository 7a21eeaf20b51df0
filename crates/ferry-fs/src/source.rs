use std::fs::File;
use std::path::{Path, PathBuf};

use crate::path::{is_content_uri, normalize_path};
use crate::{Error, Result, from_io};

/// A local file opened for reading, plus what an upload needs to know about it.
#[derive(Debug)]
pub struct LocalSource {
    pub name: String,
    /// Byte size, `None` when the file is not seekable (pipes, devices).
    pub size: Option<u64>,
    pub path: PathBuf,
    pub file: File,
}

/// Opens `path` (optionally `file:`-prefixed) for reading.
///
/// Content identifiers are rejected with [`Error::UnsupportedScheme`]; they
/// need a host-specific resolver.
pub fn open_source(path: &str) -> Result<LocalSource> {
    if is_content_uri(path) {
        return Err(Error::UnsupportedScheme(path.to_string()));
    }

    let path = Path::new(normalize_path(path));
    let file = File::open(path).map_err(|e| from_io(path, e))?;
    let meta = file.metadata().map_err(|e| from_io(path, e))?;

    if meta.is_dir() {
        return Err(Error::NotAFile(path.to_path_buf()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(LocalSource {
        name,
        size: meta.is_file().then(|| meta.len()),
        path: path.to_path_buf(),
        file,
    })
}
