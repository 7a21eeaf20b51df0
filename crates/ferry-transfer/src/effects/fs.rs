use std::future::Future;
use std::io;
use std::path::Path;
use std::pin::Pin;

use tokio::io::AsyncRead;

/// A readable upload source.
pub struct FileSource {
    /// File name used in the multipart `filename` and for the MIME lookup.
    pub name:   String,
    /// Byte size, `None` if the source cannot tell up front.
    pub size:   Option<u64>,
    pub reader: Pin<Box<dyn AsyncRead + Send>>,
}

impl std::fmt::Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSource")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Turns an upload path into a readable source.
pub trait SourceResolver: Send + Sync {
    fn resolve(&self, path: &str) -> impl Future<Output = io::Result<FileSource>> + Send;
}

/// Makes sure the parent directory of a download destination exists.
pub trait DirectoryCreator: Send + Sync {
    fn create_parent_dirs(&self, path: &str) -> impl Future<Output = io::Result<()>> + Send;
}

pub trait MimeLookup: Send + Sync {
    /// Content type for a file name, if one is known.
    fn mime_type(&self, name: &str) -> Option<String>;
}

/// Local filesystem collaborators backed by `ferry-fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl SourceResolver for LocalFs {
    async fn resolve(&self, path: &str) -> io::Result<FileSource> {
        let path = path.to_string();
        let source = tokio::task::spawn_blocking(move || ferry_fs::open_source(&path))
            .await
            .map_err(io::Error::other)??;

        tracing::debug!(path = %source.path.display(), size = ?source.size, "resolved upload source");

        Ok(FileSource {
            name:   source.name,
            size:   source.size,
            reader: Box::pin(tokio::fs::File::from_std(source.file)),
        })
    }
}

impl DirectoryCreator for LocalFs {
    async fn create_parent_dirs(&self, path: &str) -> io::Result<()> {
        if ferry_fs::is_content_uri(path) {
            return Err(ferry_fs::Error::UnsupportedScheme(path.to_string()).into());
        }

        let path = ferry_fs::normalize_path(path).to_string();
        let created = tokio::task::spawn_blocking(move || ferry_fs::create_parent_dirs(Path::new(&path)))
            .await
            .map_err(io::Error::other)??;

        if created {
            tracing::debug!("created destination directory");
        }
        Ok(())
    }
}

impl MimeLookup for LocalFs {
    fn mime_type(&self, name: &str) -> Option<String> {
        ferry_fs::content_type_for(name).map(str::to_string)
    }
}
