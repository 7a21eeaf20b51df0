use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("unsupported path scheme: {0}")]
    UnsupportedScheme(String),

    #[error("{}: {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Error {
    let path = path.into();
    match err.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path),
        std::io::ErrorKind::PermissionDenied => Error::PermissionDenied(path),
        _ => Error::Io { path, source: err },
    }
}

impl Error {
    /// Converts back into an `io::Error`, keeping the closest `ErrorKind`.
    pub fn into_io(self) -> std::io::Error {
        use std::io::ErrorKind;

        match self {
            Error::Io { source, .. } => source,
            Error::NotFound(_) => std::io::Error::new(ErrorKind::NotFound, self),
            Error::PermissionDenied(_) => std::io::Error::new(ErrorKind::PermissionDenied, self),
            Error::NotAFile(_) => std::io::Error::new(ErrorKind::InvalidInput, self),
            Error::UnsupportedScheme(_) => std::io::Error::new(ErrorKind::Unsupported, self),
        }
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self { err.into_io() }
}
