use std::io;

use crate::error::{TransferError, TransportError, TransportErrorKind};

/// Where in a transfer a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PreparingDirectory,
    ResolvingSource,
    /// The client could not build the request, e.g. an unknown method or
    /// unreadable trust roots.
    Configuring,
    /// From sending the request until the response head arrives. For uploads
    /// this spans writing the body.
    Connecting,
    /// Moving payload bytes after the connection is up.
    Streaming,
    ReadingResponse,
}

impl Stage {
    /// Stage to blame for a failed `send`.
    pub fn of_send(err: &TransportError) -> Stage {
        if err.kind == TransportErrorKind::Builder {
            Stage::Configuring
        } else {
            Stage::Connecting
        }
    }
}

/// A low-level failure, borrowed for classification.
#[derive(Debug, Clone, Copy)]
pub enum Cause<'a> {
    Io(&'a io::Error),
    Transport(&'a TransportError),
}

impl std::fmt::Display for Cause<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cause::Io(e) => write!(f, "{e}"),
            Cause::Transport(e) => write!(f, "{e}"),
        }
    }
}

/// Fold a low-level failure into the fixed taxonomy.
///
/// `subject` is the path or URL the failure concerns; it is reported by the
/// path-related kinds.
pub fn map_failure(stage: Stage, subject: &str, cause: Cause<'_>) -> TransferError {
    let message = cause.to_string();
    tracing::warn!(?stage, subject, error = %message, "transfer failed");

    match stage {
        Stage::PreparingDirectory => TransferError::CannotCreateDirectory {
            path:   subject.to_string(),
            reason: message,
        },
        Stage::ResolvingSource => TransferError::FileDoesNotExist {
            path:   subject.to_string(),
            reason: message,
        },
        Stage::Configuring => TransferError::Unknown { message },
        Stage::Connecting => match cause {
            Cause::Transport(e) => match e.kind {
                TransportErrorKind::Connect
                | TransportErrorKind::Timeout
                | TransportErrorKind::Request => TransferError::Connection { message },
                TransportErrorKind::Body => TransferError::Transfer { message },
                TransportErrorKind::Builder => TransferError::Unknown { message },
            },
            Cause::Io(e) if is_connection_io(e) => TransferError::Connection { message },
            _ => TransferError::Unknown { message },
        },
        Stage::Streaming | Stage::ReadingResponse => TransferError::Transfer { message },
    }
}

fn is_connection_io(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::NetworkUnreachable
    )
}
