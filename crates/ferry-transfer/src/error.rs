//! Error types for ferry-transfer.

use std::fmt;
use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::data::Headers;

/// The fixed set of ways a transfer can fail.
///
/// Every failure observable through [`Downloader`](crate::Downloader) or
/// [`Uploader`](crate::Uploader) is one of these variants. Low-level I/O and
/// network errors are folded into them by
/// [`map_failure`](crate::core::map_failure).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code")]
pub enum TransferError {
    #[serde(rename = "INVALID_PATH")]
    #[error("invalid path: {path:?}")]
    InvalidPath { path: String },

    #[serde(rename = "EMPTY_URL")]
    #[error("URL is empty")]
    EmptyUrl,

    #[serde(rename = "INVALID_URL")]
    #[error("invalid URL: {url:?}")]
    InvalidUrl { url: String },

    #[serde(rename = "FILE_DOES_NOT_EXIST")]
    #[error("file does not exist: {path} ({reason})")]
    FileDoesNotExist { path: String, reason: String },

    #[serde(rename = "CANNOT_CREATE_DIRECTORY")]
    #[error("cannot create directory for {path} ({reason})")]
    CannotCreateDirectory { path: String, reason: String },

    #[serde(rename = "HTTP_ERROR")]
    #[error("HTTP error: status {status}")]
    Http {
        status:  u16,
        body:    Option<String>,
        headers: Headers,
    },

    #[serde(rename = "CONNECTION_ERROR")]
    #[error("connection error: {message}")]
    Connection { message: String },

    #[serde(rename = "TRANSFER_ERROR")]
    #[error("transfer error: {message}")]
    Transfer { message: String },

    #[serde(rename = "UNKNOWN_ERROR")]
    #[error("unknown error: {message}")]
    Unknown { message: String },
}

impl TransferError {
    /// Stable code a host binding can switch on.
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidPath { .. } => "INVALID_PATH",
            TransferError::EmptyUrl => "EMPTY_URL",
            TransferError::InvalidUrl { .. } => "INVALID_URL",
            TransferError::FileDoesNotExist { .. } => "FILE_DOES_NOT_EXIST",
            TransferError::CannotCreateDirectory { .. } => "CANNOT_CREATE_DIRECTORY",
            TransferError::Http { .. } => "HTTP_ERROR",
            TransferError::Connection { .. } => "CONNECTION_ERROR",
            TransferError::Transfer { .. } => "TRANSFER_ERROR",
            TransferError::Unknown { .. } => "UNKNOWN_ERROR",
        }
    }

    pub(crate) fn unknown(message: impl Into<String>) -> Self {
        TransferError::Unknown {
            message: message.into(),
        }
    }
}

/// Classification of a failure reported by an [`HttpClient`](crate::HttpClient).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request could not be built (bad method, header, certificate).
    Builder,
    /// TCP/TLS connection could not be established.
    Connect,
    /// A connect or read deadline passed.
    Timeout,
    /// Sending the request failed after the connection was up.
    Request,
    /// Reading or writing a body failed.
    Body,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::Builder => write!(f, "builder"),
            TransportErrorKind::Connect => write!(f, "connect"),
            TransportErrorKind::Timeout => write!(f, "timeout"),
            TransportErrorKind::Request => write!(f, "request"),
            TransportErrorKind::Body => write!(f, "body"),
        }
    }
}

/// Low-level failure raised by an HTTP client implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {message}")]
pub struct TransportError {
    pub kind:    TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<TransportError> for io::Error {
    fn from(err: TransportError) -> Self {
        let kind = match err.kind {
            TransportErrorKind::Timeout => io::ErrorKind::TimedOut,
            TransportErrorKind::Connect => io::ErrorKind::ConnectionRefused,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_builder() {
            TransportErrorKind::Builder
        } else if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if err.is_body() || err.is_decode() {
            TransportErrorKind::Body
        } else {
            TransportErrorKind::Request
        };
        TransportError::new(kind, err.to_string())
    }
}

/// Failure while loading a [`TransferConfig`](crate::TransferConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path:   String,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_serialized_tags() {
        let errors = [
            TransferError::InvalidPath { path: "a".into() },
            TransferError::EmptyUrl,
            TransferError::InvalidUrl { url: "x".into() },
            TransferError::FileDoesNotExist {
                path:   "/a".into(),
                reason: "gone".into(),
            },
            TransferError::CannotCreateDirectory {
                path:   "/a".into(),
                reason: "ro".into(),
            },
            TransferError::Http {
                status:  404,
                body:    None,
                headers: Headers::new(),
            },
            TransferError::Connection {
                message: "refused".into(),
            },
            TransferError::Transfer {
                message: "reset".into(),
            },
            TransferError::unknown("?"),
        ];

        for err in errors {
            let json = serde_json::to_value(&err).unwrap();
            assert_eq!(json["code"], err.code());
        }
    }

    #[test]
    fn transport_error_keeps_timeout_kind_through_io() {
        let io_err: io::Error = TransportError::new(TransportErrorKind::Timeout, "slow").into();
        assert_eq!(io_err.kind(), io::ErrorKind::TimedOut);
    }
}
