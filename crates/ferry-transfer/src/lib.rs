//! Single-file HTTP transfers with byte-level progress.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable options, events and configuration
//! - [`core`] - Pure transformations (validation, request configuration,
//!   multipart framing, failure mapping)
//! - [`effects`] - I/O operations behind trait abstractions
//!
//! # Key Features
//!
//! - **Pull-based events**: every call is a [`futures_util::Stream`] of
//!   progress events ending in exactly one completion or one error
//! - **Backpressure**: bytes only move while the consumer polls
//! - **Cancellation by drop**: dropping the stream closes the connection and
//!   every file handle it owns
//! - **Exact framing**: multipart overhead is measured on the bytes that are
//!   actually written
//! - **Fixed error taxonomy**: callers only ever see [`TransferError`]

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use crate::core::{BodyFraming, MultipartFrame, PreparedRequest, configure, validate};
pub use data::{
    DownloadOptions, Headers, HttpOptions, ProgressStatus, TlsTrust, TransferComplete,
    TransferConfig, TransferResult, UploadOptions,
};
pub use effects::{
    BoxStream, ChunkSink, DirectoryCreator, Downloader, FileSink, FileSource, HttpClient,
    HttpResponse, LocalFs, MimeLookup, RequestBody, SourceResolver, StreamCopier, Uploader,
};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{ConfigError, TransferError, TransportError, TransportErrorKind};
