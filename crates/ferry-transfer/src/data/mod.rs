//! Immutable data types for transfer operations.
//!
//! This module contains the per-call options, the events a call produces and
//! the engine-wide configuration. None of these types perform I/O.

pub mod config;
pub mod options;
pub mod progress;

pub use config::TransferConfig;
pub use options::{DownloadOptions, HttpOptions, TlsTrust, UploadOptions};
pub use progress::{Headers, ProgressStatus, TransferComplete, TransferResult, header_value};
