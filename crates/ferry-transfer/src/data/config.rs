use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::core::PreparedRequest;
use crate::error::ConfigError;

/// Buffer size of one copy step, and so the progress granularity.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Multipart boundary token written between form parts.
pub const DEFAULT_BOUNDARY: &str = "----FerryFormBoundary7MA4YWxkTrZu0gW";

/// Engine-wide settings shared by every call of a
/// [`Downloader`](crate::Downloader) or [`Uploader`](crate::Uploader).
///
/// # Examples
///
/// ```
/// use ferry_transfer::TransferConfig;
///
/// let config = TransferConfig::from_toml_str(r#"
///     buffer_size = 16384
///     connect_timeout_ms = 5000
/// "#).unwrap();
/// assert_eq!(config.buffer_size, 16384);
/// assert_eq!(config.boundary, ferry_transfer::data::config::DEFAULT_BOUNDARY);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Bytes read per copy step. Zero falls back to [`DEFAULT_BUFFER_SIZE`].
    pub buffer_size: usize,

    /// Multipart boundary token.
    pub boundary: String,

    /// Connect timeout applied when the call's options leave it unset.
    pub connect_timeout_ms: Option<u64>,

    /// Read timeout applied when the call's options leave it unset.
    pub read_timeout_ms: Option<u64>,

    /// `User-Agent` sent when the caller did not set one.
    pub user_agent: Option<String>,

    /// Upload body chunks that may be queued ahead of the network.
    pub body_channel_depth: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            buffer_size:        DEFAULT_BUFFER_SIZE,
            boundary:           DEFAULT_BOUNDARY.to_string(),
            connect_timeout_ms: None,
            read_timeout_ms:    None,
            user_agent:         Some(concat!("ferry/", env!("CARGO_PKG_VERSION")).to_string()),
            body_channel_depth: 1,
        }
    }
}

impl TransferConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> { Ok(toml::from_str(input)?) }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    pub fn buffer_size(&self) -> usize {
        if self.buffer_size == 0 {
            DEFAULT_BUFFER_SIZE
        } else {
            self.buffer_size
        }
    }

    pub fn body_channel_depth(&self) -> usize { self.body_channel_depth.max(1) }

    /// Fill in whatever the per-call options left open.
    pub fn apply_defaults(&self, request: &mut PreparedRequest) {
        if request.connect_timeout.is_none() {
            request.connect_timeout = self.connect_timeout_ms.map(Duration::from_millis);
        }
        if request.read_timeout.is_none() {
            request.read_timeout = self.read_timeout_ms.map(Duration::from_millis);
        }
        if let Some(agent) = &self.user_agent {
            request.set_header_if_absent("User-Agent", agent);
        }
    }
}
