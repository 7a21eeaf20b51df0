use std::collections::BTreeMap;

use serde::Serialize;

/// Response headers: every received name mapped to all of its values.
pub type Headers = BTreeMap<String, Vec<String>>;

/// First value of header `name`, compared case-insensitively.
pub fn header_value<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.first())
        .map(String::as_str)
}

/// Byte-level progress of a running transfer.
///
/// Emitted after every chunk the copier moves. Within one call
/// `bytes_transferred` never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStatus {
    /// Bytes moved so far.
    pub bytes_transferred: u64,

    /// Total expected bytes, if known.
    ///
    /// `None` when the server sent no `Content-Length`, or when an upload
    /// uses chunked framing.
    pub content_length: Option<u64>,

    /// Whether `content_length` is a trustworthy percentage denominator.
    pub length_computable: bool,
}

impl ProgressStatus {
    /// Percentage of completion, only when the length is computable.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        if !self.length_computable {
            return None;
        }
        self.content_length.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.bytes_transferred as f64 / total as f64) * 100.0
            }
        })
    }
}

/// Terminal result of a successful transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferComplete {
    /// Bytes accounted for the whole transfer.
    ///
    /// For uploads this is the full request body, multipart framing included.
    pub total_bytes: u64,

    /// HTTP status of the final response.
    pub status: u16,

    /// Response text. Always `None` for downloads; `None` for uploads whose
    /// response body was empty.
    pub response_body: Option<String>,

    pub headers: Headers,
}

impl TransferComplete {
    /// The status as a decimal string, the form host bindings report.
    pub fn response_code(&self) -> String { self.status.to_string() }
}

/// One event of a transfer.
///
/// A successful call yields any number of `Ongoing` events followed by exactly
/// one `Complete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransferResult {
    Ongoing(ProgressStatus),
    Complete(TransferComplete),
}
