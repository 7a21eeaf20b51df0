use crate::data::{Headers, header_value};

/// `Content-Encoding` of a response, as far as byte accounting cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentEncoding {
    Identity,
    Gzip,
    /// Anything else (`br`, `deflate`, stacked encodings, ...).
    Other(String),
}

impl ContentEncoding {
    pub fn from_headers(headers: &Headers) -> Self {
        match header_value(headers, "Content-Encoding").map(str::trim) {
            None | Some("") => ContentEncoding::Identity,
            Some(value) if value.eq_ignore_ascii_case("identity") => ContentEncoding::Identity,
            Some(value) if value.eq_ignore_ascii_case("gzip") || value.eq_ignore_ascii_case("x-gzip") => {
                ContentEncoding::Gzip
            }
            Some(value) => ContentEncoding::Other(value.to_string()),
        }
    }

    pub fn is_gzip(&self) -> bool { matches!(self, ContentEncoding::Gzip) }
}

/// The inclusive 200–299 success range.
pub fn is_success(status: u16) -> bool { (200..=299).contains(&status) }

/// Declared `Content-Length`, if present and numeric.
pub fn content_length(headers: &Headers) -> Option<u64> {
    header_value(headers, "Content-Length").and_then(|v| v.trim().parse().ok())
}

/// Whether `content_length` can serve as a progress denominator.
///
/// Byte accounting runs over the bytes received, so the declared length
/// stays valid for identity and gzip bodies. Any other encoding makes it
/// unreliable.
pub fn length_computable(content_length: Option<u64>, encoding: &ContentEncoding) -> bool {
    content_length.is_some_and(|len| len > 0) && !matches!(encoding, ContentEncoding::Other(_))
}
