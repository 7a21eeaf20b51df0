use std::path::Path;

/// MIME type sent when nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Looks up a MIME type from the extension of `name`.
///
/// Matching is case-insensitive. Unknown or missing extensions return `None`.
pub fn content_type_for(name: &str) -> Option<&'static str> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("txt" | "log") => Some("text/plain"),
        Some("html" | "htm") => Some("text/html"),
        Some("css") => Some("text/css"),
        Some("csv") => Some("text/csv"),
        Some("md" | "markdown") => Some("text/markdown"),
        Some("js" | "mjs") => Some("text/javascript"),
        Some("json") => Some("application/json"),
        Some("xml") => Some("application/xml"),
        Some("pdf") => Some("application/pdf"),
        Some("zip") => Some("application/zip"),
        Some("gz" | "tgz") => Some("application/gzip"),
        Some("tar") => Some("application/x-tar"),
        Some("png") => Some("image/png"),
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        Some("gif") => Some("image/gif"),
        Some("webp") => Some("image/webp"),
        Some("svg") => Some("image/svg+xml"),
        Some("ico") => Some("image/x-icon"),
        Some("heic") => Some("image/heic"),
        Some("mp3") => Some("audio/mpeg"),
        Some("wav") => Some("audio/wav"),
        Some("ogg") => Some("audio/ogg"),
        Some("mp4") => Some("video/mp4"),
        Some("mov") => Some("video/quicktime"),
        Some("webm") => Some("video/webm"),
        _ => None,
    }
}
