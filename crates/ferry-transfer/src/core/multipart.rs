use std::fmt::Write;

use bytes::Bytes;

/// Line ending of every multipart line.
pub const LINE_END: &str = "\r\n";

const DASHES: &str = "--";

/// `Content-Type` value announcing a multipart body with `boundary`.
pub fn multipart_content_type(boundary: &str) -> String {
    format!("multipart/form-data; boundary={boundary}")
}

/// The bytes written around the file payload of a multipart upload.
///
/// The uploader writes exactly [`preamble`](Self::preamble), then the file,
/// then [`epilogue`](Self::epilogue), and declares
/// `file_size + overhead()` as the body length. Both numbers come from these
/// two buffers, so the declared length cannot drift from what is sent.
///
/// # Examples
///
/// ```
/// use ferry_transfer::MultipartFrame;
///
/// let fields = vec![("album".to_string(), vec!["summer".to_string()])];
/// let frame = MultipartFrame::new("XyZ", &fields, "file", "a.jpg", "image/jpeg");
///
/// assert!(frame.preamble().starts_with(b"--XyZ\r\n"));
/// assert_eq!(&frame.epilogue()[..], b"\r\n--XyZ--\r\n");
/// assert_eq!(frame.overhead(), (frame.preamble().len() + frame.epilogue().len()) as u64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartFrame {
    preamble: Bytes,
    epilogue: Bytes,
}

impl MultipartFrame {
    /// Build the frame for one file part preceded by one text part per field
    /// value, in the order given.
    pub fn new(
        boundary: &str,
        fields: &[(String, Vec<String>)],
        file_key: &str,
        file_name: &str,
        content_type: &str,
    ) -> Self {
        let mut preamble = String::new();

        // write! into a String cannot fail
        for (key, values) in fields {
            for value in values {
                let _ = write!(preamble, "{DASHES}{boundary}{LINE_END}");
                let _ = write!(
                    preamble,
                    "Content-Disposition: form-data; name=\"{key}\"{LINE_END}"
                );
                let _ = write!(preamble, "{LINE_END}{value}{LINE_END}");
            }
        }

        let _ = write!(preamble, "{DASHES}{boundary}{LINE_END}");
        let _ = write!(
            preamble,
            "Content-Disposition: form-data; name=\"{file_key}\"; filename=\"{file_name}\"{LINE_END}"
        );
        let _ = write!(preamble, "Content-Type: {content_type}{LINE_END}");
        preamble.push_str(LINE_END);

        let epilogue = format!("{LINE_END}{DASHES}{boundary}{DASHES}{LINE_END}");

        Self {
            preamble: Bytes::from(preamble),
            epilogue: Bytes::from(epilogue),
        }
    }

    pub fn preamble(&self) -> &Bytes { &self.preamble }

    pub fn epilogue(&self) -> &Bytes { &self.epilogue }

    /// Bytes the frame adds to the file payload.
    pub fn overhead(&self) -> u64 { (self.preamble.len() + self.epilogue.len()) as u64 }

    /// Exact body length for a file of `file_size` bytes.
    pub fn body_length(&self, file_size: u64) -> u64 { file_size + self.overhead() }
}
