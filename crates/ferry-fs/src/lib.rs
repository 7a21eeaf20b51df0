//! Local filesystem collaborators for ferry transfers.
//!
//! The transfer engine never touches platform specifics directly; it asks
//! for a parent directory to exist, for a readable source and for a MIME
//! type. This crate answers those questions for plain local paths.

mod error;
mod mime;
mod path;
mod source;

pub use error::{Error, Result, from_io};
pub use mime::{OCTET_STREAM, content_type_for};
pub use path::{CONTENT_SCHEME, create_parent_dirs, is_absolute, is_content_uri, normalize_path};
pub use source::{LocalSource, open_source};
