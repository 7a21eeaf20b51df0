//! Pure transformations for building and judging transfers.
//!
//! Nothing in here performs I/O: inputs are validated, requests configured,
//! multipart frames built and low-level failures classified as plain
//! functions over data, so every rule can be tested without a network.

mod failure;
mod multipart;
mod params;
mod request;
mod response;
mod validation;

pub use failure::{Cause, Stage, map_failure};
pub use multipart::{LINE_END, MultipartFrame, multipart_content_type};
pub use params::encode_params;
pub use request::{BodyFraming, PreparedRequest, configure};
pub use response::{ContentEncoding, content_length, is_success, length_computable};
pub use validation::{validate, validate_path, validate_url};
