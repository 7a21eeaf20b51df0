//! I/O operations behind trait abstractions.
//!
//! [`Downloader`] and [`Uploader`] turn options into event streams. They talk
//! to the network through [`HttpClient`] and to the filesystem through the
//! collaborator traits in [`fs`], so both can be replaced in tests.

pub mod copier;
pub mod download;
pub mod fs;
pub mod http;
pub mod upload;

use std::io;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio_util::io::StreamReader;

pub use copier::{ChunkSink, FileSink, StreamCopier};
pub use download::Downloader;
pub use fs::{DirectoryCreator, FileSource, LocalFs, MimeLookup, SourceResolver};
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
pub use http::{BoxStream, HttpClient, HttpResponse, RequestBody};
pub use upload::Uploader;

use crate::core::ContentEncoding;
use crate::data::config::DEFAULT_BUFFER_SIZE;
use crate::data::{ProgressStatus, TransferComplete, TransferResult};
use crate::error::{TransferError, TransportError};

/// Drive an event stream to its end.
///
/// `on_progress` sees every `Ongoing` event; the `Complete` event is returned.
pub async fn drain<S, F>(events: S, mut on_progress: F) -> Result<TransferComplete, TransferError>
where
    S: Stream<Item = Result<TransferResult, TransferError>>,
    F: FnMut(&ProgressStatus),
{
    let mut events = std::pin::pin!(events);
    while let Some(event) = events.next().await {
        match event? {
            TransferResult::Ongoing(status) => on_progress(&status),
            TransferResult::Complete(complete) => return Ok(complete),
        }
    }
    Err(TransferError::unknown("transfer ended without a result"))
}

/// Read a whole response body as text. An empty body is `None`.
pub(crate) async fn read_text(
    body: BoxStream<'static, Result<Bytes, TransportError>>,
    encoding: &ContentEncoding,
) -> io::Result<Option<String>> {
    let mut reader = StreamReader::new(body);
    let mut sink = if encoding.is_gzip() {
        FileSink::gzip(Vec::new())
    } else {
        FileSink::new(Vec::new())
    };

    StreamCopier::new(DEFAULT_BUFFER_SIZE, None, false)
        .copy(&mut reader, &mut sink, |_| {})
        .await?;

    let bytes = sink.into_inner();
    Ok((!bytes.is_empty()).then(|| String::from_utf8_lossy(&bytes).into_owned()))
}

/// Turn a non-2xx response into [`TransferError::Http`], reading the error
/// body if the server sent a readable one.
pub(crate) async fn http_error(response: HttpResponse) -> TransferError {
    let HttpResponse {
        status,
        headers,
        body,
    } = response;

    let encoding = ContentEncoding::from_headers(&headers);
    let body = read_text(body, &encoding).await.unwrap_or_else(|err| {
        tracing::debug!(status, error = %err, "error body unreadable");
        None
    });

    tracing::warn!(status, "server rejected transfer");
    TransferError::Http {
        status,
        body,
        headers,
    }
}
