//! In-memory collaborators shared by the transfer integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use bytes::Bytes;
use ferry_transfer::{
    FileSource, HttpClient, HttpResponse, LocalFs, MimeLookup, PreparedRequest, RequestBody,
    SourceResolver, TransferError, TransferResult, TransportError, TransportErrorKind,
};
use futures_util::{Stream, StreamExt, stream};
use tokio::io::{AsyncRead, ReadBuf};

/// Sets a flag when dropped.
#[derive(Debug, Clone, Default)]
pub struct DropFlag(Arc<AtomicBool>);

impl DropFlag {
    pub fn guard(&self) -> DropGuard { DropGuard(self.0.clone()) }

    pub fn is_set(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

#[derive(Debug)]
pub struct DropGuard(Arc<AtomicBool>);

impl Drop for DropGuard {
    fn drop(&mut self) { self.0.store(true, Ordering::SeqCst); }
}

/// A scripted response.
pub struct Reply {
    outcome: Result<(u16, Vec<(String, String)>), TransportError>,
    body:    Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>,
}

impl Reply {
    pub fn ok(body: &[u8]) -> Self { Self::status(200, body) }

    pub fn status(status: u16, body: &[u8]) -> Self {
        Self::chunks(status, vec![body.to_vec()])
    }

    /// A response whose body arrives in the given pieces.
    pub fn chunks(status: u16, chunks: Vec<Vec<u8>>) -> Self {
        let body = stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from(c))));
        Self {
            outcome: Ok((status, Vec::new())),
            body:    Box::pin(body),
        }
    }

    /// The request itself fails.
    pub fn fail(kind: TransportErrorKind, message: &str) -> Self {
        Self {
            outcome: Err(TransportError::new(kind, message)),
            body:    Box::pin(stream::empty()),
        }
    }

    /// The body delivers `chunks`, then breaks.
    pub fn broken_body(chunks: Vec<Vec<u8>>) -> Self {
        let body = stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from(c)))).chain(stream::once(
            async { Err(TransportError::new(TransportErrorKind::Body, "connection reset")) },
        ));
        Self {
            outcome: Ok((200, Vec::new())),
            body:    Box::pin(body),
        }
    }

    /// The body delivers `chunks`, then stalls forever. `guard` lives as long
    /// as the body does.
    pub fn stalled(chunks: Vec<Vec<u8>>, guard: DropGuard) -> Self {
        let body = stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from(c))))
            .chain(stream::pending())
            .map(move |chunk| {
                let _ = &guard;
                chunk
            });
        Self {
            outcome: Ok((200, Vec::new())),
            body:    Box::pin(body),
        }
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        if let Ok((_, headers)) = &mut self.outcome {
            headers.push((key.to_string(), value.to_string()));
        }
        self
    }

    fn into_response(self) -> Result<HttpResponse, TransportError> {
        let (status, pairs) = self.outcome?;
        let mut headers = ferry_transfer::Headers::new();
        for (key, value) in pairs {
            headers.entry(key).or_default().push(value);
        }
        Ok(HttpResponse {
            status,
            headers,
            body: self.body,
        })
    }
}

/// A request as the client saw it, body included.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub request: PreparedRequest,
    pub body:    Vec<u8>,
}

/// An [`HttpClient`] that replays scripted replies and records requests.
#[derive(Default)]
pub struct MockClient {
    replies:  Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Recorded>>,
}

impl MockClient {
    pub fn new(reply: Reply) -> Arc<Self> {
        let client = Self::default();
        client.replies.lock().unwrap().push_back(reply);
        Arc::new(client)
    }

    pub fn requests(&self) -> Vec<Recorded> { self.requests.lock().unwrap().clone() }

    pub fn only_request(&self) -> Recorded {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests[0].clone()
    }
}

impl HttpClient for MockClient {
    async fn send(
        &self,
        request: PreparedRequest,
        body: RequestBody,
    ) -> Result<HttpResponse, TransportError> {
        let body = match body {
            RequestBody::Empty => Vec::new(),
            RequestBody::Bytes(bytes) => bytes.to_vec(),
            RequestBody::Stream(mut chunks) => {
                let mut body = Vec::new();
                while let Some(chunk) = chunks.next().await {
                    let chunk = chunk
                        .map_err(|e| TransportError::new(TransportErrorKind::Body, e.to_string()))?;
                    body.extend_from_slice(&chunk);
                }
                body
            }
        };

        self.requests
            .lock()
            .unwrap()
            .push(Recorded { request, body });
        let reply = self.replies.lock().unwrap().pop_front();
        reply.expect("no scripted reply left").into_response()
    }
}

/// An upload source served from memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    pub name:  String,
    pub data:  Vec<u8>,
    /// Size reported to the uploader, which may differ from `data.len()`.
    pub size:  Option<u64>,
    pub flag:  DropFlag,
    /// Bytes per read, to force several chunks.
    pub chunk: usize,
}

impl MemorySource {
    pub fn new(name: &str, data: &[u8]) -> Self {
        Self {
            name:  name.to_string(),
            data:  data.to_vec(),
            size:  Some(data.len() as u64),
            flag:  DropFlag::default(),
            chunk: usize::MAX,
        }
    }

    pub fn unknown_size(mut self) -> Self {
        self.size = None;
        self
    }

    pub fn claimed_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn chunked_reads(mut self, chunk: usize) -> Self {
        self.chunk = chunk;
        self
    }
}

struct MemoryReader {
    inner:  Cursor<Vec<u8>>,
    chunk:  usize,
    _guard: DropGuard,
}

impl AsyncRead for MemoryReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let limit = buf.remaining().min(self.chunk);
        let mut limited = ReadBuf::new(buf.initialize_unfilled_to(limit));
        let result = Pin::new(&mut self.inner).poll_read(cx, &mut limited);
        let filled = limited.filled().len();
        buf.advance(filled);
        result
    }
}

impl SourceResolver for MemorySource {
    async fn resolve(&self, _path: &str) -> io::Result<FileSource> {
        Ok(FileSource {
            name:   self.name.clone(),
            size:   self.size,
            reader: Box::pin(MemoryReader {
                inner:  Cursor::new(self.data.clone()),
                chunk:  self.chunk,
                _guard: self.flag.guard(),
            }),
        })
    }
}

impl MimeLookup for MemorySource {
    fn mime_type(&self, name: &str) -> Option<String> { LocalFs.mime_type(name) }
}

/// Collect every event of a transfer.
pub async fn collect<S>(events: S) -> Vec<Result<TransferResult, TransferError>>
where
    S: Stream<Item = Result<TransferResult, TransferError>>,
{
    events.collect().await
}

/// Byte counts of the `Ongoing` events.
pub fn progress_counts(events: &[Result<TransferResult, TransferError>]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|e| match e {
            Ok(TransferResult::Ongoing(p)) => Some(p.bytes_transferred),
            _ => None,
        })
        .collect()
}

/// Exactly one terminal item, and it is last.
pub fn assert_single_terminal(events: &[Result<TransferResult, TransferError>]) {
    let terminal = events
        .iter()
        .filter(|e| !matches!(e, Ok(TransferResult::Ongoing(_))))
        .count();
    assert_eq!(terminal, 1, "expected exactly one terminal item");
    assert!(
        !matches!(events.last(), Some(Ok(TransferResult::Ongoing(_)))),
        "terminal item must be last"
    );
}

pub fn assert_non_decreasing(counts: &[u64]) {
    assert!(
        counts.windows(2).all(|w| w[0] <= w[1]),
        "byte counts decreased: {counts:?}"
    );
}
