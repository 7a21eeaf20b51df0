use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use futures_util::stream::{self, Stream};
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tracing::debug;

use crate::core::{
    BodyFraming, Cause, ContentEncoding, MultipartFrame, PreparedRequest, Stage, encode_params,
    is_success, length_computable, map_failure, multipart_content_type, validate,
};
use crate::data::{ProgressStatus, TransferComplete, TransferConfig, TransferResult, UploadOptions};
use crate::effects::copier::{ChunkSink, StreamCopier};
use crate::effects::fs::{FileSource, LocalFs, MimeLookup, SourceResolver};
use crate::effects::http::{HttpClient, HttpResponse, RequestBody};
use crate::error::{TransferError, TransportError};

/// Sends a local file as a request body, reporting progress per chunk.
///
/// `POST` and `PUT` uploads are sent as `multipart/form-data` with the
/// request parameters as form fields; any other method sends the raw file
/// bytes and puts the parameters in the query string.
pub struct Uploader<C, F = LocalFs> {
    client: C,
    fs:     F,
    config: TransferConfig,
}

impl<C: HttpClient> Uploader<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            fs: LocalFs,
            config: TransferConfig::default(),
        }
    }
}

impl<C, F> Uploader<C, F>
where
    C: HttpClient,
    F: SourceResolver + MimeLookup,
{
    /// Replace the filesystem collaborators.
    pub fn with_fs<G: SourceResolver + MimeLookup>(self, fs: G) -> Uploader<C, G> {
        Uploader {
            client: self.client,
            fs,
            config: self.config,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: TransferConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TransferConfig { &self.config }

    /// Start an upload.
    ///
    /// Nothing happens until the stream is polled. It yields an `Ongoing`
    /// event per chunk of the file written to the request body, then one
    /// `Complete` carrying the response text, or a single error. Dropping it
    /// cancels the upload and closes the source and the connection.
    pub fn upload(
        &self,
        options: UploadOptions,
    ) -> impl Stream<Item = Result<TransferResult, TransferError>> + Send + '_ {
        stream::unfold(State::Start(options), move |state| async move {
            let mut active = match state {
                State::Done => return None,
                State::Start(options) => match self.connect(options).await {
                    Ok(active) => Box::new(active),
                    Err(err) => return Some((Err(err), State::Done)),
                },
                State::Writing(active) => active,
            };

            match active.advance().await {
                Ok(Advance::Progress(progress)) => {
                    Some((Ok(TransferResult::Ongoing(progress)), State::Writing(active)))
                }
                Ok(Advance::Complete(complete)) => {
                    Some((Ok(TransferResult::Complete(complete)), State::Done))
                }
                Err(err) => Some((Err(err), State::Done)),
            }
        })
    }

    /// Run an upload to the end, calling `on_progress` per chunk.
    pub async fn upload_with<P>(
        &self,
        options: UploadOptions,
        on_progress: P,
    ) -> Result<TransferComplete, TransferError>
    where
        P: FnMut(&ProgressStatus),
    {
        super::drain(self.upload(options), on_progress).await
    }

    async fn connect(&self, options: UploadOptions) -> Result<ActiveUpload<'_>, TransferError> {
        let UploadOptions {
            url,
            file_path,
            chunked_mode,
            mime_type,
            file_key,
            http,
        } = options;

        validate(&url, &file_path)?;
        debug!(%url, path = %file_path, "upload validated");

        let FileSource { name, size, reader } = self
            .fs
            .resolve(&file_path)
            .await
            .map_err(|e| map_failure(Stage::ResolvingSource, &file_path, Cause::Io(&e)))?;

        let mime = mime_type
            .or_else(|| self.fs.mime_type(&name))
            .unwrap_or_else(|| ferry_fs::OCTET_STREAM.to_string());

        let mut request = PreparedRequest::new(&url, &http);
        let multipart = is_multipart(&request.method);

        let frame = if multipart {
            let frame = MultipartFrame::new(&self.config.boundary, &http.params, &file_key, &name, &mime);
            request.set_header_if_absent("Content-Type", &multipart_content_type(&self.config.boundary));
            Some(frame)
        } else {
            request = request.with_query(&encode_params(&http.params, http.should_encode_url_params));
            request.set_header_if_absent("Content-Type", &mime);
            None
        };

        let framing = match size {
            Some(size) if !chunked_mode => {
                BodyFraming::Fixed(frame.as_ref().map_or(size, |frame| frame.body_length(size)))
            }
            _ => BodyFraming::Chunked,
        };
        self.config.apply_defaults(&mut request);
        let request = request.with_framing(framing);
        debug!(%url, method = %request.method, ?framing, multipart, "upload configured");

        let (tx, rx) = mpsc::channel(self.config.body_channel_depth());
        let body = stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|chunk| (chunk, rx)) });
        let response = Box::pin(self.client.send(request, RequestBody::Stream(Box::pin(body))));

        let declared = match framing {
            BodyFraming::Fixed(len) => Some(len),
            BodyFraming::Chunked => None,
        };
        let preamble = frame.as_ref().map_or(0, |frame| frame.preamble().len() as u64);
        let computable = length_computable(declared, &ContentEncoding::Identity);
        let copier = StreamCopier::new(self.config.buffer_size(), declared, computable)
            .starting_at(preamble);

        Ok(ActiveUpload {
            url,
            response,
            writer: BodyWriter {
                phase: Phase::Preamble,
                frame,
                reader,
                sink: BodySender(Some(tx)),
                copier,
                declared,
                epilogue_written: 0,
            },
        })
    }
}

fn is_multipart(method: &str) -> bool { matches!(method, "POST" | "PUT") }

enum State<'a> {
    Start(UploadOptions),
    Writing(Box<ActiveUpload<'a>>),
    Done,
}

enum Advance {
    Progress(ProgressStatus),
    Complete(TransferComplete),
}

/// An upload in flight: the pending response and the body being fed to it.
/// Dropping it aborts the request and closes the source.
struct ActiveUpload<'a> {
    url:      String,
    response: BoxFuture<'a, Result<HttpResponse, TransportError>>,
    writer:   BodyWriter,
}

impl ActiveUpload<'_> {
    async fn advance(&mut self) -> Result<Advance, TransferError> {
        if !self.writer.is_closed() {
            tokio::select! {
                biased;

                response = &mut self.response => {
                    debug!(url = %self.url, bytes = self.writer.total(), "response arrived before body was complete");
                    return self.finish(response).await.map(Advance::Complete);
                }
                step = self.writer.step() => match step {
                    Ok(Some(progress)) => return Ok(Advance::Progress(progress)),
                    Ok(None) => debug!(url = %self.url, bytes = self.writer.total(), "request body written"),
                    // the client stopped reading; its own result says why
                    Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                        debug!(url = %self.url, "request body dropped by the client");
                        self.writer.phase = Phase::Closed;
                    }
                    Err(err) => return Err(map_failure(Stage::Streaming, &self.url, Cause::Io(&err))),
                },
            }
        }

        let response = (&mut self.response).await;
        self.finish(response).await.map(Advance::Complete)
    }

    async fn finish(
        &mut self,
        response: Result<HttpResponse, TransportError>,
    ) -> Result<TransferComplete, TransferError> {
        let response =
            response.map_err(|e| map_failure(Stage::of_send(&e), &self.url, Cause::Transport(&e)))?;
        debug!(url = %self.url, status = response.status, "upload response received");

        if !is_success(response.status) {
            return Err(super::http_error(response).await);
        }

        let HttpResponse {
            status,
            headers,
            body,
        } = response;
        let encoding = ContentEncoding::from_headers(&headers);
        let response_body = super::read_text(body, &encoding)
            .await
            .map_err(|e| map_failure(Stage::ReadingResponse, &self.url, Cause::Io(&e)))?;

        Ok(TransferComplete {
            total_bytes: self.writer.total(),
            status,
            response_body,
            headers,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Preamble,
    File,
    Epilogue,
    Closed,
}

/// Writes preamble, file and epilogue into the request body channel.
struct BodyWriter {
    phase:            Phase,
    frame:            Option<MultipartFrame>,
    reader:           Pin<Box<dyn AsyncRead + Send>>,
    sink:             BodySender,
    copier:           StreamCopier,
    /// Fixed body length, if one was declared.
    declared:         Option<u64>,
    epilogue_written: u64,
}

impl BodyWriter {
    fn is_closed(&self) -> bool { self.phase == Phase::Closed }

    fn total(&self) -> u64 { self.copier.transferred() + self.epilogue_written }

    fn epilogue_len(&self) -> u64 {
        self.frame
            .as_ref()
            .map_or(0, |frame| frame.epilogue().len() as u64)
    }

    /// Write until the next progress event, or to the end of the body.
    async fn step(&mut self) -> io::Result<Option<ProgressStatus>> {
        loop {
            match self.phase {
                Phase::Preamble => {
                    if let Some(frame) = &self.frame {
                        self.sink.send(frame.preamble().clone()).await?;
                    }
                    self.phase = Phase::File;
                }
                Phase::File => match self.copier.step(&mut self.reader, &mut self.sink).await? {
                    Some(progress) => {
                        self.check_length(false)?;
                        return Ok(Some(progress));
                    }
                    None => {
                        self.check_length(true)?;
                        self.phase = Phase::Epilogue;
                    }
                },
                Phase::Epilogue => {
                    if let Some(frame) = &self.frame {
                        self.sink.send(frame.epilogue().clone()).await?;
                        self.epilogue_written = frame.epilogue().len() as u64;
                    }
                    self.sink.close();
                    self.phase = Phase::Closed;
                    return Ok(None);
                }
                Phase::Closed => return Ok(None),
            }
        }
    }

    /// A fixed-length body must carry exactly the declared number of bytes.
    fn check_length(&self, finished: bool) -> io::Result<()> {
        let Some(declared) = self.declared else {
            return Ok(());
        };
        let expected = self.copier.transferred() + self.epilogue_len();
        if expected > declared || (finished && expected != declared) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("body length mismatch: declared {declared} bytes, source delivered {expected}"),
            ));
        }
        Ok(())
    }
}

/// The sending half of the request body channel.
struct BodySender(Option<mpsc::Sender<io::Result<Bytes>>>);

impl BodySender {
    async fn send(&mut self, bytes: Bytes) -> io::Result<()> {
        let sender = self.0.as_ref().ok_or_else(body_closed)?;
        sender.send(Ok(bytes)).await.map_err(|_| body_closed())
    }

    /// Ends the body stream.
    fn close(&mut self) { self.0 = None; }
}

impl ChunkSink for BodySender {
    async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.send(Bytes::copy_from_slice(chunk)).await
    }

    async fn finish(&mut self) -> io::Result<()> { Ok(()) }
}

fn body_closed() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "request body closed by the client")
}
