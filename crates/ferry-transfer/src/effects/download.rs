use bytes::Bytes;
use futures_util::stream::{self, Stream};
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::core::{
    Cause, ContentEncoding, Stage, configure, content_length, is_success, length_computable,
    map_failure, validate,
};
use crate::data::{DownloadOptions, Headers, ProgressStatus, TransferComplete, TransferConfig, TransferResult};
use crate::effects::copier::{FileSink, StreamCopier};
use crate::effects::fs::{DirectoryCreator, LocalFs};
use crate::effects::http::{BoxStream, HttpClient, RequestBody};
use crate::error::{TransferError, TransportError};

type BodyReader = StreamReader<BoxStream<'static, Result<Bytes, TransportError>>, Bytes>;

/// Downloads a URL to a local file, reporting progress per chunk.
///
/// # Examples
///
/// ```no_run
/// use ferry_transfer::{DownloadOptions, Downloader, ReqwestClient, TransferResult};
/// use futures_util::StreamExt;
///
/// # async fn run() -> Result<(), ferry_transfer::TransferError> {
/// let downloader = Downloader::new(ReqwestClient::new());
/// let events = downloader.download(DownloadOptions::new("https://example.com/a.zip", "/tmp/a.zip"));
/// futures_util::pin_mut!(events);
///
/// while let Some(event) = events.next().await {
///     match event? {
///         TransferResult::Ongoing(p) => println!("{} bytes", p.bytes_transferred),
///         TransferResult::Complete(c) => println!("done: {}", c.status),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct Downloader<C, F = LocalFs> {
    client: C,
    fs:     F,
    config: TransferConfig,
}

impl<C: HttpClient> Downloader<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            fs: LocalFs,
            config: TransferConfig::default(),
        }
    }
}

impl<C: HttpClient, F: DirectoryCreator> Downloader<C, F> {
    /// Replace the filesystem collaborator.
    pub fn with_fs<G: DirectoryCreator>(self, fs: G) -> Downloader<C, G> {
        Downloader {
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

    /// Start a download.
    ///
    /// Nothing happens until the stream is polled. It yields an `Ongoing`
    /// event per chunk written, then one `Complete`, or a single error.
    /// Dropping it cancels the download and closes the connection and the
    /// destination file.
    pub fn download(
        &self,
        options: DownloadOptions,
    ) -> impl Stream<Item = Result<TransferResult, TransferError>> + Send + '_ {
        stream::unfold(State::Start(options), move |state| async move {
            let mut active = match state {
                State::Done => return None,
                State::Start(options) => match self.connect(options).await {
                    Ok(active) => Box::new(active),
                    Err(err) => return Some((Err(err), State::Done)),
                },
                State::Streaming(active) => active,
            };

            match active.advance().await {
                Ok(Some(progress)) => Some((Ok(TransferResult::Ongoing(progress)), State::Streaming(active))),
                Ok(None) => Some((Ok(TransferResult::Complete((*active).complete())), State::Done)),
                Err(err) => Some((Err(err), State::Done)),
            }
        })
    }

    /// Run a download to the end, calling `on_progress` per chunk.
    pub async fn download_with<P>(
        &self,
        options: DownloadOptions,
        on_progress: P,
    ) -> Result<TransferComplete, TransferError>
    where
        P: FnMut(&ProgressStatus),
    {
        super::drain(self.download(options), on_progress).await
    }

    async fn connect(&self, options: DownloadOptions) -> Result<ActiveDownload, TransferError> {
        let DownloadOptions {
            url,
            file_path,
            http,
        } = options;

        validate(&url, &file_path)?;
        debug!(%url, path = %file_path, "download validated");

        self.fs
            .create_parent_dirs(&file_path)
            .await
            .map_err(|e| map_failure(Stage::PreparingDirectory, &file_path, Cause::Io(&e)))?;

        let mut request = configure(&url, &http);
        self.config.apply_defaults(&mut request);
        let body = request.body.take().map_or(RequestBody::Empty, RequestBody::Bytes);

        let response = self
            .client
            .send(request, body)
            .await
            .map_err(|e| map_failure(Stage::of_send(&e), &url, Cause::Transport(&e)))?;
        debug!(%url, status = response.status, "download connected");

        if !is_success(response.status) {
            return Err(super::http_error(response).await);
        }

        let encoding = ContentEncoding::from_headers(&response.headers);
        let total = content_length(&response.headers);
        let computable = length_computable(total, &encoding);
        debug!(?encoding, ?total, computable, "download body written as received");

        let file = tokio::fs::File::create(ferry_fs::normalize_path(&file_path))
            .await
            .map_err(|e| map_failure(Stage::Streaming, &file_path, Cause::Io(&e)))?;
        let sink = FileSink::new(file);

        Ok(ActiveDownload {
            url,
            status: response.status,
            headers: response.headers,
            reader: StreamReader::new(response.body),
            sink,
            copier: StreamCopier::new(self.config.buffer_size(), total, computable),
        })
    }
}

enum State {
    Start(DownloadOptions),
    Streaming(Box<ActiveDownload>),
    Done,
}

/// Everything a download holds once connected. Dropping it releases the
/// connection and the destination file.
struct ActiveDownload {
    url:     String,
    status:  u16,
    headers: Headers,
    reader:  BodyReader,
    sink:    FileSink<tokio::fs::File>,
    copier:  StreamCopier,
}

impl ActiveDownload {
    async fn advance(&mut self) -> Result<Option<ProgressStatus>, TransferError> {
        self.copier
            .step(&mut self.reader, &mut self.sink)
            .await
            .map_err(|e| map_failure(Stage::Streaming, &self.url, Cause::Io(&e)))
    }

    fn complete(self) -> TransferComplete {
        debug!(url = %self.url, bytes = self.copier.transferred(), "download finished");
        TransferComplete {
            total_bytes:   self.copier.transferred(),
            status:        self.status,
            response_body: None,
            headers:       self.headers,
        }
    }
}
