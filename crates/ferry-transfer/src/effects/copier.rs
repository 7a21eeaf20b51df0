use std::future::Future;
use std::io::{self, Write};

use flate2::write::GzDecoder;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::data::ProgressStatus;

/// Where copied bytes go.
pub trait ChunkSink: Send {
    fn write_chunk(&mut self, chunk: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    /// Called once after the source is exhausted.
    fn finish(&mut self) -> impl Future<Output = io::Result<()>> + Send;
}

impl ChunkSink for Vec<u8> {
    async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.extend_from_slice(chunk);
        Ok(())
    }

    async fn finish(&mut self) -> io::Result<()> { Ok(()) }
}

/// A file destination, optionally gunzipping what it is given.
pub struct FileSink<W> {
    writer:  W,
    decoder: Option<GzDecoder<Vec<u8>>>,
}

impl<W: AsyncWrite + Unpin + Send> FileSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            decoder: None,
        }
    }

    /// A sink that decodes a gzip stream before writing it.
    pub fn gzip(writer: W) -> Self {
        Self {
            writer,
            decoder: Some(GzDecoder::new(Vec::new())),
        }
    }

    pub fn into_inner(self) -> W { self.writer }
}

impl<W: AsyncWrite + Unpin + Send> ChunkSink for FileSink<W> {
    async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        let Some(decoder) = self.decoder.as_mut() else {
            return self.writer.write_all(chunk).await;
        };
        decoder.write_all(chunk)?;
        let decoded = std::mem::take(decoder.get_mut());
        self.writer.write_all(&decoded).await
    }

    async fn finish(&mut self) -> io::Result<()> {
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.try_finish()?;
            let decoded = std::mem::take(decoder.get_mut());
            self.writer.write_all(&decoded).await?;
        }
        self.writer.flush().await
    }
}

/// Moves bytes from a reader to a [`ChunkSink`], one buffer at a time.
///
/// Every successful read is written in full and reported as a
/// [`ProgressStatus`] carrying the running total. Nothing is batched or
/// throttled. An empty source still reports once, with zero bytes.
///
/// [`step`](Self::step) performs a single read/write so a caller can hand
/// each status to its consumer before moving the next chunk;
/// [`copy`](Self::copy) runs the loop to the end.
#[derive(Debug)]
pub struct StreamCopier {
    buffer:            Vec<u8>,
    transferred:       u64,
    content_length:    Option<u64>,
    length_computable: bool,
    reported:          bool,
    done:              bool,
}

impl StreamCopier {
    pub fn new(buffer_size: usize, content_length: Option<u64>, length_computable: bool) -> Self {
        Self {
            buffer: vec![0; buffer_size.max(1)],
            transferred: 0,
            content_length,
            length_computable,
            reported: false,
            done: false,
        }
    }

    /// Count `offset` bytes as already transferred.
    #[must_use]
    pub fn starting_at(mut self, offset: u64) -> Self {
        self.transferred = offset;
        self
    }

    pub fn transferred(&self) -> u64 { self.transferred }

    pub fn is_done(&self) -> bool { self.done }

    fn status(&self) -> ProgressStatus {
        ProgressStatus {
            bytes_transferred: self.transferred,
            content_length:    self.content_length,
            length_computable: self.length_computable,
        }
    }

    /// Move one chunk.
    ///
    /// Returns `Ok(None)` once the source is exhausted and the sink finished.
    pub async fn step<R, S>(
        &mut self,
        source: &mut R,
        sink: &mut S,
    ) -> io::Result<Option<ProgressStatus>>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
        S: ChunkSink + ?Sized,
    {
        if self.done {
            return Ok(None);
        }

        let read = source.read(&mut self.buffer).await?;
        if read == 0 {
            sink.finish().await?;
            self.done = true;
            if self.reported {
                return Ok(None);
            }
            self.reported = true;
            return Ok(Some(self.status()));
        }

        sink.write_chunk(&self.buffer[..read]).await?;
        self.transferred += read as u64;
        self.reported = true;
        tracing::trace!(bytes = self.transferred, chunk = read, "copied chunk");

        Ok(Some(self.status()))
    }

    /// Copy everything, calling `on_chunk` after every write.
    ///
    /// Returns the final running total.
    pub async fn copy<R, S, F>(&mut self, source: &mut R, sink: &mut S, mut on_chunk: F) -> io::Result<u64>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
        S: ChunkSink + ?Sized,
        F: FnMut(ProgressStatus),
    {
        while let Some(status) = self.step(source, sink).await? {
            on_chunk(status);
        }
        Ok(self.transferred)
    }
}
