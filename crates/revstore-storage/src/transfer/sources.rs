//! Stock source endpoints.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use revstore_core::error::{AppError, ErrorKind};
use revstore_core::result::AppResult;
use revstore_core::traits::SourcePoint;

/// A boxed stream of byte chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Serves an in-memory buffer in fixed-size chunks.
#[derive(Debug, Clone)]
pub struct BytesSource {
    remaining: Bytes,
    chunk_size: usize,
}

impl BytesSource {
    /// Serve `data` in chunks of at most `chunk_size` bytes.
    pub fn new(data: impl Into<Bytes>, chunk_size: usize) -> Self {
        Self {
            remaining: data.into(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Bytes not yet read.
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

#[async_trait]
impl SourcePoint for BytesSource {
    async fn read(&mut self) -> AppResult<Option<Bytes>> {
        if self.remaining.is_empty() {
            return Ok(None);
        }
        let take = self.chunk_size.min(self.remaining.len());
        Ok(Some(self.remaining.split_to(take)))
    }

    async fn dispose(&mut self) -> AppResult<()> {
        self.remaining = Bytes::new();
        Ok(())
    }
}

/// Adapts a byte stream into a source.
///
/// Stream items larger than the chunk limit are handed out in pieces.
pub struct StreamSource {
    stream: Option<ByteStream>,
    pending: Bytes,
    max_chunk: usize,
}

impl StreamSource {
    /// Wrap an existing stream, passing its items through unchanged.
    pub fn new(stream: ByteStream) -> Self {
        Self::with_max_chunk(stream, usize::MAX)
    }

    /// Wrap a stream, splitting items to at most `max_chunk` bytes.
    pub fn with_max_chunk(stream: ByteStream, max_chunk: usize) -> Self {
        Self {
            stream: Some(stream),
            pending: Bytes::new(),
            max_chunk: max_chunk.max(1),
        }
    }

    /// Read from an async reader in chunks of at most `buffer_size` bytes.
    pub fn from_reader<R>(reader: R, buffer_size: usize) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        let buffer_size = buffer_size.max(1);
        let stream = ReaderStream::with_capacity(reader, buffer_size);
        Self::with_max_chunk(Box::pin(stream), buffer_size)
    }

    fn take_pending(&mut self) -> Bytes {
        let take = self.max_chunk.min(self.pending.len());
        self.pending.split_to(take)
    }
}

impl std::fmt::Debug for StreamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSource")
            .field("open", &self.stream.is_some())
            .field("pending", &self.pending.len())
            .field("max_chunk", &self.max_chunk)
            .finish()
    }
}

#[async_trait]
impl SourcePoint for StreamSource {
    async fn read(&mut self) -> AppResult<Option<Bytes>> {
        if !self.pending.is_empty() {
            return Ok(Some(self.take_pending()));
        }
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };
        loop {
            match stream.next().await {
                Some(Ok(chunk)) if chunk.is_empty() => continue,
                Some(Ok(chunk)) => {
                    self.pending = chunk;
                    return Ok(Some(self.take_pending()));
                }
                Some(Err(e)) => {
                    return Err(AppError::with_source(
                        ErrorKind::Storage,
                        "Failed to read from source stream",
                        e,
                    ));
                }
                None => {
                    self.stream = None;
                    return Ok(None);
                }
            }
        }
    }

    async fn dispose(&mut self) -> AppResult<()> {
        self.stream = None;
        self.pending = Bytes::new();
        Ok(())
    }
}

/// Caps how many bytes an inner source may produce.
///
/// A chunk that would cross the limit fails the read with a data-transfer
/// error and is never handed on, so an overlong source stops the transfer
/// before anything past the limit reaches the destination.
pub struct LimitedSource<'a> {
    inner: Box<dyn SourcePoint + 'a>,
    limit: u64,
    produced: u64,
}

impl<'a> LimitedSource<'a> {
    /// Allow at most `limit` bytes out of `inner`.
    pub fn new(inner: Box<dyn SourcePoint + 'a>, limit: u64) -> Self {
        Self {
            inner,
            limit,
            produced: 0,
        }
    }

    /// Bytes handed on so far.
    pub fn produced(&self) -> u64 {
        self.produced
    }
}

impl std::fmt::Debug for LimitedSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimitedSource")
            .field("limit", &self.limit)
            .field("produced", &self.produced)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SourcePoint for LimitedSource<'_> {
    async fn read(&mut self) -> AppResult<Option<Bytes>> {
        let Some(chunk) = self.inner.read().await? else {
            return Ok(None);
        };
        let total = self.produced.saturating_add(chunk.len() as u64);
        if total > self.limit {
            return Err(AppError::data_transfer(format!(
                "Source produced more than the expected {} bytes",
                self.limit
            )));
        }
        self.produced = total;
        Ok(Some(chunk))
    }

    async fn dispose(&mut self) -> AppResult<()> {
        self.inner.dispose().await
    }
}
