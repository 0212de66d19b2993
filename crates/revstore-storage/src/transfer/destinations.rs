//! Stock destination endpoints.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use revstore_core::error::{AppError, ErrorKind};
use revstore_core::result::AppResult;
use revstore_core::traits::{DestinationPoint, PartInfo};

/// Bytes received for one part of a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPart {
    /// Part header, absent for writes that arrived before any `begin_part`.
    pub info: Option<PartInfo>,
    /// Chunks in arrival order.
    pub chunks: Vec<Bytes>,
}

impl RecordedPart {
    /// Concatenated part content.
    pub fn to_vec(&self) -> Vec<u8> {
        self.chunks.iter().flat_map(|c| c.iter().copied()).collect()
    }

    /// Number of bytes in this part.
    pub fn len(&self) -> usize {
        self.chunks.iter().map(Bytes::len).sum()
    }

    /// Whether no bytes arrived for this part.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collects everything written into memory, keeping part boundaries.
#[derive(Debug, Default)]
pub struct BufferDestination {
    parts: Vec<RecordedPart>,
    disposed: bool,
}

impl BufferDestination {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// All bytes received, across parts.
    pub fn to_vec(&self) -> Vec<u8> {
        self.parts.iter().flat_map(RecordedPart::to_vec).collect()
    }

    /// Received parts in order.
    pub fn parts(&self) -> &[RecordedPart] {
        &self.parts
    }

    /// Total bytes received.
    pub fn len(&self) -> usize {
        self.parts.iter().map(RecordedPart::len).sum()
    }

    /// Whether nothing was received.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `dispose` has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[async_trait]
impl DestinationPoint for BufferDestination {
    async fn write(&mut self, chunk: Bytes) -> AppResult<()> {
        if self.disposed {
            return Err(AppError::internal("Write to a disposed buffer"));
        }
        match self.parts.last_mut() {
            Some(part) => part.chunks.push(chunk),
            None => self.parts.push(RecordedPart {
                info: None,
                chunks: vec![chunk],
            }),
        }
        Ok(())
    }

    async fn begin_part(&mut self, part: &PartInfo) -> AppResult<()> {
        self.parts.push(RecordedPart {
            info: Some(*part),
            chunks: Vec::new(),
        });
        Ok(())
    }

    async fn dispose(&mut self) -> AppResult<()> {
        self.disposed = true;
        Ok(())
    }
}

/// Writes chunks to any async writer and flushes it on dispose.
#[derive(Debug)]
pub struct WriterDestination<W> {
    writer: W,
    written: u64,
}

impl<W> WriterDestination<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> DestinationPoint for WriterDestination<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write(&mut self, chunk: Bytes) -> AppResult<()> {
        self.writer
            .write_all(&chunk)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to write chunk", e))?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    async fn dispose(&mut self) -> AppResult<()> {
        self.writer
            .flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to flush writer", e))
    }
}

/// Lends a caller-owned destination to a single transfer.
///
/// Writes and part headers pass through; `dispose` is a no-op so the same
/// destination can receive several transfers in a row. The owner disposes
/// the underlying destination once it is done.
pub struct BorrowedDestination<'a> {
    inner: &'a mut dyn DestinationPoint,
}

impl<'a> BorrowedDestination<'a> {
    /// Borrow `inner` for one transfer.
    pub fn new(inner: &'a mut dyn DestinationPoint) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl DestinationPoint for BorrowedDestination<'_> {
    async fn write(&mut self, chunk: Bytes) -> AppResult<()> {
        self.inner.write(chunk).await
    }

    async fn begin_part(&mut self, part: &PartInfo) -> AppResult<()> {
        self.inner.begin_part(part).await
    }

    async fn dispose(&mut self) -> AppResult<()> {
        Ok(())
    }
}
