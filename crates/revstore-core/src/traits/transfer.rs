//! Endpoint contracts of the streaming transfer engine.
//!
//! A transfer moves bytes from a [`SourcePoint`] to a [`DestinationPoint`]
//! one chunk at a time. The destination paces the producer: the next
//! `read` is only issued once the previous `write` has returned, so at most
//! one chunk is in flight regardless of the total size.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::AppError;
use crate::result::AppResult;
use crate::types::range::ResolvedRange;

/// Producer end of a transfer.
#[async_trait]
pub trait SourcePoint: Send {
    /// Pull the next chunk. `Ok(None)` signals the source is exhausted.
    async fn read(&mut self) -> AppResult<Option<Bytes>>;

    /// Release underlying resources. Called exactly once by the transmitter.
    async fn dispose(&mut self) -> AppResult<()>;
}

/// Consumer end of a transfer.
#[async_trait]
pub trait DestinationPoint: Send {
    /// Consume one chunk. Returning is the request for the next one.
    async fn write(&mut self, chunk: Bytes) -> AppResult<()>;

    /// Called before the bytes of one part of a multi-part delivery.
    ///
    /// Destinations that need framing between ranges override this; the
    /// default does nothing.
    async fn begin_part(&mut self, _part: &PartInfo) -> AppResult<()> {
        Ok(())
    }

    /// Release underlying resources. Called exactly once by the transmitter.
    async fn dispose(&mut self) -> AppResult<()>;
}

/// Terminal notification for one transfer. Exactly one method is invoked.
#[async_trait]
pub trait CompletionCallback: Send {
    /// The source was exhausted and both endpoints disposed cleanly.
    async fn on_success(&mut self, summary: TransferSummary);

    /// The transfer failed. Both endpoints have already been disposed.
    async fn on_error(&mut self, error: AppError);
}

/// Counters of a finished transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct TransferSummary {
    /// Bytes delivered to the destination.
    pub bytes: u64,
    /// Number of chunks delivered.
    pub chunks: u64,
}

/// Position of one byte window within a multi-part delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartInfo {
    /// Zero-based index of this part.
    pub index: usize,
    /// Total number of parts in the delivery.
    pub count: usize,
    /// The byte window being delivered.
    pub range: ResolvedRange,
    /// Length of the whole resource.
    pub total_length: u64,
}
