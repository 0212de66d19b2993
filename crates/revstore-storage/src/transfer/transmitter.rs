//! The transfer loop driver.

use std::fmt;

use bytes::Bytes;
use tracing::debug;

use revstore_core::error::{AppError, ErrorKind};
use revstore_core::result::AppResult;
use revstore_core::traits::{CompletionCallback, DestinationPoint, SourcePoint, TransferSummary};

/// Where a transmitter is in its read/write cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferPhase {
    /// The next step pulls a chunk from the source.
    AwaitingRead,
    /// The next step hands this chunk to the destination.
    AwaitingWrite(Bytes),
    /// The source is exhausted.
    Done,
    /// A step failed.
    Failed,
}

/// Drives one source/destination pair to completion.
///
/// Chunks flow strictly in order: a chunk is written before the next one is
/// read, so only one chunk is ever held. On every exit path both endpoints
/// are disposed exactly once, then exactly one callback method runs.
pub struct Transmitter<'a> {
    source: Box<dyn SourcePoint + 'a>,
    destination: Box<dyn DestinationPoint + 'a>,
    callback: Box<dyn CompletionCallback + 'a>,
    phase: TransferPhase,
    summary: TransferSummary,
}

impl<'a> Transmitter<'a> {
    /// Create an idle transmitter. Nothing moves until [`start`](Self::start).
    pub fn new(
        source: Box<dyn SourcePoint + 'a>,
        destination: Box<dyn DestinationPoint + 'a>,
        callback: Box<dyn CompletionCallback + 'a>,
    ) -> Self {
        Self {
            source,
            destination,
            callback,
            phase: TransferPhase::AwaitingRead,
            summary: TransferSummary::default(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &TransferPhase {
        &self.phase
    }

    /// Run the transfer to completion on the calling task.
    ///
    /// The outcome is reported to the completion callback and returned.
    pub async fn start(mut self) -> AppResult<TransferSummary> {
        let driven = self.drive().await;

        let source_disposed = self.source.dispose().await.map_err(classify);
        let destination_disposed = self.destination.dispose().await.map_err(classify);

        let outcome = driven
            .and(source_disposed)
            .and(destination_disposed)
            .map(|()| self.summary);

        match &outcome {
            Ok(summary) => {
                debug!(
                    bytes = summary.bytes,
                    chunks = summary.chunks,
                    "Transfer completed"
                );
                self.callback.on_success(*summary).await;
            }
            Err(err) => {
                debug!(
                    error = %err,
                    bytes = self.summary.bytes,
                    "Transfer failed"
                );
                self.callback.on_error(err.clone()).await;
            }
        }
        outcome
    }

    /// Fail a transmitter that will never run.
    ///
    /// Both endpoints are disposed once and the callback hears `error`.
    /// Dispose failures are logged; `error` stays the reported outcome.
    pub async fn abort(mut self, error: AppError) {
        self.phase = TransferPhase::Failed;
        if let Err(e) = self.source.dispose().await {
            debug!(error = %e, "Failed to dispose source of an aborted transfer");
        }
        if let Err(e) = self.destination.dispose().await {
            debug!(error = %e, "Failed to dispose destination of an aborted transfer");
        }
        debug!(error = %error, "Transfer aborted before it started");
        self.callback.on_error(error).await;
    }

    async fn drive(&mut self) -> AppResult<()> {
        loop {
            match self.phase {
                TransferPhase::Done => return Ok(()),
                TransferPhase::Failed => {
                    return Err(AppError::fatal("Transmitter resumed after a failure"));
                }
                _ => {}
            }
            if let Err(err) = self.step().await {
                self.phase = TransferPhase::Failed;
                return Err(classify(err));
            }
        }
    }

    /// Advance by one read or one write.
    async fn step(&mut self) -> AppResult<()> {
        match std::mem::replace(&mut self.phase, TransferPhase::Failed) {
            TransferPhase::AwaitingRead => {
                self.phase = match self.source.read().await? {
                    Some(chunk) => TransferPhase::AwaitingWrite(chunk),
                    None => TransferPhase::Done,
                };
            }
            TransferPhase::AwaitingWrite(chunk) => {
                let len = chunk.len() as u64;
                if len > 0 {
                    self.destination.write(chunk).await?;
                    self.summary.bytes += len;
                    self.summary.chunks += 1;
                }
                self.phase = TransferPhase::AwaitingRead;
            }
            phase @ (TransferPhase::Done | TransferPhase::Failed) => {
                self.phase = phase;
                return Err(AppError::fatal("Transmitter stepped after finishing"));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Transmitter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transmitter")
            .field("phase", &self.phase)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

/// Endpoint I/O failures surface as data-transfer errors; business and
/// fatal errors keep their kind.
fn classify(err: AppError) -> AppError {
    match err.kind {
        ErrorKind::Storage | ErrorKind::Internal => {
            let message = format!("Data transfer failed: {}", err.message);
            AppError::with_source(ErrorKind::DataTransfer, message, err)
        }
        _ => err,
    }
}
