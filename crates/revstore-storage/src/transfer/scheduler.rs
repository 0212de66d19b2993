//! Transfer scheduling.

use std::fmt::Debug;

use async_trait::async_trait;
use tracing::debug;

use revstore_core::result::AppResult;
use revstore_core::traits::{CompletionCallback, DestinationPoint, SourcePoint};

use super::transmitter::Transmitter;

/// Creates transmitters and decides where they run.
#[async_trait]
pub trait TransferScheduler: Send + Sync + Debug + 'static {
    /// Return the scheduler name (e.g., "inline", "pooled").
    fn scheduler_type(&self) -> &str;

    /// Bind a source, destination and callback into an idle transmitter.
    fn schedule<'a>(
        &self,
        source: Box<dyn SourcePoint + 'a>,
        destination: Box<dyn DestinationPoint + 'a>,
        callback: Box<dyn CompletionCallback + 'a>,
    ) -> Transmitter<'a> {
        Transmitter::new(source, destination, callback)
    }

    /// Hand an owned transmitter over for execution.
    ///
    /// The transfer outcome goes to the transmitter's callback. An error
    /// here means the transmitter could not be accepted at all.
    async fn dispatch(&self, transmitter: Transmitter<'static>) -> AppResult<()>;
}

/// Runs dispatched transmitters on the calling task.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineScheduler;

impl InlineScheduler {
    /// Create an inline scheduler.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransferScheduler for InlineScheduler {
    fn scheduler_type(&self) -> &str {
        "inline"
    }

    async fn dispatch(&self, transmitter: Transmitter<'static>) -> AppResult<()> {
        // The callback already carries the failure.
        if let Err(e) = transmitter.start().await {
            debug!(error = %e, "Inline transfer finished with an error");
        }
        Ok(())
    }
}
