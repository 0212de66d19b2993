//! Completion callbacks.

use async_trait::async_trait;
use tracing::debug;

use revstore_core::error::AppError;
use revstore_core::promise::{Deferred, Promise};
use revstore_core::traits::{CompletionCallback, TransferSummary};

/// Settles a [`Deferred`] with the transfer outcome.
#[derive(Debug)]
pub struct DeferredCallback {
    deferred: Deferred<TransferSummary>,
}

impl DeferredCallback {
    /// Report into an existing deferred.
    pub fn new(deferred: Deferred<TransferSummary>) -> Self {
        Self { deferred }
    }

    /// Create a callback together with the promise it settles.
    pub fn pair() -> (Self, Promise<TransferSummary>) {
        let (deferred, promise) = Deferred::pair();
        (Self::new(deferred), promise)
    }
}

#[async_trait]
impl CompletionCallback for DeferredCallback {
    async fn on_success(&mut self, summary: TransferSummary) {
        self.deferred.resolve(summary);
    }

    async fn on_error(&mut self, error: AppError) {
        self.deferred.reject(error);
    }
}

/// Ignores the outcome, for callers that read it from
/// [`Transmitter::start`](super::Transmitter::start) instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallback;

#[async_trait]
impl CompletionCallback for NoopCallback {
    async fn on_success(&mut self, _summary: TransferSummary) {}

    async fn on_error(&mut self, error: AppError) {
        debug!(error = %error, "Transfer failed");
    }
}
