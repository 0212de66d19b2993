//! Transfer scheduler backed by the worker pool.

use async_trait::async_trait;

use revstore_core::result::AppResult;
use revstore_storage::transfer::{TransferScheduler, Transmitter};

use crate::queue::Task;
use crate::runner::WorkerPool;

/// Runs dispatched transmitters on the worker pool.
///
/// `dispatch` returns once the transmitter is queued; the outcome reaches
/// the caller through the transmitter's completion callback.
#[derive(Debug, Clone)]
pub struct PooledScheduler {
    pool: WorkerPool,
}

impl PooledScheduler {
    /// Create a scheduler that submits to `pool`
    pub fn new(pool: WorkerPool) -> Self {
        Self { pool }
    }

    /// The underlying pool
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }
}

#[async_trait]
impl TransferScheduler for PooledScheduler {
    fn scheduler_type(&self) -> &str {
        "pooled"
    }

    async fn dispatch(&self, transmitter: Transmitter<'static>) -> AppResult<()> {
        // Reserve first: a refused task would drop the transmitter unfinished.
        let permit = match self.pool.reserve().await {
            Ok(permit) => permit,
            Err(e) => {
                transmitter.abort(e.clone()).await;
                return Err(e);
            }
        };
        permit.send(Task::new("transfer", async move {
            if let Err(e) = transmitter.start().await {
                tracing::debug!("Pooled transfer finished with an error: {}", e);
            }
        }));
        Ok(())
    }
}
