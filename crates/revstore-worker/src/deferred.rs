//! Deferred whose settlement runs on the worker pool.

use revstore_core::error::AppError;
use revstore_core::promise::{Deferred, Promise};
use revstore_core::result::AppResult;

use crate::queue::Task;
use crate::runner::WorkerPool;

/// Wraps a [`Deferred`] so `resolve`/`reject` return immediately and the
/// settlement, including observer notification, runs as one queued task.
///
/// Settlement order follows queue order, so the first call still wins.
#[derive(Debug, Clone)]
pub struct AsyncDeferred<T> {
    deferred: Deferred<T>,
    pool: WorkerPool,
}

impl<T: Clone + Send + 'static> AsyncDeferred<T> {
    /// Wrap an existing deferred
    pub fn new(deferred: Deferred<T>, pool: WorkerPool) -> Self {
        Self { deferred, pool }
    }

    /// Create a pending cell and return the queued handle with its promise
    pub fn pair(pool: WorkerPool) -> (Self, Promise<T>) {
        let (deferred, promise) = Deferred::pair();
        (Self::new(deferred, pool), promise)
    }

    /// An observer handle for the cell
    pub fn promise(&self) -> Promise<T> {
        self.deferred.promise()
    }

    /// Queue settlement with a value
    pub fn resolve(&self, value: T) -> AppResult<()> {
        self.queue_settlement(Ok(value))
    }

    /// Queue settlement with an error
    pub fn reject(&self, error: AppError) -> AppResult<()> {
        self.queue_settlement(Err(error))
    }

    /// Whether the cell has been settled
    pub fn is_settled(&self) -> bool {
        self.deferred.is_settled()
    }

    fn queue_settlement(&self, outcome: AppResult<T>) -> AppResult<()> {
        let deferred = self.deferred.clone();
        self.pool.try_submit(Task::new("settlement", async move {
            deferred.settle(outcome);
        }))
    }
}
