//! Bounded task queue feeding the worker pool.

use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use tokio::sync::mpsc;

use revstore_core::error::AppError;
use revstore_core::result::AppResult;

/// A unit of work for the pool.
pub struct Task {
    /// Short label used in logs (e.g., "transfer", "settlement")
    pub name: &'static str,
    /// The work itself
    pub future: BoxFuture<'static, ()>,
}

impl Task {
    /// Wrap a future as a task
    pub fn new<F>(name: &'static str, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            name,
            future: Box::pin(future),
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("name", &self.name).finish()
    }
}

/// Submitting end of the pool's queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    sender: mpsc::Sender<Task>,
}

impl TaskQueue {
    /// Create a queue holding at most `capacity` waiting tasks
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<Task>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Enqueue a task, waiting for room if the queue is full
    pub async fn submit(&self, task: Task) -> AppResult<()> {
        let name = task.name;
        self.sender
            .send(task)
            .await
            .map_err(|_| AppError::internal(format!("Worker pool is shut down; dropped '{name}'")))
    }

    /// Wait for a free slot. Sending through the returned permit cannot
    /// fail, so work can be built only once the queue has accepted it.
    pub async fn reserve(&self) -> AppResult<mpsc::Permit<'_, Task>> {
        self.sender
            .reserve()
            .await
            .map_err(|_| AppError::internal("Worker pool is shut down"))
    }

    /// Enqueue a task without waiting
    pub fn try_submit(&self, task: Task) -> AppResult<()> {
        self.sender.try_send(task).map_err(|e| match e {
            mpsc::error::TrySendError::Full(task) => {
                AppError::internal(format!("Worker queue is full; dropped '{}'", task.name))
            }
            mpsc::error::TrySendError::Closed(task) => AppError::internal(format!(
                "Worker pool is shut down; dropped '{}'",
                task.name
            )),
        })
    }

    /// Number of free queue slots
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    /// Whether the pool has stopped accepting tasks
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
