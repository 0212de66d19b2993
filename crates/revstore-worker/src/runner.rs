//! Worker pool: drains the task queue with bounded concurrency.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore, mpsc, watch};
use tokio::task::JoinHandle;

use revstore_core::config::WorkerConfig;
use revstore_core::result::AppResult;

use crate::queue::{Task, TaskQueue};

/// How long shutdown waits for in-flight tasks.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed-size pool of workers fed by a bounded queue.
///
/// At most `concurrency` tasks run at once; at most `queue_capacity` wait.
/// Clones share the same pool.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    queue: TaskQueue,
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    concurrency: usize,
    cancel: watch::Sender<bool>,
    runner: Mutex<Option<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Start the pool's runner loop on the current runtime
    pub fn start(config: &WorkerConfig) -> Self {
        let concurrency = config.concurrency.max(1);
        let (queue, receiver) = TaskQueue::bounded(config.queue_capacity);
        let (cancel, cancel_rx) = watch::channel(false);

        let runner = tokio::spawn(run(receiver, cancel_rx, concurrency));

        tracing::info!(
            "Worker pool started with concurrency={}, queue_capacity={}",
            concurrency,
            config.queue_capacity
        );

        Self {
            queue,
            shared: Arc::new(Shared {
                concurrency,
                cancel,
                runner: Mutex::new(Some(runner)),
            }),
        }
    }

    /// The submitting end of the queue
    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    /// Number of tasks allowed to run at once
    pub fn concurrency(&self) -> usize {
        self.shared.concurrency
    }

    /// Enqueue a task, waiting for room if the queue is full
    pub async fn submit(&self, task: Task) -> AppResult<()> {
        self.queue.submit(task).await
    }

    /// Wait for a free queue slot
    pub async fn reserve(&self) -> AppResult<mpsc::Permit<'_, Task>> {
        self.queue.reserve().await
    }

    /// Enqueue a task without waiting
    pub fn try_submit(&self, task: Task) -> AppResult<()> {
        self.queue.try_submit(task)
    }

    /// Stop accepting tasks, run what is already queued, and wait for
    /// in-flight tasks to finish
    pub async fn shutdown(&self) {
        let _ = self.shared.cancel.send(true);
        let runner = self.shared.runner.lock().await.take();
        if let Some(runner) = runner {
            if let Err(e) = runner.await {
                tracing::error!("Worker pool runner terminated abnormally: {}", e);
            }
        }
    }
}

async fn run(
    mut receiver: mpsc::Receiver<Task>,
    mut cancel: watch::Receiver<bool>,
    concurrency: usize,
) {
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut draining = false;

    loop {
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        let task = if draining {
            receiver.recv().await
        } else {
            tokio::select! {
                task = receiver.recv() => task,
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        tracing::info!("Worker pool received shutdown signal");
                        receiver.close();
                        draining = true;
                    }
                    continue;
                }
            }
        };

        let Some(task) = task else {
            break;
        };

        tracing::trace!("Running task '{}'", task.name);
        tokio::spawn(async move {
            let _permit = permit;
            task.future.await;
        });
    }

    tracing::info!("Worker pool waiting for in-flight tasks to complete...");
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, semaphore.acquire_many(concurrency as u32)).await;
    tracing::info!("Worker pool shut down complete");
}
