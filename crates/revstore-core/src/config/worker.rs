//! Worker pool configuration.

use serde::{Deserialize, Serialize};

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of worker tasks draining the queue.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Maximum number of queued tasks before submitters wait.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_concurrency() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    256
}
