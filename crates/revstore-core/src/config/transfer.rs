//! Transfer engine configuration.

use serde::{Deserialize, Serialize};

/// Where uploads run their transmitters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Drive the transfer on the calling task.
    #[default]
    Inline,
    /// Hand the transfer to the worker pool.
    Pooled,
}

/// Transfer engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Size of the single buffer a source fills per read.
    #[serde(default = "default_buffer_size")]
    pub buffer_size_bytes: usize,
    /// Upload dispatch mode.
    #[serde(default)]
    pub dispatch: DispatchMode,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            buffer_size_bytes: default_buffer_size(),
            dispatch: DispatchMode::default(),
        }
    }
}

fn default_buffer_size() -> usize {
    65_536 // 64 KiB
}
