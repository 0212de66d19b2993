//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field has a serde default so an empty file is a
//! valid configuration.

pub mod lifecycle;
pub mod logging;
pub mod storage;
pub mod transfer;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::lifecycle::{DisposePolicy, LifecycleConfig};
pub use self::logging::LoggingConfig;
pub use self::storage::{LocalStorageConfig, StorageConfig};
pub use self::transfer::{DispatchMode, TransferConfig};
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Identity of this storage node.
    #[serde(default)]
    pub node: NodeConfig,
    /// Physical storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Transfer engine settings.
    #[serde(default)]
    pub transfer: TransferConfig,
    /// File lifecycle settings.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    /// Metadata repository settings.
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Worker pool settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Node identity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Instance identifier embedded in every generated file id.
    #[serde(default = "default_node_id")]
    pub id: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            id: default_node_id(),
        }
    }
}

/// Which metadata repository implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataBackend {
    /// Process-local map; lost on restart.
    #[default]
    Memory,
    /// One JSON document per revision in a directory.
    Json,
}

/// Metadata repository configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Repository backend.
    #[serde(default)]
    pub backend: MetadataBackend,
    /// Directory holding revision documents for the `json` backend.
    #[serde(default = "default_metadata_directory")]
    pub directory: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            backend: MetadataBackend::default(),
            directory: default_metadata_directory(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the base file with an environment-specific overlay found next
    /// to it and environment variables prefixed with `REVSTORE__`.
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let overlay = match path.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{env}"),
            None => env.to_string(),
        };

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&overlay).required(false))
            .add_source(
                config::Environment::with_prefix("REVSTORE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.transfer.buffer_size_bytes == 0 {
            return Err(AppError::configuration(
                "transfer.buffer_size_bytes must be at least 1",
            ));
        }
        if self.worker.concurrency == 0 {
            return Err(AppError::configuration(
                "worker.concurrency must be at least 1",
            ));
        }
        if self.worker.queue_capacity == 0 {
            return Err(AppError::configuration(
                "worker.queue_capacity must be at least 1",
            ));
        }
        if self.node.id.trim().is_empty() {
            return Err(AppError::configuration("node.id must not be blank"));
        }
        Ok(())
    }
}

fn default_node_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn default_metadata_directory() -> String {
    "./data/metadata".to_string()
}
