//! Storage provider implementations.

pub mod local;
pub mod memory;

use std::sync::Arc;

use tracing::info;

use revstore_core::config::storage::{StorageBackend, StorageConfig};
use revstore_core::result::AppResult;
use revstore_core::traits::StorageProvider;

pub use local::LocalStorageProvider;
pub use memory::MemoryStorageProvider;

/// Build the configured storage provider.
pub async fn build_provider(config: &StorageConfig) -> AppResult<Arc<dyn StorageProvider>> {
    let provider: Arc<dyn StorageProvider> = match config.provider {
        StorageBackend::Local => {
            Arc::new(LocalStorageProvider::new(&config.local.root_path).await?)
        }
        StorageBackend::Memory => Arc::new(MemoryStorageProvider::new()),
    };
    info!(provider = provider.provider_type(), "Storage provider ready");
    Ok(provider)
}
