//! Metadata store construction.

use std::sync::Arc;

use tracing::info;

use revstore_core::config::{MetadataBackend, MetadataConfig};
use revstore_core::result::AppResult;
use revstore_entity::revision::RevisionRepository;

use crate::repositories::{JsonRevisionRepository, MemoryRevisionRepository};

/// Shared handle to the revision repository.
pub type RevisionStore = Arc<RevisionRepository>;

/// Build the configured revision repository.
pub async fn build_revision_store(config: &MetadataConfig) -> AppResult<RevisionStore> {
    let store: RevisionStore = match config.backend {
        MetadataBackend::Memory => Arc::new(MemoryRevisionRepository::new()),
        MetadataBackend::Json => Arc::new(JsonRevisionRepository::open(&config.directory).await?),
    };
    info!(backend = ?config.backend, "Metadata store ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use revstore_core::types::FileId;

    use super::*;

    #[tokio::test]
    async fn test_build_json_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = MetadataConfig {
            backend: MetadataBackend::Json,
            directory: dir.path().join("meta").display().to_string(),
        };
        let store = build_revision_store(&config).await.unwrap();
        let id = FileId::parse("n-1-q").unwrap();
        assert!(store.find_by_id(&id).await.unwrap().is_none());
        assert!(dir.path().join("meta").is_dir());
    }
}
