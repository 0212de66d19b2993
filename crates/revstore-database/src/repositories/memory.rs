//! In-memory revision repository.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use revstore_core::result::AppResult;
use revstore_core::traits::Repository;
use revstore_core::types::FileId;
use revstore_entity::revision::FileRevision;

/// Keeps revisions in a concurrent map. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryRevisionRepository {
    revisions: Arc<DashMap<FileId, FileRevision>>,
}

impl MemoryRevisionRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored revisions.
    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    /// Whether no revision is stored.
    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }
}

#[async_trait]
impl Repository<FileRevision, FileId> for MemoryRevisionRepository {
    async fn find_by_id(&self, id: &FileId) -> AppResult<Option<FileRevision>> {
        Ok(self.revisions.get(id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, entity: &FileRevision) -> AppResult<()> {
        self.revisions
            .insert(entity.file_id.clone(), entity.clone());
        Ok(())
    }

    async fn delete(&self, id: &FileId) -> AppResult<bool> {
        Ok(self.revisions.remove(id).is_some())
    }
}
