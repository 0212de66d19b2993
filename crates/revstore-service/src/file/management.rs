//! File management: descriptors, creation and disposal.

use std::sync::Arc;

use tracing::info;

use revstore_core::result::AppResult;
use revstore_core::traits::IdGenerator;
use revstore_core::types::FileId;
use revstore_entity::revision::{FileDescriptor, RevisionAttributes, RevisionRepository};

use crate::lifecycle::RevisionLifecycle;

use super::{load_revision, log_failure};

/// Creates, describes and disposes file revisions.
#[derive(Debug, Clone)]
pub struct ManagementService {
    /// Revision repository.
    revisions: Arc<RevisionRepository>,
    /// Lifecycle operations.
    lifecycle: Arc<RevisionLifecycle>,
    /// Identifier source for new files.
    ids: Arc<dyn IdGenerator>,
}

impl ManagementService {
    /// Creates a new management service.
    pub fn new(
        revisions: Arc<RevisionRepository>,
        lifecycle: Arc<RevisionLifecycle>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            revisions,
            lifecycle,
            ids,
        }
    }

    /// Describe a file, or `None` if it is unknown.
    pub async fn get_file_descriptor(&self, file_id: &str) -> AppResult<Option<FileDescriptor>> {
        let file_id = FileId::parse(file_id)?;
        let revision = self.revisions.find_by_id(&file_id).await?;
        Ok(revision.as_ref().map(FileDescriptor::from))
    }

    /// Allocate a new file in the `New` state and return its id.
    pub async fn create_file_revision(&self, attributes: RevisionAttributes) -> AppResult<FileId> {
        let file_id = FileId::parse(self.ids.next_value())?;
        let revision = self
            .lifecycle
            .create_file(file_id.clone(), attributes)
            .await?;
        self.revisions.save(&revision).await?;

        info!(
            file_id = %file_id,
            file_name = %revision.file_name,
            media_type = %revision.media_type,
            "Created file revision"
        );
        Ok(file_id)
    }

    /// Dispose a file: delete its content and mark it `Disposed`.
    pub async fn dispose_file(&self, file_id: &str) -> AppResult<()> {
        let result = self.dispose_inner(file_id).await;
        if let Err(e) = &result {
            log_failure("dispose", file_id, e);
        }
        result
    }

    async fn dispose_inner(&self, file_id: &str) -> AppResult<()> {
        let file_id = FileId::parse(file_id)?;
        let mut revision = load_revision(self.revisions.as_ref(), &file_id).await?;
        if self.lifecycle.dispose(&mut revision).await? {
            self.revisions.save(&revision).await?;
        }
        Ok(())
    }
}
