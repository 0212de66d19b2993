//! Upload of file content.

use std::sync::Arc;

use revstore_core::promise::{Deferred, Promise};
use revstore_core::result::AppResult;
use revstore_core::traits::SourcePoint;
use revstore_core::types::FileId;
use revstore_entity::revision::{FileDescriptor, RevisionRepository};

use crate::lifecycle::RevisionLifecycle;

use super::listener::UploadListener;
use super::{load_revision, log_failure};

/// Stores the content of `New` revisions.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// Revision repository.
    revisions: Arc<RevisionRepository>,
    /// Lifecycle operations.
    lifecycle: Arc<RevisionLifecycle>,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(revisions: Arc<RevisionRepository>, lifecycle: Arc<RevisionLifecycle>) -> Self {
        Self {
            revisions,
            lifecycle,
        }
    }

    /// Transfer `content_size` bytes from `source` into the file.
    ///
    /// The listener hears exactly one of `on_upload` or `on_error`; the same
    /// outcome is returned.
    pub async fn upload_file_content(
        &self,
        file_id: &str,
        content_size: u64,
        source: Box<dyn SourcePoint>,
        listener: &mut dyn UploadListener,
    ) -> AppResult<FileDescriptor> {
        match self.upload(file_id, content_size, source).await {
            Ok(descriptor) => {
                listener.on_upload(&descriptor);
                Ok(descriptor)
            }
            Err(e) => {
                log_failure("upload", file_id, &e);
                listener.on_error(&e);
                Err(e)
            }
        }
    }

    /// Run the upload on a background task and return its promise.
    pub fn upload_in_background(
        &self,
        file_id: String,
        content_size: u64,
        source: Box<dyn SourcePoint>,
    ) -> Promise<FileDescriptor> {
        let (mut deferred, promise) = Deferred::pair();
        let service = self.clone();
        tokio::spawn(async move {
            let _ = service
                .upload_file_content(&file_id, content_size, source, &mut deferred)
                .await;
        });
        promise
    }

    async fn upload(
        &self,
        file_id: &str,
        content_size: u64,
        source: Box<dyn SourcePoint>,
    ) -> AppResult<FileDescriptor> {
        let file_id = FileId::parse(file_id)?;
        let mut revision = load_revision(self.revisions.as_ref(), &file_id).await?;

        self.lifecycle
            .upload_file_content(&mut revision, content_size, source)
            .await?;
        self.revisions.save(&revision).await?;

        Ok(FileDescriptor::from(&revision))
    }
}
