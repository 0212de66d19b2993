//! File services: management, upload and range download.

pub mod download;
pub mod listener;
pub mod management;
pub mod upload;

pub use download::{DownloadRequest, DownloadService, DownloadSummary};
pub use listener::{DownloadListener, LoggingListener, UploadListener};
pub use management::ManagementService;
pub use upload::UploadService;

use revstore_core::error::AppError;
use revstore_core::result::AppResult;
use revstore_core::types::FileId;
use revstore_entity::revision::{FileRevision, RevisionRepository};

/// Load a revision or fail with a not-found business error.
pub(crate) async fn load_revision(
    revisions: &RevisionRepository,
    file_id: &FileId,
) -> AppResult<FileRevision> {
    revisions
        .find_by_id(file_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
}

/// Log an error with the severity its class calls for.
pub(crate) fn log_failure(operation: &str, file_id: &str, error: &AppError) {
    if error.is_business() {
        tracing::warn!(operation, file_id, error = %error, "Request rejected");
    } else {
        tracing::error!(operation, file_id, error = %error, "Request failed");
    }
}
