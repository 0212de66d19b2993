//! Lifecycle operations of a file revision and their storage side effects.
//!
//! Every operation evaluates the transition on the revision first and only
//! touches storage once the transition is known to be legal. A rejected
//! operation leaves both the revision and the blob as they were.
//! Persisting the revision is the caller's job.

use std::sync::Arc;

use tracing::{debug, info, warn};

use revstore_core::config::{AppConfig, DisposePolicy};
use revstore_core::error::{AppError, ErrorKind};
use revstore_core::result::AppResult;
use revstore_core::traits::{DestinationPoint, SourcePoint, StorageProvider, TransferSummary};
use revstore_core::types::FileId;
use revstore_entity::revision::{FileRevision, LifecycleEvent, RevisionAttributes};
use revstore_storage::transfer::{
    BorrowedDestination, DeferredCallback, LimitedSource, NoopCallback, TransferScheduler,
};

/// Tunables of the lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleSettings {
    /// Chunk size for reads from storage.
    pub buffer_size: usize,
    /// Largest accepted upload in bytes.
    pub max_upload_size: u64,
    /// Behaviour of disposing an already disposed revision.
    pub dispose_policy: DisposePolicy,
}

impl LifecycleSettings {
    /// Extract the lifecycle settings from the application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            buffer_size: config.transfer.buffer_size_bytes,
            max_upload_size: config.storage.max_upload_size_bytes,
            dispose_policy: config.lifecycle.dispose_policy,
        }
    }
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Applies lifecycle transitions to revisions, performing the matching
/// storage operations.
#[derive(Debug, Clone)]
pub struct RevisionLifecycle {
    storage: Arc<dyn StorageProvider>,
    scheduler: Arc<dyn TransferScheduler>,
    settings: LifecycleSettings,
}

impl RevisionLifecycle {
    /// Creates a new lifecycle over a storage provider and a scheduler.
    pub fn new(
        storage: Arc<dyn StorageProvider>,
        scheduler: Arc<dyn TransferScheduler>,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            storage,
            scheduler,
            settings,
        }
    }

    /// Current settings.
    pub fn settings(&self) -> &LifecycleSettings {
        &self.settings
    }

    /// Allocate the blob for a new file and return its revision in `New`.
    ///
    /// An existing blob under `file_id` means the identifier generator
    /// handed out a duplicate, which is a fatal error.
    pub async fn create_file(
        &self,
        file_id: FileId,
        attributes: RevisionAttributes,
    ) -> AppResult<FileRevision> {
        if self.storage.exists(file_id.as_str()).await? {
            return Err(AppError::fatal(format!(
                "Blob for new file {file_id} already exists"
            )));
        }
        self.storage.create(file_id.as_str()).await?;
        debug!(file_id = %file_id, "Allocated blob");
        Ok(FileRevision::new(file_id, attributes))
    }

    /// Transfer `content_size` bytes from `source` into the revision's blob
    /// and move the revision to `Uploaded`.
    ///
    /// A source producing more than `content_size` bytes is cut off before
    /// the excess reaches storage. On any failure the blob is truncated and
    /// the revision stays `New`, so the upload can be retried.
    pub async fn upload_file_content(
        &self,
        revision: &mut FileRevision,
        content_size: u64,
        source: Box<dyn SourcePoint>,
    ) -> AppResult<TransferSummary> {
        if let Err(e) = revision.check(LifecycleEvent::Upload) {
            return Err(release(source, e).await);
        }
        if content_size > self.settings.max_upload_size {
            let e = AppError::validation(format!(
                "Upload of {content_size} bytes exceeds the limit of {} bytes",
                self.settings.max_upload_size
            ));
            return Err(release(source, e).await);
        }

        // A blob in `New` holds no committed content; drop leftovers of an
        // earlier attempt whose revision was never saved.
        let name = revision.file_id.as_str();
        let opened = match self.storage.truncate(name).await {
            Ok(()) => self.storage.open_for_write(name).await,
            Err(e) => Err(e),
        };
        let destination = match opened {
            Ok(destination) => destination,
            Err(e) => return Err(release(source, e).await),
        };

        let source = Box::new(LimitedSource::new(source, content_size));
        let (callback, promise) = DeferredCallback::pair();
        let transmitter = self
            .scheduler
            .schedule(source, destination, Box::new(callback));
        self.scheduler.dispatch(transmitter).await?;

        let outcome = promise.await.and_then(|summary| {
            if summary.bytes == content_size {
                Ok(summary)
            } else {
                Err(AppError::data_transfer(format!(
                    "Expected {content_size} bytes but received {}",
                    summary.bytes
                )))
            }
        });

        let summary = match outcome {
            Ok(summary) => summary,
            Err(e) => {
                if let Err(truncate_err) = self.storage.truncate(name).await {
                    warn!(
                        file_id = %revision.file_id,
                        error = %truncate_err,
                        "Failed to truncate blob after a failed upload"
                    );
                }
                return Err(e);
            }
        };

        revision.mark_uploaded(summary.bytes)?;
        info!(
            file_id = %revision.file_id,
            bytes = summary.bytes,
            chunks = summary.chunks,
            "Uploaded file content"
        );
        Ok(summary)
    }

    /// Deliver `size` bytes starting at `offset` into `destination`.
    ///
    /// The destination is lent to the transfer and stays open; the caller
    /// disposes it.
    pub async fn download_file(
        &self,
        revision: &FileRevision,
        destination: &mut dyn DestinationPoint,
        offset: u64,
        size: u64,
    ) -> AppResult<TransferSummary> {
        revision.check(LifecycleEvent::Download)?;

        let within = offset
            .checked_add(size)
            .is_some_and(|end| end <= revision.total_length);
        if !within {
            return Err(AppError::unsatisfiable_range(format!(
                "Window {offset}+{size} exceeds file {} of length {}",
                revision.file_id, revision.total_length
            )));
        }

        let source = self
            .storage
            .open_for_read(
                revision.file_id.as_str(),
                offset,
                size,
                self.settings.buffer_size,
            )
            .await?;
        let transmitter = self.scheduler.schedule(
            source,
            Box::new(BorrowedDestination::new(destination)),
            Box::new(NoopCallback),
        );
        transmitter.start().await
    }

    /// Delete the blob and move the revision to `Disposed`.
    ///
    /// Returns whether the revision changed. Disposing a disposed revision
    /// follows the configured [`DisposePolicy`].
    pub async fn dispose(&self, revision: &mut FileRevision) -> AppResult<bool> {
        if let Err(e) = revision.check(LifecycleEvent::Dispose) {
            return match (e.kind, self.settings.dispose_policy) {
                (ErrorKind::Disposed, DisposePolicy::Idempotent) => {
                    debug!(file_id = %revision.file_id, "File already disposed");
                    Ok(false)
                }
                _ => Err(e),
            };
        }

        self.storage.delete(revision.file_id.as_str()).await?;
        revision.mark_disposed()?;
        info!(file_id = %revision.file_id, "Disposed file");
        Ok(true)
    }
}

/// Dispose a source that will never be transferred and pass the error on.
async fn release(mut source: Box<dyn SourcePoint>, error: AppError) -> AppError {
    if let Err(e) = source.dispose().await {
        debug!(error = %e, "Failed to dispose rejected upload source");
    }
    error
}
