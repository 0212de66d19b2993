//! Outcome listeners for uploads and downloads.

use revstore_core::error::AppError;
use revstore_core::promise::Deferred;
use revstore_core::traits::{PartInfo, TransferSummary};
use revstore_entity::revision::FileDescriptor;

use super::download::DownloadSummary;

/// Receives the outcome of one upload. Exactly one method is called.
pub trait UploadListener: Send {
    /// The content was stored and the revision is `Uploaded`.
    fn on_upload(&mut self, descriptor: &FileDescriptor);

    /// The upload was rejected or failed.
    fn on_error(&mut self, error: &AppError);
}

/// Receives the progress and outcome of one download request.
///
/// Either `on_complete` or `on_request_error` is called, once, after any
/// number of `on_range_complete` calls.
pub trait DownloadListener: Send {
    /// The request was rejected or a transfer failed.
    fn on_request_error(&mut self, file_id: &str, error: &AppError);

    /// One range was delivered in full.
    fn on_range_complete(&mut self, _part: &PartInfo, _summary: &TransferSummary) {}

    /// Every range was delivered.
    fn on_complete(&mut self, _summary: &DownloadSummary) {}
}

/// Settles the deferred with the uploaded descriptor.
impl UploadListener for Deferred<FileDescriptor> {
    fn on_upload(&mut self, descriptor: &FileDescriptor) {
        self.resolve(descriptor.clone());
    }

    fn on_error(&mut self, error: &AppError) {
        self.reject(error.clone());
    }
}

/// Settles the deferred with the download summary.
impl DownloadListener for Deferred<DownloadSummary> {
    fn on_request_error(&mut self, _file_id: &str, error: &AppError) {
        self.reject(error.clone());
    }

    fn on_complete(&mut self, summary: &DownloadSummary) {
        self.resolve(summary.clone());
    }
}

/// Logs outcomes and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl UploadListener for LoggingListener {
    fn on_upload(&mut self, descriptor: &FileDescriptor) {
        tracing::debug!(file_id = %descriptor.file_id, "Upload listener notified");
    }

    fn on_error(&mut self, error: &AppError) {
        tracing::debug!(error = %error, "Upload listener notified of failure");
    }
}

impl DownloadListener for LoggingListener {
    fn on_request_error(&mut self, file_id: &str, error: &AppError) {
        tracing::debug!(file_id, error = %error, "Download listener notified of failure");
    }

    fn on_range_complete(&mut self, part: &PartInfo, summary: &TransferSummary) {
        tracing::debug!(
            index = part.index,
            offset = part.range.offset,
            bytes = summary.bytes,
            "Range delivered"
        );
    }
}
