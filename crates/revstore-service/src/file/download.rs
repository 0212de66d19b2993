//! Range download: serves full, single-range and multi-range requests.
//!
//! The range spec is parsed before anything else, so a malformed request
//! never reaches the repository or storage. Resolved ranges are delivered
//! one after another in request order into the caller's destination, which
//! is disposed exactly once when the request ends.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use revstore_core::result::AppResult;
use revstore_core::traits::{DestinationPoint, PartInfo};
use revstore_core::types::{FileId, RangeRequest, ResolvedRange};
use revstore_entity::revision::{FileRevision, LifecycleEvent, RevisionRepository};

use crate::lifecycle::RevisionLifecycle;

use super::listener::DownloadListener;
use super::{load_revision, log_failure};

/// A download request.
pub struct DownloadRequest<'a> {
    /// File to read.
    pub file_id: &'a str,
    /// Range spec in `bytes=N?-N?(,N?-N?)*` form; `None` requests the
    /// whole content.
    pub range: Option<&'a str>,
    /// Receiver of the bytes. Disposed when the request ends.
    pub destination: &'a mut dyn DestinationPoint,
}

impl std::fmt::Debug for DownloadRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadRequest")
            .field("file_id", &self.file_id)
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

/// Outcome of a completed download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSummary {
    /// File that was read.
    pub file_id: FileId,
    /// Length of the whole file.
    pub total_length: u64,
    /// Delivered windows, in delivery order.
    pub ranges: Vec<ResolvedRange>,
    /// Content bytes delivered across all ranges.
    pub bytes: u64,
    /// Chunks delivered across all ranges.
    pub chunks: u64,
}

/// Serves content of uploaded files.
#[derive(Debug, Clone)]
pub struct DownloadService {
    /// Revision repository.
    revisions: Arc<RevisionRepository>,
    /// Lifecycle operations.
    lifecycle: Arc<RevisionLifecycle>,
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(revisions: Arc<RevisionRepository>, lifecycle: Arc<RevisionLifecycle>) -> Self {
        Self {
            revisions,
            lifecycle,
        }
    }

    /// Deliver the requested ranges of a file into the request's
    /// destination.
    ///
    /// The listener hears `on_range_complete` per delivered range, then
    /// exactly one of `on_complete` or `on_request_error`.
    pub async fn download_file(
        &self,
        request: DownloadRequest<'_>,
        listener: &mut dyn DownloadListener,
    ) -> AppResult<DownloadSummary> {
        let DownloadRequest {
            file_id,
            range,
            destination,
        } = request;

        let delivered = self.deliver(file_id, range, destination, listener).await;
        let disposed = destination.dispose().await;
        let outcome = delivered.and_then(|summary| disposed.map(|()| summary));

        match &outcome {
            Ok(summary) => {
                info!(
                    file_id = %summary.file_id,
                    ranges = summary.ranges.len(),
                    bytes = summary.bytes,
                    "Served download"
                );
                listener.on_complete(summary);
            }
            Err(e) => {
                log_failure("download", file_id, e);
                listener.on_request_error(file_id, e);
            }
        }
        outcome
    }

    async fn deliver(
        &self,
        file_id: &str,
        range: Option<&str>,
        destination: &mut dyn DestinationPoint,
        listener: &mut dyn DownloadListener,
    ) -> AppResult<DownloadSummary> {
        let request = RangeRequest::parse(range)?;
        let file_id = FileId::parse(file_id)?;
        let revision = load_revision(self.revisions.as_ref(), &file_id).await?;
        revision.check(LifecycleEvent::Download)?;

        let windows = request.resolve(revision.total_length)?;
        self.deliver_windows(&revision, &windows, destination, listener)
            .await
    }

    async fn deliver_windows(
        &self,
        revision: &FileRevision,
        windows: &[ResolvedRange],
        destination: &mut dyn DestinationPoint,
        listener: &mut dyn DownloadListener,
    ) -> AppResult<DownloadSummary> {
        let framed = windows.len() > 1;
        let mut summary = DownloadSummary {
            file_id: revision.file_id.clone(),
            total_length: revision.total_length,
            ranges: Vec::with_capacity(windows.len()),
            bytes: 0,
            chunks: 0,
        };

        for (index, window) in windows.iter().enumerate() {
            let part = PartInfo {
                index,
                count: windows.len(),
                range: *window,
                total_length: revision.total_length,
            };
            if framed {
                destination.begin_part(&part).await?;
            }

            let transferred = self
                .lifecycle
                .download_file(revision, &mut *destination, window.offset, window.count)
                .await?;

            summary.ranges.push(*window);
            summary.bytes += transferred.bytes;
            summary.chunks += transferred.chunks;
            listener.on_range_complete(&part, &transferred);
        }
        Ok(summary)
    }
}
