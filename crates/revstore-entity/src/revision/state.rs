//! Lifecycle state machine of a stored file.
//!
//! Every state change goes through [`FileState::apply`]. The function is
//! pure: callers evaluate it before any side effect, perform the side
//! effect, then commit the returned state.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use revstore_core::error::{AppError, ErrorKind};

/// Lifecycle state of a file revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    /// Blob allocated, no content yet.
    New,
    /// Content present and immutable; length known.
    Uploaded,
    /// Content present and being replicated elsewhere.
    Distributing,
    /// Blob deleted. Terminal.
    Disposed,
}

/// An operation requested on a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Store content into the blob.
    Upload,
    /// Read content from the blob.
    Download,
    /// Delete the blob.
    Dispose,
    /// Start replicating content.
    Distribute,
    /// Replication finished.
    Distributed,
}

/// A transition the current state does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Content was uploaded before.
    #[error("content is already uploaded")]
    AlreadyUploaded,
    /// No content has been uploaded yet.
    #[error("content is not uploaded")]
    NotUploaded,
    /// The file is disposed.
    #[error("file is disposed")]
    Disposed,
    /// The event makes no sense in the current state.
    #[error("{event:?} is not allowed in state {state}")]
    NotAllowed {
        /// State the revision is in.
        state: FileState,
        /// Rejected event.
        event: LifecycleEvent,
    },
}

impl FileState {
    /// Compute the state after `event`, or why the event is rejected.
    pub fn apply(self, event: LifecycleEvent) -> Result<FileState, LifecycleError> {
        use FileState::*;
        use LifecycleEvent::*;

        match (self, event) {
            (Disposed, Dispose) => Err(LifecycleError::Disposed),
            (_, Dispose) => Ok(Disposed),
            (Disposed, _) => Err(LifecycleError::Disposed),

            (New, Upload) => Ok(Uploaded),
            (Uploaded | Distributing, Upload) => Err(LifecycleError::AlreadyUploaded),

            (New, Download | Distribute) => Err(LifecycleError::NotUploaded),
            (Uploaded | Distributing, Download) => Ok(self),

            (Uploaded, Distribute) => Ok(Distributing),
            (Distributing, Distributed) => Ok(Uploaded),
            (state, event @ (Distribute | Distributed)) => {
                Err(LifecycleError::NotAllowed { state, event })
            }
        }
    }

    /// Whether content is present and `total_length` is authoritative.
    pub fn has_content(&self) -> bool {
        matches!(self, Self::Uploaded | Self::Distributing)
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Disposed)
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Uploaded => "uploaded",
            Self::Distributing => "distributing",
            Self::Disposed => "disposed",
        }
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl LifecycleError {
    /// The application error kind this rejection maps to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyUploaded => ErrorKind::AlreadyUploaded,
            Self::NotUploaded => ErrorKind::NotUploaded,
            Self::Disposed => ErrorKind::Disposed,
            Self::NotAllowed { .. } => ErrorKind::Validation,
        }
    }

    /// Convert into an application error naming the file.
    pub fn for_file(self, file_id: impl fmt::Display) -> AppError {
        AppError::new(self.kind(), format!("File {file_id}: {self}"))
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        AppError::new(err.kind(), err.to_string())
    }
}
