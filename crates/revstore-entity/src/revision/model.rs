//! File revision aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use revstore_core::error::AppError;
use revstore_core::types::FileId;

use super::state::{FileState, LifecycleEvent};

/// How a client should present downloaded content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentDisposition {
    /// Display in place.
    #[default]
    Inline,
    /// Save as a file.
    Attachment,
}

impl ContentDisposition {
    /// Return the disposition as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
        }
    }
}

/// Client-supplied attributes of a new file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionAttributes {
    /// The file name (including extension).
    pub file_name: String,
    /// MIME type of the content.
    pub media_type: String,
    /// Presentation hint.
    #[serde(default)]
    pub content_disposition: ContentDisposition,
}

impl RevisionAttributes {
    /// Attributes with the default `application/octet-stream` media type.
    pub fn named(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: "application/octet-stream".to_string(),
            content_disposition: ContentDisposition::default(),
        }
    }

    /// Override the media type.
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    /// Override the content disposition.
    pub fn with_disposition(mut self, disposition: ContentDisposition) -> Self {
        self.content_disposition = disposition;
        self
    }
}

/// A stored file: identity, metadata, and lifecycle state.
///
/// `total_length` is only meaningful once the state has content
/// (see [`FileState::has_content`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRevision {
    /// Identifier of the record and name of the blob.
    pub file_id: FileId,
    /// The file name (including extension).
    pub file_name: String,
    /// MIME type of the content.
    pub media_type: String,
    /// Presentation hint.
    pub content_disposition: ContentDisposition,
    /// Content length in bytes; 0 until uploaded.
    pub total_length: u64,
    /// Lifecycle state.
    pub state: FileState,
    /// When the revision was created.
    pub created_at: DateTime<Utc>,
    /// When the revision last changed state.
    pub updated_at: DateTime<Utc>,
}

impl FileRevision {
    /// Build a revision in the `New` state.
    pub fn new(file_id: FileId, attributes: RevisionAttributes) -> Self {
        let now = Utc::now();
        Self {
            file_id,
            file_name: attributes.file_name,
            media_type: attributes.media_type,
            content_disposition: attributes.content_disposition,
            total_length: 0,
            state: FileState::New,
            created_at: now,
            updated_at: now,
        }
    }

    /// Evaluate `event` without changing anything.
    pub fn check(&self, event: LifecycleEvent) -> Result<FileState, AppError> {
        self.state
            .apply(event)
            .map_err(|err| err.for_file(&self.file_id))
    }

    /// Commit an upload of `length` bytes.
    pub fn mark_uploaded(&mut self, length: u64) -> Result<(), AppError> {
        self.state = self.check(LifecycleEvent::Upload)?;
        self.total_length = length;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Commit disposal.
    pub fn mark_disposed(&mut self) -> Result<(), AppError> {
        self.state = self.check(LifecycleEvent::Dispose)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Commit the start or end of distribution.
    pub fn mark_distribution(&mut self, event: LifecycleEvent) -> Result<(), AppError> {
        if !matches!(
            event,
            LifecycleEvent::Distribute | LifecycleEvent::Distributed
        ) {
            return Err(AppError::internal(format!(
                "{event:?} is not a distribution event"
            )));
        }
        self.state = self.check(event)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.file_name)
            .map(|ext| ext.to_lowercase())
    }
}
