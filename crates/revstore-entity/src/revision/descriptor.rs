//! Read model of a stored file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use revstore_core::types::FileId;

use super::model::{ContentDisposition, FileRevision};
use super::state::FileState;

/// What clients see of a file revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// File identifier.
    pub file_id: FileId,
    /// The file name.
    pub file_name: String,
    /// MIME type for Content-Type.
    pub media_type: String,
    /// Presentation hint for Content-Disposition.
    pub content_disposition: ContentDisposition,
    /// Content length in bytes, once uploaded.
    pub total_length: Option<u64>,
    /// Lifecycle state.
    pub state: FileState,
    /// When the revision was created.
    pub created_at: DateTime<Utc>,
    /// When the revision last changed.
    pub updated_at: DateTime<Utc>,
}

impl From<&FileRevision> for FileDescriptor {
    fn from(rev: &FileRevision) -> Self {
        Self {
            file_id: rev.file_id.clone(),
            file_name: rev.file_name.clone(),
            media_type: rev.media_type.clone(),
            content_disposition: rev.content_disposition,
            total_length: rev.state.has_content().then_some(rev.total_length),
            state: rev.state,
            created_at: rev.created_at,
            updated_at: rev.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revision::RevisionAttributes;

    #[test]
    fn test_length_hidden_until_uploaded() {
        let mut rev = FileRevision::new(
            FileId::parse("n-1-z").unwrap(),
            RevisionAttributes::named("a.bin"),
        );
        assert_eq!(FileDescriptor::from(&rev).total_length, None);

        rev.mark_uploaded(12).unwrap();
        let descriptor = FileDescriptor::from(&rev);
        assert_eq!(descriptor.total_length, Some(12));
        assert_eq!(descriptor.state, FileState::Uploaded);
    }
}
