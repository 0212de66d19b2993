//! Revision repository backed by one JSON document per revision.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use revstore_core::error::{AppError, ErrorKind};
use revstore_core::result::AppResult;
use revstore_core::traits::Repository;
use revstore_core::types::FileId;
use revstore_entity::revision::FileRevision;

/// Stores each revision as `<directory>/<file id>.json`.
///
/// Writes go to a temporary file that is then renamed over the document,
/// so readers never observe a partial document.
#[derive(Debug, Clone)]
pub struct JsonRevisionRepository {
    directory: PathBuf,
}

impl JsonRevisionRepository {
    /// Open (and create if needed) the document directory.
    pub async fn open(directory: impl AsRef<Path>) -> AppResult<Self> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to create metadata directory: {}", directory.display()),
                e,
            )
        })?;
        Ok(Self { directory })
    }

    fn document_path(&self, id: &FileId) -> AppResult<PathBuf> {
        let name = id.as_str();
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(AppError::database(format!(
                "File id cannot name a metadata document: {name:?}"
            )));
        }
        Ok(self.directory.join(format!("{name}.json")))
    }
}

#[async_trait]
impl Repository<FileRevision, FileId> for JsonRevisionRepository {
    async fn find_by_id(&self, id: &FileId) -> AppResult<Option<FileRevision>> {
        let path = self.document_path(id)?;
        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to read revision {id}"),
                    e,
                ));
            }
        };
        let revision = serde_json::from_slice(&data)?;
        Ok(Some(revision))
    }

    async fn save(&self, entity: &FileRevision) -> AppResult<()> {
        let path = self.document_path(&entity.file_id)?;
        let staging = path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(entity)?;

        fs::write(&staging, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to write revision {}", entity.file_id),
                e,
            )
        })?;
        fs::rename(&staging, &path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to commit revision {}", entity.file_id),
                e,
            )
        })?;

        debug!(file_id = %entity.file_id, state = %entity.state, "Saved revision");
        Ok(())
    }

    async fn delete(&self, id: &FileId) -> AppResult<bool> {
        let path = self.document_path(id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Database,
                format!("Failed to delete revision {id}"),
                e,
            )),
        }
    }
}
