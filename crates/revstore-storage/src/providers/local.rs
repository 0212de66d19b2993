//! Local filesystem storage provider.

use std::io::SeekFrom;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use revstore_core::error::{AppError, ErrorKind};
use revstore_core::result::AppResult;
use revstore_core::traits::{DestinationPoint, SourcePoint, StorageProvider};

use crate::transfer::{StreamSource, WriterDestination};

/// Local filesystem storage provider. One file per blob under a root
/// directory.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory for all stored blobs.
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Root directory of this provider.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Map a blob name to its path. Names are flat.
    fn resolve(&self, name: &str) -> AppResult<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(AppError::storage(format!("Invalid blob name: {name:?}")));
        }
        Ok(self.root.join(name))
    }
}

fn io_error(action: &str, name: &str, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::with_source(ErrorKind::Storage, format!("Blob not found: {name}"), e)
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to {action} blob: {name}"), e)
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn create(&self, name: &str) -> AppResult<()> {
        let path = self.resolve(name)?;
        fs::File::create(&path)
            .await
            .map_err(|e| io_error("create", name, e))?;
        debug!(name, "Created blob");
        Ok(())
    }

    async fn truncate(&self, name: &str) -> AppResult<()> {
        let path = self.resolve(name)?;
        fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .await
            .map_err(|e| io_error("truncate", name, e))?;
        debug!(name, "Truncated blob");
        Ok(())
    }

    async fn open_for_read(
        &self,
        name: &str,
        offset: u64,
        limit: u64,
        buffer_size: usize,
    ) -> AppResult<Box<dyn SourcePoint>> {
        let path = self.resolve(name)?;
        let mut file = fs::File::open(&path)
            .await
            .map_err(|e| io_error("open", name, e))?;

        let length = file
            .metadata()
            .await
            .map_err(|e| io_error("stat", name, e))?
            .len();
        let end = offset.checked_add(limit).filter(|end| *end <= length);
        if end.is_none() {
            return Err(AppError::storage(format!(
                "Window {offset}+{limit} exceeds blob {name} of length {length}"
            )));
        }

        file.seek(SeekFrom::Start(offset))
            .await
            .map_err(|e| io_error("seek", name, e))?;

        debug!(name, offset, limit, "Opened blob for reading");
        Ok(Box::new(StreamSource::from_reader(
            file.take(limit),
            buffer_size,
        )))
    }

    async fn open_for_write(&self, name: &str) -> AppResult<Box<dyn DestinationPoint>> {
        let path = self.resolve(name)?;
        let file = fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .await
            .map_err(|e| io_error("open", name, e))?;
        debug!(name, "Opened blob for writing");
        Ok(Box::new(WriterDestination::new(file)))
    }

    async fn delete(&self, name: &str) -> AppResult<()> {
        let path = self.resolve(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(name, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("delete", name, e)),
        }
    }

    async fn exists(&self, name: &str) -> AppResult<bool> {
        let path = self.resolve(name)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| io_error("stat", name, e))
    }

    async fn length(&self, name: &str) -> AppResult<u64> {
        let path = self.resolve(name)?;
        let meta = fs::metadata(&path)
            .await
            .map_err(|e| io_error("stat", name, e))?;
        Ok(meta.len())
    }
}
