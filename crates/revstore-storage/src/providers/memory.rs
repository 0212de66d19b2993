//! In-memory storage provider.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use revstore_core::error::AppError;
use revstore_core::result::AppResult;
use revstore_core::traits::{DestinationPoint, SourcePoint, StorageProvider};

use crate::transfer::BytesSource;

/// Keeps every blob in process memory. Clones share the same blobs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageProvider {
    blobs: Arc<DashMap<String, Vec<u8>>>,
}

impl MemoryStorageProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn blob_count(&self) -> usize {
        self.blobs.len()
    }

    /// Copy of a blob's content.
    pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
        self.blobs.get(name).map(|blob| blob.clone())
    }
}

fn missing(name: &str) -> AppError {
    AppError::storage(format!("Blob not found: {name}"))
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn create(&self, name: &str) -> AppResult<()> {
        self.blobs.insert(name.to_string(), Vec::new());
        Ok(())
    }

    async fn truncate(&self, name: &str) -> AppResult<()> {
        let mut blob = self.blobs.get_mut(name).ok_or_else(|| missing(name))?;
        blob.clear();
        Ok(())
    }

    async fn open_for_read(
        &self,
        name: &str,
        offset: u64,
        limit: u64,
        buffer_size: usize,
    ) -> AppResult<Box<dyn SourcePoint>> {
        let blob = self.blobs.get(name).ok_or_else(|| missing(name))?;
        let length = blob.len() as u64;
        let end = offset
            .checked_add(limit)
            .filter(|end| *end <= length)
            .ok_or_else(|| {
                AppError::storage(format!(
                    "Window {offset}+{limit} exceeds blob {name} of length {length}"
                ))
            })?;
        let window = Bytes::copy_from_slice(&blob[offset as usize..end as usize]);
        Ok(Box::new(BytesSource::new(window, buffer_size)))
    }

    async fn open_for_write(&self, name: &str) -> AppResult<Box<dyn DestinationPoint>> {
        if !self.blobs.contains_key(name) {
            return Err(missing(name));
        }
        Ok(Box::new(MemoryBlobWriter {
            blobs: Arc::clone(&self.blobs),
            name: name.to_string(),
        }))
    }

    async fn delete(&self, name: &str) -> AppResult<()> {
        self.blobs.remove(name);
        Ok(())
    }

    async fn exists(&self, name: &str) -> AppResult<bool> {
        Ok(self.blobs.contains_key(name))
    }

    async fn length(&self, name: &str) -> AppResult<u64> {
        self.blobs
            .get(name)
            .map(|blob| blob.len() as u64)
            .ok_or_else(|| missing(name))
    }
}

/// Appends to one in-memory blob.
#[derive(Debug)]
struct MemoryBlobWriter {
    blobs: Arc<DashMap<String, Vec<u8>>>,
    name: String,
}

#[async_trait]
impl DestinationPoint for MemoryBlobWriter {
    async fn write(&mut self, chunk: Bytes) -> AppResult<()> {
        let mut blob = self
            .blobs
            .get_mut(&self.name)
            .ok_or_else(|| missing(&self.name))?;
        blob.extend_from_slice(&chunk);
        Ok(())
    }

    async fn dispose(&mut self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use revstore_core::error::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn test_append_and_window() {
        let provider = MemoryStorageProvider::new();
        provider.create("a").await.unwrap();

        let mut dest = provider.open_for_write("a").await.unwrap();
        dest.write(Bytes::from_static(b"hello ")).await.unwrap();
        dest.write(Bytes::from_static(b"world")).await.unwrap();
        dest.dispose().await.unwrap();
        assert_eq!(provider.contents("a").unwrap(), b"hello world");

        let mut source = provider.open_for_read("a", 6, 5, 64).await.unwrap();
        assert_eq!(source.read().await.unwrap().unwrap(), "world");
        assert!(source.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_blob() {
        let provider = MemoryStorageProvider::new();
        assert_eq!(
            provider.open_for_write("nope").await.err().unwrap().kind,
            ErrorKind::Storage
        );
        assert!(provider.open_for_read("nope", 0, 0, 1).await.is_err());
        provider.delete("nope").await.unwrap();
    }
}
