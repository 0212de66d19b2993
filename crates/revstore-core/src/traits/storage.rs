//! Storage provider trait for pluggable blob backends.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::traits::transfer::{DestinationPoint, SourcePoint};

/// Trait for physical blob storage backends.
///
/// Blobs are addressed by name (the file id). Reading and writing go
/// through transfer endpoints so content is never held in memory as a
/// whole. Implementations live in `revstore-storage`.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Allocate an empty blob, truncating any existing content.
    async fn create(&self, name: &str) -> AppResult<()>;

    /// Discard the content of an existing blob.
    async fn truncate(&self, name: &str) -> AppResult<()>;

    /// Open a source yielding at most `limit` bytes starting at `offset`,
    /// in chunks of at most `buffer_size` bytes.
    async fn open_for_read(
        &self,
        name: &str,
        offset: u64,
        limit: u64,
        buffer_size: usize,
    ) -> AppResult<Box<dyn SourcePoint>>;

    /// Open a destination that appends to the blob.
    async fn open_for_write(&self, name: &str) -> AppResult<Box<dyn DestinationPoint>>;

    /// Delete a blob. Deleting a missing blob is not an error.
    async fn delete(&self, name: &str) -> AppResult<()>;

    /// Check whether a blob exists.
    async fn exists(&self, name: &str) -> AppResult<bool>;

    /// Current length of a blob in bytes.
    async fn length(&self, name: &str) -> AppResult<u64>;
}
