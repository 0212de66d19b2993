//! Generic repository trait for metadata access.

use async_trait::async_trait;

use crate::result::AppResult;

/// Generic metadata repository.
///
/// Defined with generic type parameters so each aggregate gets a strongly
/// typed repository. The core only needs load-by-id and save; concurrency
/// control between writers of the same id is the implementation's concern.
#[async_trait]
pub trait Repository<Entity, Id>: Send + Sync + std::fmt::Debug + 'static
where
    Entity: Send + Sync + 'static,
    Id: Send + Sync + ?Sized + 'static,
{
    /// Find an entity by its identifier.
    async fn find_by_id(&self, id: &Id) -> AppResult<Option<Entity>>;

    /// Insert or replace an entity.
    async fn save(&self, entity: &Entity) -> AppResult<()>;

    /// Delete an entity by its identifier. Returns `true` if it existed.
    async fn delete(&self, id: &Id) -> AppResult<bool>;
}
