//! Persistence handle trait

use crate::core::entity::Entity;
use crate::core::error::StorageError;
use async_trait::async_trait;
use uuid::Uuid;

/// The persistence handle a service reads its source collection from.
///
/// Each method is atomic on its own; services compose them without
/// holding anything across calls.
#[async_trait]
pub trait RecordStore<T: Entity>: Send + Sync {
    /// Every stored record, in a stable order (insertion order for the
    /// in-memory store)
    async fn load_all(&self) -> Result<Vec<T>, StorageError>;

    async fn get(&self, id: &Uuid) -> Result<Option<T>, StorageError>;

    /// Store a new record. Returns `false` without storing when the id is taken.
    async fn insert(&self, entity: T) -> Result<bool, StorageError>;

    /// Overwrite the record with the same id. Returns `false` when there is none.
    async fn replace(&self, entity: T) -> Result<bool, StorageError>;

    /// Remove and return the record with `id`
    async fn remove(&self, id: &Uuid) -> Result<Option<T>, StorageError>;

    async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.load_all().await?.len())
    }
}
