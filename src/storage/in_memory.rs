//! In-memory implementation of RecordStore for testing and development

use crate::core::entity::Entity;
use crate::core::error::StorageError;
use crate::core::store::RecordStore;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// In-memory record store
///
/// Keeps records in insertion order, so listing without a sort returns
/// them in the order they were created. Uses RwLock for thread-safe access.
#[derive(Clone)]
pub struct InMemoryStore<T> {
    records: Arc<RwLock<IndexMap<Uuid, T>>>,
}

impl<T: Entity> InMemoryStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Create a store pre-filled with `records`. Later duplicates of an id
    /// replace earlier ones in place.
    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        let map = records.into_iter().map(|r| (r.id(), r)).collect();
        Self {
            records: Arc::new(RwLock::new(map)),
        }
    }

    fn lock_error<G>(&self, err: PoisonError<G>) -> StorageError {
        StorageError::LockPoisoned {
            store: T::entity_type().to_string(),
            message: err.to_string(),
        }
    }
}

impl<T: Entity> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> RecordStore<T> for InMemoryStore<T> {
    async fn load_all(&self) -> Result<Vec<T>, StorageError> {
        let records = self.records.read().map_err(|e| self.lock_error(e))?;

        Ok(records.values().cloned().collect())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<T>, StorageError> {
        let records = self.records.read().map_err(|e| self.lock_error(e))?;

        Ok(records.get(id).cloned())
    }

    async fn insert(&self, entity: T) -> Result<bool, StorageError> {
        let mut records = self.records.write().map_err(|e| self.lock_error(e))?;

        if records.contains_key(&entity.id()) {
            return Ok(false);
        }
        records.insert(entity.id(), entity);

        Ok(true)
    }

    async fn replace(&self, entity: T) -> Result<bool, StorageError> {
        let mut records = self.records.write().map_err(|e| self.lock_error(e))?;

        match records.get_mut(&entity.id()) {
            Some(slot) => {
                *slot = entity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: &Uuid) -> Result<Option<T>, StorageError> {
        let mut records = self.records.write().map_err(|e| self.lock_error(e))?;

        Ok(records.shift_remove(id))
    }

    async fn count(&self) -> Result<usize, StorageError> {
        let records = self.records.read().map_err(|e| self.lock_error(e))?;

        Ok(records.len())
    }
}
