//! Service trait for entity CRUD and list operations

use crate::core::entity::Entity;
use crate::core::error::RegistrarResult;
use crate::core::patch::FieldPatch;
use crate::query::engine::ListQuery;
use crate::query::page::Page;
use async_trait::async_trait;
use uuid::Uuid;

/// Service trait for managing entities of one type
///
/// Implementations provide CRUD operations plus the filtered, sorted,
/// paginated listing. The trait is agnostic to the underlying storage
/// mechanism.
#[async_trait]
pub trait DataService<T: Entity>: Send + Sync {
    /// Get an entity by ID
    async fn get(&self, id: &Uuid) -> RegistrarResult<Option<T>>;

    /// List one page of entities matching `query`
    async fn list(&self, query: &ListQuery) -> RegistrarResult<Page<T>>;

    /// Create a new entity
    async fn create(&self, entity: T) -> RegistrarResult<T>;

    /// Replace an existing entity, keeping its id and creation time
    async fn update(&self, id: &Uuid, entity: T) -> RegistrarResult<T>;

    /// Apply a sparse set of field changes to an existing entity
    async fn patch(&self, id: &Uuid, patches: &[FieldPatch]) -> RegistrarResult<T>;

    /// Delete an entity
    async fn delete(&self, id: &Uuid) -> RegistrarResult<()>;
}
