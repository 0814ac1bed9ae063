//! Entity traits defining the core abstraction for all record types

use crate::core::schema::EntitySchema;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A record type whose fields can be addressed by name at runtime.
///
/// The accessor table is built once per type and reused for every
/// filter, sort, search and patch against that type.
pub trait Queryable: Sized + Send + Sync + 'static {
    /// The accessor table for this type
    fn schema() -> &'static EntitySchema<Self>;

    /// The entity type name used in errors and configuration (e.g. "staff")
    fn entity_type() -> &'static str {
        Self::schema().entity_type()
    }
}

/// Base trait for all persisted entities.
///
/// All entities have:
/// - id: Unique identifier
/// - created_at: Creation timestamp
/// - updated_at: Last modification timestamp
pub trait Entity: Queryable + Clone {
    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;

    /// Carry identity over from the stored version of this record.
    ///
    /// Used by full updates: the replacement keeps the stored id and
    /// creation time whatever the caller sent.
    fn adopt_identity(&mut self, id: Uuid, created_at: DateTime<Utc>);

    /// Update the updated_at timestamp to now
    fn touch(&mut self);
}
