//! Services built on the record store and the query engine

pub mod entity_service;
pub mod related;

pub use entity_service::EntityService;
pub use related::{RelatedRegistry, RelatedSource};
