//! Core module containing fundamental traits and types

pub mod entity;
pub mod error;
pub mod field;
pub mod patch;
pub mod schema;
pub mod service;
pub mod store;

pub use entity::{Entity, Queryable};
pub use error::{
    ConfigError, EntityError, ErrorResponse, QueryError, RegistrarError, RegistrarResult,
    SchemaError, StorageError,
};
pub use field::{FieldKind, FieldType, FieldValue};
pub use patch::{FieldPatch, apply_patch, patches_from_json};
pub use schema::{EntitySchema, FieldDescriptor, SchemaBuilder};
pub use service::DataService;
pub use store::RecordStore;
