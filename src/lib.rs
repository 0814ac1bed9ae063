//! # Registrar
//!
//! A storage-agnostic query engine and generic CRUD layer for
//! multi-entity administrative data (schools, staff, exams, fees, ...).
//!
//! ## Features
//!
//! - **Dynamic Queries**: filter, search, sort and paginate any entity by
//!   property names that arrive at runtime
//! - **Accessor Tables**: every entity registers name → getter functions
//!   once; unknown names are a lookup error, never evaluated
//! - **Typed Errors**: each malformed request maps to a precise error code
//! - **Generic CRUD**: one service for every entity type, configured per
//!   entity through YAML (searchable fields, default ordering)
//! - **Partial Updates**: field-level patches validated through the same
//!   accessor table
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use registrar::prelude::*;
//!
//! impl_queryable_entity!(
//!     Pupil,
//!     "pupil",
//!     ["first_name", "last_name"],
//!     {
//!         first_name: String,
//!         last_name: String,
//!         year: i32,
//!     }
//! );
//!
//! let store = InMemoryStore::with_records(pupils);
//! let service: EntityService<Pupil, _> = EntityService::new(store);
//!
//! let query = ListParams {
//!     search_term: Some("smith".into()),
//!     sort_field: Some("LastName".into()),
//!     ..Default::default()
//! }
//! .into_query(&PaginationConfig::default())?;
//!
//! let page = service.list(&query).await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod query;
pub mod services;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        entity::{Entity, Queryable},
        error::{EntityError, QueryError, RegistrarError, RegistrarResult},
        field::{FieldKind, FieldType, FieldValue},
        patch::{FieldPatch, apply_patch, patches_from_json},
        schema::EntitySchema,
        service::DataService,
        store::RecordStore,
    };

    // === Macros ===
    pub use crate::impl_queryable_entity;

    // === Query Engine ===
    pub use crate::query::{
        FilterCriterion, FilterOperator, ListParams, ListQuery, Page, PageRequest,
        PaginationMeta, SortDirection, SortSpec,
    };

    // === Services & Storage ===
    pub use crate::services::{EntityService, RelatedRegistry, RelatedSource};
    pub use crate::storage::InMemoryStore;

    // === Config ===
    pub use crate::config::{
        EntityConfig, EntitySettings, IncludeConfig, PaginationConfig, RegistrarConfig,
    };

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
