//! Typed error handling for the registrar crate
//!
//! # Error Categories
//!
//! - [`QueryError`]: malformed list requests (pagination, filters, search, sort)
//! - [`EntityError`]: CRUD failures on a specific record
//! - [`StorageError`]: failures of the persistence handle
//! - [`ConfigError`]: configuration parsing and validation
//! - [`SchemaError`]: invalid accessor-table declarations
//!
//! Every error exposes a stable `error_code()` so an outer API layer can
//! map it to its own wire format without string matching.
//!
//! # Example
//!
//! ```rust,ignore
//! match service.list(&query).await {
//!     Ok(page) => render(page),
//!     Err(RegistrarError::Query(QueryError::UnknownProperty { property, .. })) => {
//!         bad_request(format!("no such field: {}", property))
//!     }
//!     Err(e) => internal(e.to_response()),
//! }
//! ```

use crate::core::field::FieldKind;
use crate::query::operator::FilterOperator;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for the registrar crate
#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Error response structure handed to whatever transport wraps the services
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl RegistrarError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            RegistrarError::Query(e) => e.error_code(),
            RegistrarError::Entity(e) => e.error_code(),
            RegistrarError::Storage(_) => "STORAGE_ERROR",
            RegistrarError::Config(_) => "CONFIG_ERROR",
            RegistrarError::Schema(_) => "SCHEMA_ERROR",
        }
    }

    /// Whether the error was caused by the caller's input rather than by the system
    pub fn is_client_error(&self) -> bool {
        matches!(self, RegistrarError::Query(_) | RegistrarError::Entity(_))
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            RegistrarError::Query(e) => e.details(),
            RegistrarError::Entity(EntityError::NotFound { entity_type, id })
            | RegistrarError::Entity(EntityError::AlreadyExists { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id.to_string()
                }))
            }
            RegistrarError::Entity(EntityError::ReadOnlyField { entity_type, field }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "field": field
                }))
            }
            _ => None,
        }
    }
}

// =============================================================================
// Query Errors
// =============================================================================

/// Errors raised while validating or executing a list query.
///
/// All of these are deterministic caller-input errors: retrying the same
/// request reproduces the same error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("page size must be at least 1 (got {page_size})")]
    InvalidPageSize { page_size: i64 },

    #[error("page number must be at least 1 (got {page_number})")]
    InvalidPageNumber { page_number: i64 },

    #[error("{entity_type} has no property '{property}'")]
    UnknownProperty {
        entity_type: String,
        property: String,
    },

    #[error("operator '{operator}' is not supported for {kind} property '{property}'")]
    UnsupportedOperator {
        property: String,
        operator: FilterOperator,
        kind: FieldKind,
    },

    #[error("cannot convert {value} to {kind} for property '{property}': {reason}")]
    ValueConversion {
        property: String,
        kind: FieldKind,
        value: String,
        reason: String,
    },

    #[error("sort direction must be 'asc' or 'desc' (got '{direction}')")]
    InvalidSortDirection { direction: String },
}

impl QueryError {
    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::InvalidPageSize { .. } => "INVALID_PAGE_SIZE",
            QueryError::InvalidPageNumber { .. } => "INVALID_PAGE_NUMBER",
            QueryError::UnknownProperty { .. } => "UNKNOWN_PROPERTY",
            QueryError::UnsupportedOperator { .. } => "UNSUPPORTED_OPERATOR",
            QueryError::ValueConversion { .. } => "VALUE_CONVERSION_FAILED",
            QueryError::InvalidSortDirection { .. } => "INVALID_SORT_DIRECTION",
        }
    }

    /// The property the error refers to, if any
    pub fn property(&self) -> Option<&str> {
        match self {
            QueryError::UnknownProperty { property, .. }
            | QueryError::UnsupportedOperator { property, .. }
            | QueryError::ValueConversion { property, .. } => Some(property),
            _ => None,
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            QueryError::InvalidPageSize { page_size } => {
                Some(serde_json::json!({ "page_size": page_size }))
            }
            QueryError::InvalidPageNumber { page_number } => {
                Some(serde_json::json!({ "page_number": page_number }))
            }
            QueryError::UnknownProperty {
                entity_type,
                property,
            } => Some(serde_json::json!({
                "entity_type": entity_type,
                "property": property
            })),
            QueryError::UnsupportedOperator {
                property,
                operator,
                kind,
            } => Some(serde_json::json!({
                "property": property,
                "operator": operator.as_str(),
                "kind": kind.as_str()
            })),
            QueryError::ValueConversion {
                property,
                kind,
                value,
                ..
            } => Some(serde_json::json!({
                "property": property,
                "kind": kind.as_str(),
                "value": value
            })),
            QueryError::InvalidSortDirection { direction } => {
                Some(serde_json::json!({ "direction": direction }))
            }
        }
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to entity operations
#[derive(Debug, Error)]
pub enum EntityError {
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: Uuid },

    #[error("{entity_type} with id '{id}' already exists")]
    AlreadyExists { entity_type: String, id: Uuid },

    #[error("field '{field}' of {entity_type} cannot be modified")]
    ReadOnlyField { entity_type: String, field: String },
}

impl EntityError {
    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::AlreadyExists { .. } => "ENTITY_ALREADY_EXISTS",
            EntityError::ReadOnlyField { .. } => "READ_ONLY_FIELD",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to the persistence handle behind a service
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{store} lock poisoned: {message}")]
    LockPoisoned { store: String, message: String },

    #[error("{backend} error: {message}")]
    Backend { backend: String, message: String },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config{}: {message}", .file.as_deref().map(|f| format!(" file '{}'", f)).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    #[error("invalid value '{value}' for '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    #[error("configuration for entity '{entity}' is invalid: {source}")]
    InvalidEntity {
        entity: String,
        #[source]
        source: QueryError,
    },

    #[error("inclusion rule on {entity}.{field} is invalid: {field} {message}")]
    InvalidInclude {
        entity: String,
        field: String,
        message: String,
    },
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors detected while building an entity's accessor table
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("{entity_type}: '{name}' is not a valid property name")]
    InvalidName { entity_type: String, name: String },

    #[error("{entity_type}: property '{name}' collides with '{existing}'")]
    DuplicateProperty {
        entity_type: String,
        name: String,
        existing: String,
    },

    #[error("{entity_type}: searchable property '{name}' is not declared")]
    UnknownSearchable { entity_type: String, name: String },

    #[error("{entity_type}: searchable property '{name}' is {kind}, not string")]
    NonStringSearchable {
        entity_type: String,
        name: String,
        kind: FieldKind,
    },
}

/// A specialized Result type for registrar operations
pub type RegistrarResult<T> = Result<T, RegistrarError>;
