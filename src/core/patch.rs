//! Partial updates through the accessor table

use crate::core::entity::Queryable;
use crate::core::error::{EntityError, QueryError, RegistrarResult};
use crate::core::field::{FieldKind, FieldValue};
use crate::core::schema::FieldDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single `(field, new value)` change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPatch {
    #[serde(alias = "Field", alias = "PropertyName", alias = "propertyName")]
    pub field: String,

    #[serde(default, alias = "Value")]
    pub value: Value,
}

impl FieldPatch {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Turn a sparse JSON object (`{"room_number": "B12", "capacity": 30}`)
/// into one patch per key.
pub fn patches_from_json(object: Map<String, Value>) -> Vec<FieldPatch> {
    object
        .into_iter()
        .map(|(field, value)| FieldPatch { field, value })
        .collect()
}

/// Apply `patches` to `entity`, all or nothing.
///
/// Every patch is validated first: the field must exist
/// (`UnknownProperty`), be writable (`ReadOnlyField`) and the value must
/// convert to the field's type (`ValueConversion`, which also covers
/// `null` on a non-nullable field and out-of-range numbers). `entity` is
/// only modified when every patch succeeds.
pub fn apply_patch<T: Queryable + Clone>(entity: &mut T, patches: &[FieldPatch]) -> RegistrarResult<()> {
    let schema = T::schema();

    let mut resolved: Vec<(&FieldDescriptor<T>, FieldValue, &FieldPatch)> =
        Vec::with_capacity(patches.len());

    for patch in patches {
        let field = schema.field(&patch.field)?;
        if !field.is_writable() {
            return Err(EntityError::ReadOnlyField {
                entity_type: T::entity_type().to_string(),
                field: field.name().to_string(),
            }
            .into());
        }

        let value = field
            .kind()
            .coerce(&patch.value)
            .map_err(|reason| conversion_error(field.name(), field.kind(), patch, &reason))?;
        if value.is_null() && !field.is_nullable() {
            return Err(conversion_error(field.name(), field.kind(), patch, "property is not nullable").into());
        }

        resolved.push((field, value, patch));
    }

    let mut draft = entity.clone();
    for (field, value, patch) in resolved {
        field
            .write(&mut draft, value)
            .map_err(|_| conversion_error(field.name(), field.kind(), patch, "value is out of range"))?;
    }

    *entity = draft;
    Ok(())
}

fn conversion_error(property: &str, kind: FieldKind, patch: &FieldPatch, reason: &str) -> QueryError {
    QueryError::ValueConversion {
        property: property.to_string(),
        kind,
        value: patch.value.to_string(),
        reason: reason.to_string(),
    }
}
