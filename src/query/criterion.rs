//! Filter criteria and their compiled predicates

use crate::core::entity::Queryable;
use crate::core::error::QueryError;
use crate::core::field::{FieldKind, FieldValue};
use crate::core::schema::Getter;
use crate::query::operator::FilterOperator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// One `(property, operator, value)` condition.
///
/// Accepts both `camelCase` and `PascalCase` keys when deserialized:
///
/// ```json
/// { "PropertyName": "Status", "Operator": "Equal", "Value": "Active" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriterion {
    #[serde(alias = "PropertyName", alias = "property_name", alias = "property")]
    pub property_name: String,

    #[serde(alias = "Operator", alias = "op")]
    pub operator: FilterOperator,

    /// Untyped literal, coerced to the property's kind at compile time
    #[serde(default, alias = "Value")]
    pub value: Value,
}

impl FilterCriterion {
    pub fn new(
        property_name: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            operator,
            value: value.into(),
        }
    }

    /// Resolve the property against `T`'s accessor table and coerce the
    /// operand.
    ///
    /// Fails with `UnknownProperty`, `UnsupportedOperator` or
    /// `ValueConversion`, checked in that order.
    pub fn compile<T: Queryable>(&self) -> Result<CompiledCriterion<T>, QueryError> {
        let field = T::schema().field(&self.property_name)?;
        let kind = field.kind();

        if !self.operator.supports(kind) {
            return Err(QueryError::UnsupportedOperator {
                property: field.name().to_string(),
                operator: self.operator,
                kind,
            });
        }

        let operand = if self.operator.takes_list() {
            let Value::Array(items) = &self.value else {
                return Err(self.conversion_error(field.name(), kind, "expected a list of values"));
            };
            let values = items
                .iter()
                .map(|item| {
                    kind.coerce(item)
                        .map_err(|reason| self.conversion_error(field.name(), kind, &reason))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Operand::Set(values)
        } else {
            let value = kind
                .coerce(&self.value)
                .map_err(|reason| self.conversion_error(field.name(), kind, &reason))?;
            if value.is_null() && !self.operator.accepts_null() {
                return Err(self.conversion_error(
                    field.name(),
                    kind,
                    "null can only be compared with equal, not_equal or in",
                ));
            }
            Operand::Single(value)
        };

        Ok(CompiledCriterion {
            property: field.name(),
            getter: field.getter(),
            operator: self.operator,
            operand,
        })
    }

    fn conversion_error(&self, property: &str, kind: FieldKind, reason: &str) -> QueryError {
        QueryError::ValueConversion {
            property: property.to_string(),
            kind,
            value: self.value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Single(FieldValue),
    Set(Vec<FieldValue>),
}

/// A criterion resolved against one entity type, ready to evaluate
pub struct CompiledCriterion<T> {
    property: &'static str,
    getter: Getter<T>,
    operator: FilterOperator,
    operand: Operand,
}

impl<T> CompiledCriterion<T> {
    /// The canonical name of the filtered property
    pub fn property(&self) -> &'static str {
        self.property
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    /// Evaluate the criterion against one record.
    ///
    /// A null field value satisfies only `Equal null`, `NotEqual x` for
    /// non-null `x`, and `In` lists containing null.
    pub fn matches(&self, entity: &T) -> bool {
        let actual = (self.getter)(entity);

        match (&self.operand, self.operator) {
            (Operand::Set(values), _) => values.iter().any(|v| values_equal(&actual, v)),
            (Operand::Single(expected), FilterOperator::Equal) => values_equal(&actual, expected),
            (Operand::Single(expected), FilterOperator::NotEqual) => {
                !values_equal(&actual, expected)
            }
            (Operand::Single(expected), FilterOperator::Contains) => {
                string_test(&actual, expected, |a, b| a.contains(b))
            }
            (Operand::Single(expected), FilterOperator::StartsWith) => {
                string_test(&actual, expected, |a, b| a.starts_with(b))
            }
            (Operand::Single(expected), FilterOperator::EndsWith) => {
                string_test(&actual, expected, |a, b| a.ends_with(b))
            }
            (Operand::Single(expected), op) => actual
                .partial_compare(expected)
                .is_some_and(|ordering| op.eval_ordering(ordering)),
        }
    }
}

fn values_equal(a: &FieldValue, b: &FieldValue) -> bool {
    match (a, b) {
        (FieldValue::Null, FieldValue::Null) => true,
        (FieldValue::Null, _) | (_, FieldValue::Null) => false,
        _ => a.partial_compare(b) == Some(Ordering::Equal),
    }
}

fn string_test(actual: &FieldValue, expected: &FieldValue, test: fn(&str, &str) -> bool) -> bool {
    match (actual.as_string(), expected.as_string()) {
        (Some(a), Some(b)) => test(a, b),
        _ => false,
    }
}
