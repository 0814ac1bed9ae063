//! Free-text search across searchable string properties

use crate::core::entity::Queryable;
use crate::core::error::QueryError;
use crate::core::field::FieldKind;
use crate::core::schema::Getter;
use crate::query::operator::FilterOperator;

/// A search term resolved against one entity type.
///
/// Matches a record when at least one of the target properties contains
/// the term, ignoring case. Null property values never match.
pub struct CompiledSearch<T> {
    needle: String,
    getters: Vec<Getter<T>>,
}

impl<T: Queryable> CompiledSearch<T> {
    /// Compile `term` against `fields`, or against the properties `T`
    /// declares searchable when `fields` is `None`.
    ///
    /// The field list is validated even when the term is blank. Returns
    /// `Ok(None)` for an absent or blank term: no search is applied.
    pub fn compile(term: Option<&str>, fields: Option<&[String]>) -> Result<Option<Self>, QueryError> {
        let schema = T::schema();

        let getters = match fields {
            Some(names) => names
                .iter()
                .map(|name| {
                    let field = schema.field(name)?;
                    if field.kind() != FieldKind::String {
                        return Err(QueryError::UnsupportedOperator {
                            property: field.name().to_string(),
                            operator: FilterOperator::Contains,
                            kind: field.kind(),
                        });
                    }
                    Ok(field.getter())
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => schema.searchable_fields().map(|f| f.getter()).collect(),
        };

        let needle = match term.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_lowercase(),
            _ => return Ok(None),
        };

        Ok(Some(Self { needle, getters }))
    }
}

impl<T> CompiledSearch<T> {
    /// The normalized (trimmed, lowercased) search term
    pub fn term(&self) -> &str {
        &self.needle
    }

    pub fn matches(&self, entity: &T) -> bool {
        self.getters.iter().any(|getter| {
            getter(entity)
                .as_string()
                .is_some_and(|s| s.to_lowercase().contains(&self.needle))
        })
    }
}
