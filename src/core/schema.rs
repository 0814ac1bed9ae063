//! Per-entity accessor tables
//!
//! An [`EntitySchema`] maps property names to typed getter (and optional
//! setter) functions. It is the only way the query engine and the patch
//! logic touch entity fields: a property name coming from a request is
//! looked up in the table and either resolves to a registered accessor or
//! fails with [`QueryError::UnknownProperty`]. Nothing else is evaluated.
//!
//! Names are matched after normalization (ASCII case folded, underscores
//! dropped), so `FirstName`, `firstName` and `first_name` all resolve to
//! the same field.

use crate::core::error::{QueryError, SchemaError};
use crate::core::field::{FieldKind, FieldType, FieldValue};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Reads one field of `T`
pub type Getter<T> = fn(&T) -> FieldValue;

/// Writes one field of `T`; hands the value back when it does not fit
pub type Setter<T> = fn(&mut T, FieldValue) -> Result<(), FieldValue>;

/// A single registered property
pub struct FieldDescriptor<T> {
    name: &'static str,
    kind: FieldKind,
    nullable: bool,
    searchable: bool,
    getter: Getter<T>,
    setter: Option<Setter<T>>,
}

impl<T> FieldDescriptor<T> {
    /// The canonical (declared) property name
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether the property takes part in free-text search by default
    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    pub fn getter(&self) -> Getter<T> {
        self.getter
    }

    /// Read this property from an entity
    pub fn read(&self, entity: &T) -> FieldValue {
        (self.getter)(entity)
    }

    /// Write this property on an entity.
    ///
    /// Read-only properties reject every value.
    pub fn write(&self, entity: &mut T, value: FieldValue) -> Result<(), FieldValue> {
        match self.setter {
            Some(setter) => setter(entity, value),
            None => Err(value),
        }
    }
}

/// The accessor table of one entity type.
///
/// Built once per type (the entity macro caches it in a `OnceLock`) and
/// shared read-only by every caller afterwards.
pub struct EntitySchema<T> {
    entity_type: &'static str,
    fields: Vec<FieldDescriptor<T>>,
    index: HashMap<String, usize>,
}

impl<T> EntitySchema<T> {
    /// Start declaring the table for `entity_type`
    pub fn builder(entity_type: &'static str) -> SchemaBuilder<T> {
        SchemaBuilder {
            entity_type,
            fields: Vec::new(),
            searchable: Vec::new(),
        }
    }

    pub fn entity_type(&self) -> &'static str {
        self.entity_type
    }

    /// Resolve a property by name
    pub fn field(&self, name: &str) -> Result<&FieldDescriptor<T>, QueryError> {
        normalize_property_name(name)
            .and_then(|key| self.index.get(&key))
            .map(|&i| &self.fields[i])
            .ok_or_else(|| QueryError::UnknownProperty {
                entity_type: self.entity_type.to_string(),
                property: name.to_string(),
            })
    }

    /// All properties in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor<T>> {
        self.fields.iter()
    }

    /// Properties searched by default, in declaration order
    pub fn searchable_fields(&self) -> impl Iterator<Item = &FieldDescriptor<T>> {
        self.fields.iter().filter(|f| f.searchable)
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }
}

/// Normalized lookup key for a property name.
///
/// Returns `None` when `name` is not a plain identifier; such names can
/// never resolve.
pub fn normalize_property_name(name: &str) -> Option<String> {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    let identifier = IDENTIFIER.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,63}$").expect("identifier pattern is valid")
    });

    if !identifier.is_match(name) {
        return None;
    }

    let key: String = name
        .chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    (!key.is_empty()).then_some(key)
}

/// Builder for [`EntitySchema`]
pub struct SchemaBuilder<T> {
    entity_type: &'static str,
    fields: Vec<FieldDescriptor<T>>,
    searchable: Vec<&'static str>,
}

impl<T> SchemaBuilder<T> {
    /// Register a read-only property of Rust type `F`
    pub fn field<F: FieldType>(mut self, name: &'static str, getter: Getter<T>) -> Self {
        self.fields.push(FieldDescriptor {
            name,
            kind: F::KIND,
            nullable: F::NULLABLE,
            searchable: false,
            getter,
            setter: None,
        });
        self
    }

    /// Register a property of Rust type `F` that patches may modify
    pub fn writable<F: FieldType>(
        mut self,
        name: &'static str,
        getter: Getter<T>,
        setter: Setter<T>,
    ) -> Self {
        self.fields.push(FieldDescriptor {
            name,
            kind: F::KIND,
            nullable: F::NULLABLE,
            searchable: false,
            getter,
            setter: Some(setter),
        });
        self
    }

    /// Mark string properties as searchable by default
    pub fn searchable(mut self, names: &[&'static str]) -> Self {
        self.searchable.extend_from_slice(names);
        self
    }

    /// Validate the declaration and build the table
    pub fn build(self) -> Result<EntitySchema<T>, SchemaError> {
        let entity_type = self.entity_type;
        let mut index = HashMap::with_capacity(self.fields.len());

        for (i, field) in self.fields.iter().enumerate() {
            let key = normalize_property_name(field.name).ok_or_else(|| SchemaError::InvalidName {
                entity_type: entity_type.to_string(),
                name: field.name.to_string(),
            })?;
            if let Some(&existing) = index.get(&key) {
                let existing: &FieldDescriptor<T> = &self.fields[existing];
                return Err(SchemaError::DuplicateProperty {
                    entity_type: entity_type.to_string(),
                    name: field.name.to_string(),
                    existing: existing.name.to_string(),
                });
            }
            index.insert(key, i);
        }

        let mut fields = self.fields;
        for name in self.searchable {
            let position = normalize_property_name(name)
                .and_then(|key| index.get(&key).copied())
                .ok_or_else(|| SchemaError::UnknownSearchable {
                    entity_type: entity_type.to_string(),
                    name: name.to_string(),
                })?;
            let field = &mut fields[position];
            if field.kind != FieldKind::String {
                return Err(SchemaError::NonStringSearchable {
                    entity_type: entity_type.to_string(),
                    name: name.to_string(),
                    kind: field.kind,
                });
            }
            field.searchable = true;
        }

        Ok(EntitySchema {
            entity_type,
            fields,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pupil {
        first_name: String,
        year: i64,
        nickname: Option<String>,
    }

    fn pupil_schema() -> SchemaBuilder<Pupil> {
        EntitySchema::<Pupil>::builder("pupil")
            .writable::<String>(
                "first_name",
                |p| FieldValue::String(p.first_name.clone()),
                |p, v| {
                    p.first_name = String::from_field_value(v.clone()).ok_or(v)?;
                    Ok(())
                },
            )
            .field::<i64>("year", |p| FieldValue::Integer(p.year))
            .field::<Option<String>>("nickname", |p| p.nickname.to_field_value())
    }

    fn pupil() -> Pupil {
        Pupil {
            first_name: "Ada".into(),
            year: 3,
            nickname: None,
        }
    }

    #[test]
    fn test_normalize_property_name() {
        assert_eq!(normalize_property_name("FirstName").as_deref(), Some("firstname"));
        assert_eq!(normalize_property_name("first_name").as_deref(), Some("firstname"));
        assert_eq!(normalize_property_name("first name"), None);
        assert_eq!(normalize_property_name("a.b"), None);
        assert_eq!(normalize_property_name("x; drop"), None);
        assert_eq!(normalize_property_name("__"), None);
        assert_eq!(normalize_property_name(""), None);
    }

    #[test]
    fn test_lookup_is_case_and_underscore_insensitive() {
        let schema = pupil_schema().build().unwrap();
        let field = schema.field("FirstName").unwrap();
        assert_eq!(field.name(), "first_name");
        assert_eq!(field.kind(), FieldKind::String);
        assert_eq!(field.read(&pupil()), FieldValue::String("Ada".into()));
    }

    #[test]
    fn test_unknown_property() {
        let schema = pupil_schema().build().unwrap();
        let err = schema.field("shoe_size").err().unwrap();
        assert_eq!(
            err,
            QueryError::UnknownProperty {
                entity_type: "pupil".into(),
                property: "shoe_size".into(),
            }
        );
        assert!(schema.field("year)").is_err());
    }

    #[test]
    fn test_nullable_flag() {
        let schema = pupil_schema().build().unwrap();
        assert!(schema.field("nickname").unwrap().is_nullable());
        assert!(!schema.field("year").unwrap().is_nullable());
    }

    #[test]
    fn test_write_respects_setter() {
        let schema = pupil_schema().build().unwrap();
        let mut p = pupil();

        let name = schema.field("first_name").unwrap();
        assert!(name.is_writable());
        name.write(&mut p, FieldValue::String("Grace".into())).unwrap();
        assert_eq!(p.first_name, "Grace");
        assert!(name.write(&mut p, FieldValue::Null).is_err());

        let year = schema.field("year").unwrap();
        assert!(!year.is_writable());
        assert!(year.write(&mut p, FieldValue::Integer(4)).is_err());
        assert_eq!(p.year, 3);
    }

    #[test]
    fn test_searchable_fields() {
        let schema = pupil_schema()
            .searchable(&["first_name", "Nickname"])
            .build()
            .unwrap();
        let names: Vec<_> = schema.searchable_fields().map(|f| f.name()).collect();
        assert_eq!(names, vec!["first_name", "nickname"]);
    }

    #[test]
    fn test_build_rejects_non_string_searchable() {
        let err = pupil_schema().searchable(&["year"]).build().err().unwrap();
        assert!(matches!(err, SchemaError::NonStringSearchable { .. }));
    }

    #[test]
    fn test_build_rejects_unknown_searchable() {
        let err = pupil_schema().searchable(&["email"]).build().err().unwrap();
        assert!(matches!(err, SchemaError::UnknownSearchable { .. }));
    }

    #[test]
    fn test_build_rejects_colliding_names() {
        let err = pupil_schema()
            .field::<i64>("Year", |p| FieldValue::Integer(p.year))
            .build()
            .err()
            .unwrap();
        assert_eq!(
            err,
            SchemaError::DuplicateProperty {
                entity_type: "pupil".into(),
                name: "Year".into(),
                existing: "year".into(),
            }
        );
    }
}
