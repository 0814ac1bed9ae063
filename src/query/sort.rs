//! Dynamic ordering by a named property

use crate::core::entity::Queryable;
use crate::core::error::QueryError;
use crate::core::field::FieldValue;
use crate::core::schema::Getter;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = QueryError;

    /// Accepts exactly `asc` or `desc`, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(QueryError::InvalidSortDirection {
                direction: s.to_string(),
            })
        }
    }
}

impl Serialize for SortDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Sort by one property in one direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Build a sort from raw request values.
    ///
    /// A present direction is always validated, even without a field. A
    /// missing or blank field means "no sort"; a missing direction means
    /// ascending.
    pub fn parse(field: Option<&str>, direction: Option<&str>) -> Result<Option<Self>, QueryError> {
        let direction = direction
            .map(|d| d.trim().parse::<SortDirection>())
            .transpose()?
            .unwrap_or_default();

        Ok(field
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(|f| SortSpec::new(f, direction)))
    }

    /// Resolve the field against `T`'s accessor table
    pub fn compile<T: Queryable>(&self) -> Result<CompiledSort<T>, QueryError> {
        let field = T::schema().field(&self.field)?;
        Ok(CompiledSort {
            property: field.name(),
            getter: field.getter(),
            direction: self.direction,
        })
    }
}

/// A sort resolved against one entity type
pub struct CompiledSort<T> {
    property: &'static str,
    getter: Getter<T>,
    direction: SortDirection,
}

impl<T> CompiledSort<T> {
    pub fn property(&self) -> &'static str {
        self.property
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Stable sort of `items`.
    ///
    /// Keys are read once per record. Nulls come first in both directions.
    pub fn sort(&self, items: Vec<T>) -> Vec<T> {
        let mut keyed: Vec<(FieldValue, T)> = items
            .into_iter()
            .map(|item| ((self.getter)(&item), item))
            .collect();

        keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, self.direction));
        keyed.into_iter().map(|(_, item)| item).collect()
    }
}

/// Null-first comparison with `direction` applied to non-null keys only
pub fn compare_keys(a: &FieldValue, b: &FieldValue, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => direction.apply(a.natural_cmp(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse() {
        assert_eq!("asc".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert_eq!("Asc".parse::<SortDirection>(), Ok(SortDirection::Asc));
        for bad in ["ascending", "up", "", "de sc"] {
            assert_eq!(
                bad.parse::<SortDirection>(),
                Err(QueryError::InvalidSortDirection {
                    direction: bad.to_string()
                })
            );
        }
    }

    #[test]
    fn test_direction_apply() {
        assert_eq!(SortDirection::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(SortDirection::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(SortDirection::Desc.apply(Ordering::Equal), Ordering::Equal);
    }

    #[test]
    fn test_parse_spec() {
        assert_eq!(
            SortSpec::parse(Some("Name"), None).unwrap(),
            Some(SortSpec::asc("Name"))
        );
        assert_eq!(
            SortSpec::parse(Some("name"), Some("desc")).unwrap(),
            Some(SortSpec::desc("name"))
        );
        assert_eq!(SortSpec::parse(None, Some("asc")).unwrap(), None);
        assert_eq!(SortSpec::parse(Some("  "), None).unwrap(), None);
        assert!(SortSpec::parse(None, Some("sideways")).is_err());
    }

    #[test]
    fn test_nulls_first_in_both_directions() {
        let one = FieldValue::Integer(1);
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            assert_eq!(compare_keys(&FieldValue::Null, &one, direction), Ordering::Less);
            assert_eq!(compare_keys(&one, &FieldValue::Null, direction), Ordering::Greater);
            assert_eq!(
                compare_keys(&FieldValue::Null, &FieldValue::Null, direction),
                Ordering::Equal
            );
        }
        let two = FieldValue::Integer(2);
        assert_eq!(compare_keys(&one, &two, SortDirection::Desc), Ordering::Greater);
    }

    #[test]
    fn test_direction_serde() {
        let dir: SortDirection = serde_yaml::from_str("DESC").unwrap();
        assert_eq!(dir, SortDirection::Desc);
        assert!(serde_yaml::from_str::<SortDirection>("down").is_err());
    }
}
