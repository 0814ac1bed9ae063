//! Filter operators
//!
//! The [`FilterOperator`] enum defines the fixed operator set. Not every
//! operator is valid for every field kind; see [`FilterOperator::supports`].

use crate::core::field::FieldKind;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a filter criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Contains,
    StartsWith,
    EndsWith,
    In,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 10] = [
        FilterOperator::Equal,
        FilterOperator::NotEqual,
        FilterOperator::GreaterThan,
        FilterOperator::GreaterThanOrEqual,
        FilterOperator::LessThan,
        FilterOperator::LessThanOrEqual,
        FilterOperator::Contains,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
        FilterOperator::In,
    ];

    /// Whether this operator can be applied to a field of `kind`.
    ///
    /// - equality and `In`: every kind
    /// - ordering comparisons: integer, float and date-time fields
    /// - substring operators: string fields
    pub fn supports(self, kind: FieldKind) -> bool {
        match self {
            FilterOperator::Equal | FilterOperator::NotEqual | FilterOperator::In => true,
            FilterOperator::GreaterThan
            | FilterOperator::GreaterThanOrEqual
            | FilterOperator::LessThan
            | FilterOperator::LessThanOrEqual => kind.is_ordered(),
            FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
                kind == FieldKind::String
            }
        }
    }

    /// Whether the operand is a list rather than a single literal
    pub fn takes_list(self) -> bool {
        matches!(self, FilterOperator::In)
    }

    /// Whether a `null` operand is meaningful for this operator
    pub fn accepts_null(self) -> bool {
        matches!(
            self,
            FilterOperator::Equal | FilterOperator::NotEqual | FilterOperator::In
        )
    }

    /// Evaluates a comparison operator given an ordering result.
    ///
    /// Non-comparison operators evaluate to `false`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            FilterOperator::Equal => ordering == Ordering::Equal,
            FilterOperator::NotEqual => ordering != Ordering::Equal,
            FilterOperator::GreaterThan => ordering == Ordering::Greater,
            FilterOperator::GreaterThanOrEqual => ordering != Ordering::Less,
            FilterOperator::LessThan => ordering == Ordering::Less,
            FilterOperator::LessThanOrEqual => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the display name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Equal => "equal",
            FilterOperator::NotEqual => "not_equal",
            FilterOperator::GreaterThan => "greater_than",
            FilterOperator::GreaterThanOrEqual => "greater_than_or_equal",
            FilterOperator::LessThan => "less_than",
            FilterOperator::LessThanOrEqual => "less_than_or_equal",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "starts_with",
            FilterOperator::EndsWith => "ends_with",
            FilterOperator::In => "in",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when an operator token is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl fmt::Display for UnknownOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown filter operator '{}'", self.0)
    }
}

impl std::error::Error for UnknownOperator {}

impl FromStr for FilterOperator {
    type Err = UnknownOperator;

    /// Parses operator names case-insensitively, ignoring `_`, `-` and
    /// spaces, plus the usual symbolic and short forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let op = match key.as_str() {
            "equal" | "equals" | "eq" | "=" | "==" => FilterOperator::Equal,
            "notequal" | "ne" | "neq" | "!=" | "<>" => FilterOperator::NotEqual,
            "greaterthan" | "gt" | ">" => FilterOperator::GreaterThan,
            "greaterthanorequal" | "gte" | "ge" | ">=" => FilterOperator::GreaterThanOrEqual,
            "lessthan" | "lt" | "<" => FilterOperator::LessThan,
            "lessthanorequal" | "lte" | "le" | "<=" => FilterOperator::LessThanOrEqual,
            "contains" => FilterOperator::Contains,
            "startswith" => FilterOperator::StartsWith,
            "endswith" => FilterOperator::EndsWith,
            "in" => FilterOperator::In,
            _ => return Err(UnknownOperator(s.to_string())),
        };
        Ok(op)
    }
}

impl Serialize for FilterOperator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FilterOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_by_kind() {
        assert!(FilterOperator::Equal.supports(FieldKind::Boolean));
        assert!(FilterOperator::In.supports(FieldKind::Uuid));
        assert!(FilterOperator::GreaterThan.supports(FieldKind::DateTime));
        assert!(FilterOperator::LessThanOrEqual.supports(FieldKind::Float));
        assert!(!FilterOperator::GreaterThan.supports(FieldKind::String));
        assert!(!FilterOperator::GreaterThan.supports(FieldKind::Boolean));
        assert!(FilterOperator::Contains.supports(FieldKind::String));
        assert!(!FilterOperator::Contains.supports(FieldKind::Integer));
        assert!(!FilterOperator::StartsWith.supports(FieldKind::DateTime));
    }

    #[test]
    fn test_eval_ordering() {
        assert!(FilterOperator::Equal.eval_ordering(Ordering::Equal));
        assert!(!FilterOperator::Equal.eval_ordering(Ordering::Less));
        assert!(FilterOperator::NotEqual.eval_ordering(Ordering::Greater));
        assert!(FilterOperator::GreaterThanOrEqual.eval_ordering(Ordering::Equal));
        assert!(!FilterOperator::GreaterThan.eval_ordering(Ordering::Equal));
        assert!(FilterOperator::LessThan.eval_ordering(Ordering::Less));
        assert!(!FilterOperator::LessThanOrEqual.eval_ordering(Ordering::Greater));
        assert!(!FilterOperator::Contains.eval_ordering(Ordering::Equal));
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("Equal".parse(), Ok(FilterOperator::Equal));
        assert_eq!("eq".parse(), Ok(FilterOperator::Equal));
        assert_eq!("GreaterThanOrEqual".parse(), Ok(FilterOperator::GreaterThanOrEqual));
        assert_eq!("greater_than_or_equal".parse(), Ok(FilterOperator::GreaterThanOrEqual));
        assert_eq!(">=".parse(), Ok(FilterOperator::GreaterThanOrEqual));
        assert_eq!("starts-with".parse(), Ok(FilterOperator::StartsWith));
        assert_eq!("IN".parse(), Ok(FilterOperator::In));
        assert!("like".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn test_as_str_roundtrips_through_parse() {
        for op in FilterOperator::ALL {
            assert_eq!(op.as_str().parse(), Ok(op));
        }
    }

    #[test]
    fn test_serde() {
        let op: FilterOperator = serde_json::from_str("\"NotEqual\"").unwrap();
        assert_eq!(op, FilterOperator::NotEqual);
        assert_eq!(serde_json::to_string(&op).unwrap(), "\"not_equal\"");
        assert!(serde_json::from_str::<FilterOperator>("\"between\"").is_err());
    }
}
