//! Configuration loading and management

use crate::core::entity::Queryable;
use crate::core::error::{ConfigError, QueryError};
use crate::core::field::FieldKind;
use crate::query::operator::FilterOperator;
use crate::query::sort::{SortDirection, SortSpec};
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Page size limits applied to list requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size used when a request does not give one
    pub default_page_size: u32,

    /// Largest page size a request may ask for
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl PaginationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.max_page_size".to_string(),
                value: self.max_page_size.to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigError::InvalidValue {
                field: "pagination.default_page_size".to_string(),
                value: self.default_page_size.to_string(),
                message: format!("must be between 1 and {}", self.max_page_size),
            });
        }
        Ok(())
    }
}

/// Configured default ordering for an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub field: String,

    /// `asc` or `desc`; validated when settings are resolved
    #[serde(default = "default_direction")]
    pub direction: String,
}

fn default_direction() -> String {
    SortDirection::Asc.as_str().to_string()
}

/// A related-record inclusion rule: list pages of the owning entity carry
/// the records of `entity` referenced by the `field` foreign key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeConfig {
    pub field: String,

    /// Entity type name of the related records (e.g., "term")
    pub entity: String,
}

/// Per-entity list behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Entity type name (e.g., "staff", "room")
    pub name: String,

    /// Properties free-text search looks at; the entity's own searchable
    /// set when absent
    #[serde(default)]
    pub searchable: Option<Vec<String>>,

    /// Ordering applied when a list request does not sort
    #[serde(default)]
    pub default_sort: Option<SortConfig>,

    /// Related records returned alongside each list page
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<IncludeConfig>,
}

/// Complete configuration for the registrar services
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrarConfig {
    #[serde(default)]
    pub pagination: Option<PaginationConfig>,

    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

impl RegistrarConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path))?;
        let config = Self::parse(&content, Some(path))?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse(yaml, None)
    }

    fn parse(yaml: &str, file: Option<&str>) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: file.map(str::to_string),
            message: e.to_string(),
        })?;
        if let Some(pagination) = &config.pagination {
            pagination.validate()?;
        }
        Ok(config)
    }

    /// Merge multiple configurations into one
    ///
    /// Later configurations win: an entity entry replaces an earlier entry
    /// with the same name, and pagination comes from the last
    /// configuration that sets it.
    pub fn merge(configs: Vec<RegistrarConfig>) -> Self {
        let mut merged = RegistrarConfig::default();

        for config in configs {
            if config.pagination.is_some() {
                merged.pagination = config.pagination;
            }
            for entity in config.entities {
                match merged.entities.iter_mut().find(|e| e.name == entity.name) {
                    Some(existing) => *existing = entity,
                    None => merged.entities.push(entity),
                }
            }
        }

        merged
    }

    /// Effective pagination limits
    pub fn pagination(&self) -> PaginationConfig {
        self.pagination.unwrap_or_default()
    }

    /// Find the configuration of one entity type
    pub fn entity(&self, name: &str) -> Option<&EntityConfig> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Resolve the settings of `T` against its accessor table
    pub fn settings_for<T: Queryable>(&self) -> Result<EntitySettings, ConfigError> {
        EntitySettings::resolve::<T>(self.entity(T::entity_type()))
    }

    /// Create a default configuration covering the bundled school entities
    pub fn default_config() -> Self {
        let entity = |name: &str, field: &str, direction: &str| EntityConfig {
            name: name.to_string(),
            searchable: None,
            default_sort: Some(SortConfig {
                field: field.to_string(),
                direction: direction.to_string(),
            }),
            include: Vec::new(),
        };

        Self {
            pagination: Some(PaginationConfig::default()),
            entities: vec![
                entity("school", "name", "asc"),
                entity("staff", "last_name", "asc"),
                entity("exam", "exam_date", "asc"),
                entity("fee", "due_date", "asc"),
                entity("leave", "start_date", "desc"),
                entity("event", "starts_at", "asc"),
                entity("term", "starts_on", "desc"),
            ],
        }
    }
}

/// A validated inclusion rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeRule {
    /// Canonical name of a uuid property of the owning entity
    pub field: String,

    pub entity: String,
}

/// Resolved, validated list settings of one entity type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySettings {
    /// Canonical names of the properties free-text search looks at, or
    /// `None` for the entity's declared searchable set
    pub searchable: Option<Vec<String>>,

    pub default_sort: Option<SortSpec>,

    pub include: Vec<IncludeRule>,
}

impl EntitySettings {
    /// Validate `config` against `T`'s accessor table.
    ///
    /// Unknown fields, non-string searchable fields and a bad sort
    /// direction fail with `InvalidEntity` carrying the query error. An
    /// inclusion rule on a property that is not a uuid, or a second rule
    /// on the same property, fails with `InvalidInclude`.
    pub fn resolve<T: Queryable>(config: Option<&EntityConfig>) -> Result<Self, ConfigError> {
        let Some(config) = config else {
            return Ok(Self::default());
        };
        let invalid = |source: QueryError| ConfigError::InvalidEntity {
            entity: T::entity_type().to_string(),
            source,
        };

        let (searchable, default_sort) = Self::resolve_listing::<T>(config).map_err(invalid)?;
        let include = Self::resolve_include::<T>(&config.include)?;

        Ok(Self {
            searchable,
            default_sort,
            include,
        })
    }

    fn resolve_include<T: Queryable>(
        rules: &[IncludeConfig],
    ) -> Result<Vec<IncludeRule>, ConfigError> {
        let schema = T::schema();
        let mut resolved: Vec<IncludeRule> = Vec::with_capacity(rules.len());

        for rule in rules {
            let field = schema.field(&rule.field).map_err(|source| ConfigError::InvalidEntity {
                entity: T::entity_type().to_string(),
                source,
            })?;
            let invalid = |message: String| ConfigError::InvalidInclude {
                entity: T::entity_type().to_string(),
                field: field.name().to_string(),
                message,
            };

            if field.kind() != FieldKind::Uuid {
                return Err(invalid(format!("is {}, not uuid", field.kind())));
            }
            if rule.entity.trim().is_empty() {
                return Err(invalid("names no related entity".to_string()));
            }
            if resolved.iter().any(|r| r.field == field.name()) {
                return Err(invalid("has more than one inclusion rule".to_string()));
            }

            resolved.push(IncludeRule {
                field: field.name().to_string(),
                entity: rule.entity.clone(),
            });
        }

        Ok(resolved)
    }

    fn resolve_listing<T: Queryable>(
        config: &EntityConfig,
    ) -> Result<(Option<Vec<String>>, Option<SortSpec>), QueryError> {
        let schema = T::schema();

        let searchable = config
            .searchable
            .as_ref()
            .map(|names| {
                names
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
                        Ok(field.name().to_string())
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let default_sort = config
            .default_sort
            .as_ref()
            .map(|sort| {
                let direction = sort.direction.parse::<SortDirection>()?;
                let field = schema.field(&sort.field)?;
                Ok::<_, QueryError>(SortSpec::new(field.name(), direction))
            })
            .transpose()?;

        Ok((searchable, default_sort))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Room, Staff};

    const YAML: &str = r#"
pagination:
  default_page_size: 10
  max_page_size: 50
entities:
  - name: staff
    searchable: [FirstName, last_name]
    default_sort:
      field: LastName
      direction: DESC
  - name: room
"#;

    #[test]
    fn test_default_config() {
        let config = RegistrarConfig::default_config();
        assert_eq!(config.pagination(), PaginationConfig::default());
        assert!(config.entity("staff").is_some());
        assert!(config.entity("spaceship").is_none());
    }

    #[test]
    fn test_default_config_resolves_for_every_entity() {
        let config = RegistrarConfig::default_config();
        assert!(config.settings_for::<Staff>().is_ok());
        assert!(config.settings_for::<Room>().is_ok());
        assert!(config.settings_for::<crate::entities::Exam>().is_ok());
        assert!(config.settings_for::<crate::entities::Leave>().is_ok());
        assert!(config.settings_for::<crate::entities::Event>().is_ok());
        assert!(config.settings_for::<crate::entities::Term>().is_ok());
        assert!(config.settings_for::<crate::entities::Fee>().is_ok());
        assert!(config.settings_for::<crate::entities::School>().is_ok());
    }

    #[test]
    fn test_yaml_parsing() {
        let config = RegistrarConfig::from_yaml_str(YAML).unwrap();
        assert_eq!(config.pagination().max_page_size, 50);
        assert_eq!(config.entities.len(), 2);

        let settings = config.settings_for::<Staff>().unwrap();
        assert_eq!(
            settings.searchable,
            Some(vec!["first_name".to_string(), "last_name".to_string()])
        );
        assert_eq!(settings.default_sort, Some(SortSpec::desc("last_name")));

        let room = config.settings_for::<Room>().unwrap();
        assert_eq!(room, EntitySettings::default());
    }

    #[test]
    fn test_yaml_serialization() {
        let config = RegistrarConfig::default_config();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = RegistrarConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_pagination() {
        let err = RegistrarConfig::from_yaml_str(
            "pagination:\n  default_page_size: 200\n  max_page_size: 100\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = RegistrarConfig::from_yaml_str("entities: [name: {").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { file: None, .. }));
    }

    #[test]
    fn test_resolve_rejects_bad_entity_config() {
        let query_code = |config: &EntityConfig| match EntitySettings::resolve::<Staff>(Some(config)) {
            Err(ConfigError::InvalidEntity { source, .. }) => Some(source.error_code()),
            _ => None,
        };

        let bad_field = EntityConfig {
            name: "staff".into(),
            searchable: Some(vec!["nickname".into()]),
            default_sort: None,
            include: Vec::new(),
        };
        assert_eq!(query_code(&bad_field), Some("UNKNOWN_PROPERTY"));

        let numeric = EntityConfig {
            searchable: Some(vec!["salary".into()]),
            ..bad_field.clone()
        };
        assert_eq!(query_code(&numeric), Some("UNSUPPORTED_OPERATOR"));

        let bad_direction = EntityConfig {
            searchable: None,
            default_sort: Some(SortConfig {
                field: "last_name".into(),
                direction: "sideways".into(),
            }),
            ..bad_field
        };
        let err = RegistrarConfig {
            pagination: None,
            entities: vec![bad_direction],
        }
        .settings_for::<Staff>()
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEntity {
                source: QueryError::InvalidSortDirection { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_resolve_include_rules() {
        let config = RegistrarConfig::from_yaml_str(
            r#"
entities:
  - name: staff
    include:
      - { field: SchoolId, entity: school }
"#,
        )
        .unwrap();

        let settings = config.settings_for::<Staff>().unwrap();
        assert_eq!(
            settings.include,
            vec![IncludeRule {
                field: "school_id".into(),
                entity: "school".into(),
            }]
        );
        assert_eq!(settings.searchable, None);
    }

    #[test]
    fn test_resolve_rejects_bad_include_rules() {
        let include = |field: &str| EntityConfig {
            name: "staff".into(),
            searchable: None,
            default_sort: None,
            include: vec![IncludeConfig {
                field: field.into(),
                entity: "school".into(),
            }],
        };

        let unknown = EntitySettings::resolve::<Staff>(Some(&include("campus_id"))).unwrap_err();
        assert!(matches!(
            unknown,
            ConfigError::InvalidEntity {
                source: QueryError::UnknownProperty { .. },
                ..
            }
        ));

        let not_uuid = EntitySettings::resolve::<Staff>(Some(&include("email"))).unwrap_err();
        assert!(matches!(
            not_uuid,
            ConfigError::InvalidInclude { ref field, .. } if field == "email"
        ));

        let mut twice = include("school_id");
        twice.include.push(IncludeConfig {
            field: "SchoolId".into(),
            entity: "campus".into(),
        });
        assert!(matches!(
            EntitySettings::resolve::<Staff>(Some(&twice)),
            Err(ConfigError::InvalidInclude { .. })
        ));
    }

    #[test]
    fn test_merge() {
        let base = RegistrarConfig::default_config();
        let overlay = RegistrarConfig::from_yaml_str(YAML).unwrap();
        let merged = RegistrarConfig::merge(vec![base, overlay]);

        assert_eq!(merged.pagination().default_page_size, 10);
        let staff = merged.entity("staff").unwrap();
        assert_eq!(staff.default_sort.as_ref().unwrap().direction, "DESC");
        assert!(merged.entity("exam").is_some());
        assert_eq!(
            merged.entities.iter().filter(|e| e.name == "staff").count(),
            1
        );
    }

    #[test]
    fn test_merge_keeps_pagination_when_later_config_omits_it() {
        let first = RegistrarConfig::from_yaml_str(YAML).unwrap();
        let second = RegistrarConfig::from_yaml_str("entities: []").unwrap();
        let merged = RegistrarConfig::merge(vec![first, second]);
        assert_eq!(merged.pagination().max_page_size, 50);
    }
}
