//! Registry of related-record sources for list inclusion rules
//!
//! An inclusion rule names a foreign-key property of one entity and the
//! entity type it points to. When a service lists a page, it collects the
//! ids the page references and fetches those records from the source
//! registered for the target type.

use crate::core::entity::Entity;
use crate::core::error::{RegistrarResult, StorageError};
use crate::core::store::RecordStore;
use crate::services::entity_service::EntityService;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Records of one entity type, fetched by id and serialized
#[async_trait]
pub trait RelatedSource: Send + Sync {
    /// Entity type name the source serves (e.g. "term")
    fn entity_type(&self) -> &'static str;

    /// The records with the given ids, in the order of `ids`. Ids without
    /// a stored record are skipped.
    async fn fetch(&self, ids: &[Uuid]) -> RegistrarResult<Vec<Value>>;
}

#[async_trait]
impl<T, S> RelatedSource for EntityService<T, S>
where
    T: Entity + Serialize,
    S: RecordStore<T>,
{
    fn entity_type(&self) -> &'static str {
        T::entity_type()
    }

    async fn fetch(&self, ids: &[Uuid]) -> RegistrarResult<Vec<Value>> {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(record) = self.store().get(id).await? else {
                continue;
            };
            let value = serde_json::to_value(&record).map_err(|e| StorageError::Backend {
                backend: T::entity_type().to_string(),
                message: format!("cannot serialize record '{}': {}", id, e),
            })?;
            records.push(value);
        }
        Ok(records)
    }
}

/// Maps entity type names to the sources serving their records
#[derive(Clone, Default)]
pub struct RelatedRegistry {
    sources: HashMap<&'static str, Arc<dyn RelatedSource>>,
}

impl RelatedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source under its entity type, replacing any earlier one
    pub fn register(&mut self, source: Arc<dyn RelatedSource>) -> &mut Self {
        self.sources.insert(source.entity_type(), source);
        self
    }

    pub fn get(&self, entity_type: &str) -> Option<&Arc<dyn RelatedSource>> {
        self.sources.get(entity_type)
    }

    pub fn contains(&self, entity_type: &str) -> bool {
        self.sources.contains_key(entity_type)
    }

    /// Registered entity types, sorted
    pub fn entity_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.sources.keys().copied().collect();
        types.sort_unstable();
        types
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl std::fmt::Debug for RelatedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelatedRegistry")
            .field("entity_types", &self.entity_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Term;
    use crate::storage::InMemoryStore;
    use chrono::Utc;

    fn term(name: &str) -> Term {
        Term::new(name.to_string(), Utc::now(), Utc::now(), true)
    }

    #[tokio::test]
    async fn test_service_fetch_skips_missing_ids() {
        let autumn = term("Autumn");
        let spring = term("Spring");
        let service: EntityService<Term, _> =
            EntityService::new(InMemoryStore::with_records(vec![autumn.clone(), spring.clone()]));

        let records = service
            .fetch(&[spring.id, Uuid::new_v4(), autumn.id])
            .await
            .unwrap();
        let names: Vec<_> = records.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Spring", "Autumn"]);
    }

    #[test]
    fn test_registry_keys_by_entity_type() {
        let mut registry = RelatedRegistry::new();
        assert!(registry.is_empty());

        let terms: Arc<EntityService<Term, InMemoryStore<Term>>> =
            Arc::new(EntityService::new(InMemoryStore::new()));
        registry.register(terms);

        assert!(registry.contains("term"));
        assert!(registry.get("school").is_none());
        assert_eq!(registry.entity_types(), vec!["term"]);
    }
}
