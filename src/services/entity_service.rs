//! The generic CRUD service shared by every entity type

use crate::config::{EntitySettings, RegistrarConfig};
use crate::core::entity::Entity;
use crate::core::error::{ConfigError, EntityError, RegistrarResult};
use crate::core::patch::{FieldPatch, apply_patch};
use crate::core::service::DataService;
use crate::core::store::RecordStore;
use crate::query::engine::{self, ListQuery};
use crate::query::page::Page;
use crate::services::related::RelatedRegistry;
use async_trait::async_trait;
use std::marker::PhantomData;
use uuid::Uuid;

/// CRUD and list operations for one entity type over one record store.
///
/// Per-entity differences (searchable properties, default ordering,
/// related-record inclusion) live in [`EntitySettings`]; everything else
/// is shared.
pub struct EntityService<T, S> {
    store: S,
    settings: EntitySettings,
    related: RelatedRegistry,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity, S: RecordStore<T>> EntityService<T, S> {
    /// Create a service with the entity's declared defaults
    pub fn new(store: S) -> Self {
        Self::with_settings(store, EntitySettings::default())
    }

    pub fn with_settings(store: S, settings: EntitySettings) -> Self {
        Self {
            store,
            settings,
            related: RelatedRegistry::new(),
            _entity: PhantomData,
        }
    }

    /// Attach the sources inclusion rules fetch related records from.
    ///
    /// Fails when a rule targets an entity type `related` has no source for.
    pub fn with_related(mut self, related: RelatedRegistry) -> Result<Self, ConfigError> {
        if let Some(rule) = self
            .settings
            .include
            .iter()
            .find(|rule| !related.contains(&rule.entity))
        {
            return Err(ConfigError::InvalidInclude {
                entity: T::entity_type().to_string(),
                field: rule.field.clone(),
                message: format!(
                    "targets '{}', which has no registered source (known: {:?})",
                    rule.entity,
                    related.entity_types()
                ),
            });
        }
        self.related = related;
        Ok(self)
    }

    /// Create a service using the settings `config` holds for `T`
    pub fn from_config(store: S, config: &RegistrarConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_settings(store, config.settings_for::<T>()?))
    }

    pub fn settings(&self) -> &EntitySettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The query actually run: the request plus this entity's defaults
    /// wherever the request leaves a gap
    fn effective_query(&self, query: &ListQuery) -> ListQuery {
        let mut effective = query.clone();
        if effective.sort.is_none() {
            effective.sort = self.settings.default_sort.clone();
        }
        if effective.search_fields.is_none() {
            effective.search_fields = self.settings.searchable.clone();
        }
        effective
    }

    /// Fetch the records each inclusion rule references from `page`.
    ///
    /// Ids are deduplicated and fetched in the order the page first
    /// references them; null foreign keys are skipped.
    async fn include_related(&self, page: &mut Page<T>) -> RegistrarResult<()> {
        if self.settings.include.is_empty() {
            return Ok(());
        }
        if self.related.is_empty() {
            tracing::debug!(
                entity = T::entity_type(),
                rules = self.settings.include.len(),
                "no related sources attached, skipping inclusion"
            );
            return Ok(());
        }

        let schema = T::schema();
        for rule in &self.settings.include {
            let Some(source) = self.related.get(&rule.entity) else {
                continue;
            };
            let field = schema.field(&rule.field)?;

            let mut ids: Vec<Uuid> = Vec::new();
            for id in page.items.iter().filter_map(|item| field.read(item).as_uuid()) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            if ids.is_empty() {
                continue;
            }

            let records = source.fetch(&ids).await?;
            tracing::debug!(
                entity = T::entity_type(),
                field = %rule.field,
                related = %rule.entity,
                referenced = ids.len(),
                found = records.len(),
                "included related records"
            );
            page.included.insert(rule.field.clone(), records);
        }

        Ok(())
    }

    fn not_found(id: &Uuid) -> EntityError {
        EntityError::NotFound {
            entity_type: T::entity_type().to_string(),
            id: *id,
        }
    }

    async fn require(&self, id: &Uuid) -> RegistrarResult<T> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| Self::not_found(id).into())
    }
}

#[async_trait]
impl<T: Entity, S: RecordStore<T>> DataService<T> for EntityService<T, S> {
    async fn get(&self, id: &Uuid) -> RegistrarResult<Option<T>> {
        Ok(self.store.get(id).await?)
    }

    async fn list(&self, query: &ListQuery) -> RegistrarResult<Page<T>> {
        let query = self.effective_query(query);
        let records = self.store.load_all().await?;

        let mut page = engine::execute(records, &query).map_err(|e| {
            tracing::warn!(
                entity = T::entity_type(),
                code = e.error_code(),
                error = %e,
                "list query rejected"
            );
            e
        })?;

        self.include_related(&mut page).await?;
        Ok(page)
    }

    async fn create(&self, entity: T) -> RegistrarResult<T> {
        let id = entity.id();
        if !self.store.insert(entity.clone()).await? {
            return Err(EntityError::AlreadyExists {
                entity_type: T::entity_type().to_string(),
                id,
            }
            .into());
        }

        tracing::debug!(entity = T::entity_type(), %id, "created");
        Ok(entity)
    }

    async fn update(&self, id: &Uuid, mut entity: T) -> RegistrarResult<T> {
        let existing = self.require(id).await?;

        entity.adopt_identity(*id, existing.created_at());
        entity.touch();

        if !self.store.replace(entity.clone()).await? {
            return Err(Self::not_found(id).into());
        }

        tracing::debug!(entity = T::entity_type(), %id, "updated");
        Ok(entity)
    }

    async fn patch(&self, id: &Uuid, patches: &[FieldPatch]) -> RegistrarResult<T> {
        let mut entity = self.require(id).await?;

        apply_patch(&mut entity, patches)?;
        entity.touch();

        if !self.store.replace(entity.clone()).await? {
            return Err(Self::not_found(id).into());
        }

        tracing::debug!(entity = T::entity_type(), %id, fields = patches.len(), "patched");
        Ok(entity)
    }

    async fn delete(&self, id: &Uuid) -> RegistrarResult<()> {
        if self.store.remove(id).await?.is_none() {
            return Err(Self::not_found(id).into());
        }

        tracing::debug!(entity = T::entity_type(), %id, "deleted");
        Ok(())
    }
}
