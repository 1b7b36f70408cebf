//! Provider entity persistence.

use async_trait::async_trait;
use dashmap::DashMap;

use aac_model::ProviderEntity;
use aac_storage::{StorageError, StorageResult};

/// Persistence for provider entities, keyed by provider id.
#[async_trait]
pub trait ProviderService: Send + Sync {
    /// Gets an entity by id.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if no entity exists.
    async fn get_provider(&self, provider_id: &str) -> StorageResult<ProviderEntity>;

    /// Finds an entity by id.
    async fn find_provider(&self, provider_id: &str) -> StorageResult<Option<ProviderEntity>>;

    /// Lists the entities of a realm.
    async fn list_providers(&self, realm: &str) -> StorageResult<Vec<ProviderEntity>>;

    /// Persists a new entity.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if the id is taken.
    async fn add_provider(&self, entity: &ProviderEntity) -> StorageResult<()>;

    /// Updates a persisted entity.
    async fn update_provider(&self, entity: &ProviderEntity) -> StorageResult<()>;

    /// Deletes a persisted entity.
    async fn delete_provider(&self, provider_id: &str) -> StorageResult<()>;
}

/// In-memory provider entity store.
#[derive(Debug, Default)]
pub struct InMemoryProviderService {
    entities: DashMap<String, ProviderEntity>,
}

impl InMemoryProviderService {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProviderService for InMemoryProviderService {
    async fn get_provider(&self, provider_id: &str) -> StorageResult<ProviderEntity> {
        self.entities
            .get(provider_id)
            .map(|e| e.clone())
            .ok_or_else(|| StorageError::not_found(format!("provider {provider_id}")))
    }

    async fn find_provider(&self, provider_id: &str) -> StorageResult<Option<ProviderEntity>> {
        Ok(self.entities.get(provider_id).map(|e| e.clone()))
    }

    async fn list_providers(&self, realm: &str) -> StorageResult<Vec<ProviderEntity>> {
        Ok(self
            .entities
            .iter()
            .filter(|e| e.realm == realm)
            .map(|e| e.clone())
            .collect())
    }

    async fn add_provider(&self, entity: &ProviderEntity) -> StorageResult<()> {
        if self.entities.contains_key(&entity.provider_id) {
            return Err(StorageError::duplicate(entity.provider_id.clone()));
        }
        self.entities
            .insert(entity.provider_id.clone(), entity.clone());
        Ok(())
    }

    async fn update_provider(&self, entity: &ProviderEntity) -> StorageResult<()> {
        if !self.entities.contains_key(&entity.provider_id) {
            return Err(StorageError::not_found(entity.provider_id.clone()));
        }
        self.entities
            .insert(entity.provider_id.clone(), entity.clone());
        Ok(())
    }

    async fn delete_provider(&self, provider_id: &str) -> StorageResult<()> {
        self.entities
            .remove(provider_id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(provider_id.to_string()))
    }
}
