//! Provider lifecycle manager.
//!
//! Drives persisted provider entities between the unregistered (stored,
//! disabled) and registered (live in the authority registry) states.

use std::sync::Arc;

use aac_core::config::BootstrapProvider;
use aac_core::event::{Event, EventType};
use aac_identity::AuthorityRegistry;
use aac_model::{is_reserved_realm, AuthorityKind, ProviderEntity};
use aac_session::SessionManager;

use crate::error::{RegistrationError, RegistrationResult};
use crate::service::ProviderService;

/// Lifecycle manager for configurable providers.
///
/// Every mutating operation takes the caller's realm and checks it against
/// the stored entity, so one realm's administrator can never touch another
/// realm's providers. Reserved-realm providers bypass persistence entirely
/// and are immutable through this manager.
pub struct ProviderManager {
    registry: Arc<AuthorityRegistry>,
    store: Arc<dyn ProviderService>,
    sessions: Arc<dyn SessionManager>,
}

impl ProviderManager {
    /// Creates a manager over the given registry, entity store, and
    /// session manager.
    #[must_use]
    pub fn new(
        registry: Arc<AuthorityRegistry>,
        store: Arc<dyn ProviderService>,
        sessions: Arc<dyn SessionManager>,
    ) -> Self {
        Self {
            registry,
            store,
            sessions,
        }
    }

    /// Whether a provider is currently live in the authority registry.
    #[must_use]
    pub fn is_active(&self, provider_id: &str) -> bool {
        self.registry.find_provider(provider_id).is_some()
    }

    /// Lists the persisted entities of a realm.
    ///
    /// ## Errors
    ///
    /// Returns a storage error when the entity store fails.
    pub async fn list_providers(&self, realm: &str) -> RegistrationResult<Vec<ProviderEntity>> {
        Ok(self.store.list_providers(realm).await?)
    }

    /// Gets a persisted entity, checking realm ownership.
    ///
    /// ## Errors
    ///
    /// Returns `NotFound` for unknown ids and `RealmMismatch` when the
    /// entity belongs to another realm.
    pub async fn get_provider(
        &self,
        realm: &str,
        provider_id: &str,
    ) -> RegistrationResult<ProviderEntity> {
        let entity = self.load(provider_id).await?;
        self.check_realm(realm, &entity)?;
        Ok(entity)
    }

    /// Persists a new provider entity, disabled.
    ///
    /// ## Errors
    ///
    /// Returns `Immutable` for reserved realms, `RealmMismatch` when the
    /// entity names a different realm, and `AlreadyExists` on id collision.
    pub async fn add_provider(
        &self,
        realm: &str,
        mut entity: ProviderEntity,
    ) -> RegistrationResult<ProviderEntity> {
        if is_reserved_realm(realm) || entity.in_reserved_realm() {
            return Err(RegistrationError::Immutable);
        }
        if entity.realm != realm {
            return Err(RegistrationError::RealmMismatch {
                provider_id: entity.provider_id.clone(),
                realm: realm.to_string(),
            });
        }
        if self.store.find_provider(&entity.provider_id).await?.is_some() {
            return Err(RegistrationError::AlreadyExists(entity.provider_id));
        }

        // Entities always start disabled; going live takes an explicit
        // register call.
        entity.enabled = false;
        self.store.add_provider(&entity).await?;
        Ok(entity)
    }

    /// Updates a persisted provider entity.
    ///
    /// The stored enabled flag is preserved; a live provider picks up the
    /// new configuration on its next register cycle.
    ///
    /// ## Errors
    ///
    /// Returns `Immutable` for reserved realms and `RealmMismatch` when the
    /// entity belongs to another realm.
    pub async fn update_provider(
        &self,
        realm: &str,
        mut entity: ProviderEntity,
    ) -> RegistrationResult<ProviderEntity> {
        if is_reserved_realm(realm) || entity.in_reserved_realm() {
            return Err(RegistrationError::Immutable);
        }
        let existing = self.load(&entity.provider_id).await?;
        self.check_realm(realm, &existing)?;
        if entity.realm != existing.realm {
            return Err(RegistrationError::RealmMismatch {
                provider_id: entity.provider_id.clone(),
                realm: entity.realm.clone(),
            });
        }

        entity.enabled = existing.enabled;
        self.store.update_provider(&entity).await?;
        Ok(entity)
    }

    /// Deletes a persisted provider entity.
    ///
    /// ## Errors
    ///
    /// Returns `ActiveDelete` while the provider is live; the entity stays
    /// in storage untouched.
    pub async fn delete_provider(&self, realm: &str, provider_id: &str) -> RegistrationResult<()> {
        if is_reserved_realm(realm) {
            return Err(RegistrationError::Immutable);
        }
        let entity = self.load(provider_id).await?;
        if entity.in_reserved_realm() {
            return Err(RegistrationError::Immutable);
        }
        self.check_realm(realm, &entity)?;
        if self.is_active(provider_id) {
            return Err(RegistrationError::ActiveDelete);
        }

        self.store.delete_provider(provider_id).await?;
        Ok(())
    }

    /// Registers a persisted provider into the authority registry.
    ///
    /// A stale active record is unregistered and rechecked first; the
    /// entity is flipped to enabled and the owning authority builds the
    /// live provider. The returned entity reports the live status.
    ///
    /// ## Errors
    ///
    /// Returns `ActiveRegister` when the provider is still live after the
    /// recheck, and propagates authority build failures.
    pub async fn register_provider(
        &self,
        realm: &str,
        provider_id: &str,
    ) -> RegistrationResult<ProviderEntity> {
        let mut entity = self.load(provider_id).await?;
        if entity.in_reserved_realm() {
            return Err(RegistrationError::Immutable);
        }
        self.check_realm(realm, &entity)?;

        if self.is_active(provider_id) {
            // Stale bookkeeping: try a quick unregister, then recheck.
            let authority = self.registry.get_authority(entity.authority)?;
            authority.unregister_provider(provider_id);
            if self.is_active(provider_id) {
                return Err(RegistrationError::ActiveRegister);
            }
        }

        if !entity.enabled {
            entity.enabled = true;
            self.store.update_provider(&entity).await?;
        }

        let authority = self.registry.get_authority(entity.authority)?;
        authority.register_provider(&entity).await?;
        Event::builder(EventType::ProviderRegistered)
            .success()
            .realm(realm)
            .provider(provider_id)
            .detail("authority", entity.authority.to_string())
            .build()
            .log();
        Ok(entity)
    }

    /// Unregisters a provider and terminates its sessions.
    ///
    /// The persisted entity is flipped to disabled, the live provider is
    /// removed from its authority, and every session bound to the provider
    /// is destroyed. Returns the number of sessions destroyed.
    ///
    /// ## Errors
    ///
    /// Propagates store, authority, and session manager failures.
    pub async fn unregister_provider(
        &self,
        realm: &str,
        provider_id: &str,
    ) -> RegistrationResult<u64> {
        let mut entity = self.load(provider_id).await?;
        if entity.in_reserved_realm() {
            return Err(RegistrationError::Immutable);
        }
        self.check_realm(realm, &entity)?;

        if entity.enabled {
            entity.enabled = false;
            self.store.update_provider(&entity).await?;
        }

        if !self.is_active(provider_id) {
            return Ok(0);
        }

        let authority = self.registry.get_authority(entity.authority)?;
        authority.unregister_provider(provider_id);

        // Sessions referencing an unloaded provider must not survive it.
        let destroyed = self.sessions.destroy_provider_sessions(provider_id).await?;
        Event::builder(EventType::ProviderUnregistered)
            .success()
            .realm(realm)
            .provider(provider_id)
            .build()
            .log();
        if destroyed > 0 {
            Event::builder(EventType::SessionsDestroyed)
                .success()
                .realm(realm)
                .provider(provider_id)
                .detail("count", destroyed.to_string())
                .build()
                .log();
        }
        Ok(destroyed)
    }

    /// Registers the config-file providers of the reserved realms.
    ///
    /// Bootstrap providers never enter the persisted CRUD path; they go
    /// straight to their authority. Returns the number registered.
    ///
    /// ## Errors
    ///
    /// Returns `Configuration` for declarations naming an unknown authority
    /// or a non-reserved realm; propagates authority build failures.
    pub async fn register_bootstrap(
        &self,
        providers: &[BootstrapProvider],
    ) -> RegistrationResult<usize> {
        let mut registered = 0;
        for declared in providers {
            let kind: AuthorityKind = declared
                .authority
                .parse()
                .map_err(|e: aac_model::ParseAuthorityError| {
                    RegistrationError::Configuration(e.to_string())
                })?;
            if !is_reserved_realm(&declared.realm) {
                return Err(RegistrationError::Configuration(format!(
                    "bootstrap provider {} must live in a reserved realm",
                    declared.provider_id
                )));
            }

            let mut entity = ProviderEntity::new(
                &declared.provider_id,
                kind,
                &declared.realm,
                &declared.name,
            );
            entity.enabled = true;
            entity.configuration = declared.configuration.clone();

            let authority = self.registry.get_authority(kind)?;
            authority.register_provider(&entity).await?;
            Event::builder(EventType::ProviderRegistered)
                .success()
                .realm(declared.realm.as_str())
                .provider(declared.provider_id.as_str())
                .detail("authority", entity.authority.to_string())
                .detail("bootstrap", "true")
                .build()
                .log();
            registered += 1;
        }
        if registered > 0 {
            tracing::info!(count = registered, "bootstrap providers registered");
        }
        Ok(registered)
    }

    async fn load(&self, provider_id: &str) -> RegistrationResult<ProviderEntity> {
        self.store
            .find_provider(provider_id)
            .await?
            .ok_or_else(|| RegistrationError::NotFound(provider_id.to_string()))
    }

    fn check_realm(&self, realm: &str, entity: &ProviderEntity) -> RegistrationResult<()> {
        if entity.realm == realm {
            Ok(())
        } else {
            Err(RegistrationError::RealmMismatch {
                provider_id: entity.provider_id.clone(),
                realm: realm.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use aac_core::config::LockoutConfig;
    use aac_identity::{IdentityProviderAuthority, InternalAuthority};
    use aac_session::{InMemorySessionManager, Session, SessionManager};
    use aac_storage::{InMemoryUserService, UserEntityService};
    use uuid::Uuid;

    use crate::service::InMemoryProviderService;

    struct Fixture {
        manager: ProviderManager,
        registry: Arc<AuthorityRegistry>,
        sessions: Arc<InMemorySessionManager>,
        store: Arc<InMemoryProviderService>,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserService::new());
        let registry = Arc::new(AuthorityRegistry::new());
        registry.register_authority(Arc::new(InternalAuthority::new(
            users as Arc<dyn UserEntityService>,
            LockoutConfig {
                max_failures: 3,
                lockout_seconds: 900,
            },
        )) as Arc<dyn IdentityProviderAuthority>);

        let sessions = Arc::new(InMemorySessionManager::new());
        let store = Arc::new(InMemoryProviderService::new());
        let manager = ProviderManager::new(
            Arc::clone(&registry),
            Arc::clone(&store) as Arc<dyn ProviderService>,
            Arc::clone(&sessions) as Arc<dyn SessionManager>,
        );

        Fixture {
            manager,
            registry,
            sessions,
            store,
        }
    }

    fn entity(provider_id: &str, realm: &str) -> ProviderEntity {
        ProviderEntity::new(provider_id, AuthorityKind::Internal, realm, provider_id)
    }

    #[tokio::test]
    async fn added_entities_start_disabled() {
        let fixture = fixture();
        let mut wanted = entity("internal-pwd", "acme");
        wanted.enabled = true;

        let stored = fixture
            .manager
            .add_provider("acme", wanted)
            .await
            .unwrap();
        assert!(!stored.enabled);
        assert!(!fixture.manager.is_active("internal-pwd"));
    }

    #[tokio::test]
    async fn register_goes_live_and_enables() {
        let fixture = fixture();
        fixture
            .manager
            .add_provider("acme", entity("internal-pwd", "acme"))
            .await
            .unwrap();

        let registered = fixture
            .manager
            .register_provider("acme", "internal-pwd")
            .await
            .unwrap();

        assert!(registered.enabled);
        assert!(fixture.manager.is_active("internal-pwd"));
        assert!(fixture.registry.find_provider("internal-pwd").is_some());

        let persisted = fixture.store.get_provider("internal-pwd").await.unwrap();
        assert!(persisted.enabled);
    }

    #[tokio::test]
    async fn register_twice_cycles_cleanly() {
        let fixture = fixture();
        fixture
            .manager
            .add_provider("acme", entity("internal-pwd", "acme"))
            .await
            .unwrap();
        fixture
            .manager
            .register_provider("acme", "internal-pwd")
            .await
            .unwrap();

        // The stale-record cycle unregisters the live provider, so an
        // honest double-register succeeds as a re-register.
        let second = fixture
            .manager
            .register_provider("acme", "internal-pwd")
            .await;
        assert!(second.is_ok());
        assert!(fixture.manager.is_active("internal-pwd"));
    }

    #[tokio::test]
    async fn reserved_realms_are_immutable() {
        let fixture = fixture();

        let err = fixture
            .manager
            .add_provider("global", entity("g-pwd", "global"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "global providers are immutable");

        let err = fixture
            .manager
            .add_provider("system", entity("sys-pwd", "system"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Immutable));
    }

    #[tokio::test]
    async fn active_providers_can_not_be_deleted() {
        let fixture = fixture();
        fixture
            .manager
            .add_provider("acme", entity("internal-pwd", "acme"))
            .await
            .unwrap();
        fixture
            .manager
            .register_provider("acme", "internal-pwd")
            .await
            .unwrap();

        let err = fixture
            .manager
            .delete_provider("acme", "internal-pwd")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "active providers can not be deleted");

        // The entity is untouched.
        assert!(fixture.store.get_provider("internal-pwd").await.is_ok());

        // After unregistering, deletion succeeds.
        fixture
            .manager
            .unregister_provider("acme", "internal-pwd")
            .await
            .unwrap();
        fixture
            .manager
            .delete_provider("acme", "internal-pwd")
            .await
            .unwrap();
        assert!(fixture.store.find_provider("internal-pwd").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unregister_destroys_bound_sessions() {
        let fixture = fixture();
        fixture
            .manager
            .add_provider("acme", entity("internal-pwd", "acme"))
            .await
            .unwrap();
        fixture
            .manager
            .register_provider("acme", "internal-pwd")
            .await
            .unwrap();

        let subject_id = Uuid::now_v7();
        fixture
            .sessions
            .register_session(&Session::new("acme", subject_id, "internal-pwd"))
            .await
            .unwrap();
        fixture
            .sessions
            .register_session(&Session::new("acme", subject_id, "other-pwd"))
            .await
            .unwrap();

        let destroyed = fixture
            .manager
            .unregister_provider("acme", "internal-pwd")
            .await
            .unwrap();

        assert_eq!(destroyed, 1);
        assert!(!fixture.manager.is_active("internal-pwd"));
        assert!(fixture
            .sessions
            .list_provider_sessions("internal-pwd")
            .await
            .unwrap()
            .is_empty());

        let persisted = fixture.store.get_provider("internal-pwd").await.unwrap();
        assert!(!persisted.enabled);
    }

    #[tokio::test]
    async fn realm_ownership_is_checked() {
        let fixture = fixture();
        fixture
            .manager
            .add_provider("acme", entity("internal-pwd", "acme"))
            .await
            .unwrap();

        let err = fixture
            .manager
            .delete_provider("beta", "internal-pwd")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::RealmMismatch { .. }));

        let err = fixture
            .manager
            .register_provider("beta", "internal-pwd")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::RealmMismatch { .. }));
    }

    #[tokio::test]
    async fn update_preserves_the_enabled_flag() {
        let fixture = fixture();
        fixture
            .manager
            .add_provider("acme", entity("internal-pwd", "acme"))
            .await
            .unwrap();
        fixture
            .manager
            .register_provider("acme", "internal-pwd")
            .await
            .unwrap();

        let updated = entity("internal-pwd", "acme")
            .with_config("max_failures", serde_json::json!(10));
        let stored = fixture
            .manager
            .update_provider("acme", updated)
            .await
            .unwrap();
        assert!(stored.enabled);
        assert_eq!(
            fixture
                .store
                .get_provider("internal-pwd")
                .await
                .unwrap()
                .configuration
                .get("max_failures"),
            Some(&serde_json::json!(10))
        );
    }

    #[tokio::test]
    async fn bootstrap_providers_go_straight_to_the_authority() {
        let fixture = fixture();
        let declared = BootstrapProvider {
            provider_id: "system-pwd".to_string(),
            authority: "internal".to_string(),
            realm: "system".to_string(),
            name: "System password".to_string(),
            configuration: Default::default(),
        };

        let registered = fixture
            .manager
            .register_bootstrap(&[declared])
            .await
            .unwrap();

        assert_eq!(registered, 1);
        assert!(fixture.manager.is_active("system-pwd"));
        // Never persisted.
        assert!(fixture
            .store
            .find_provider("system-pwd")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn bootstrap_rejects_ordinary_realms() {
        let fixture = fixture();
        let declared = BootstrapProvider {
            provider_id: "acme-pwd".to_string(),
            authority: "internal".to_string(),
            realm: "acme".to_string(),
            name: "Acme password".to_string(),
            configuration: Default::default(),
        };

        let err = fixture
            .manager
            .register_bootstrap(&[declared])
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Configuration(_)));
    }
}
