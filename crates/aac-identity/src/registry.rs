//! Authority registry.
//!
//! Runtime lookup table from authority kind to its live providers. Safe
//! for concurrent reads; registration is an administrative/bootstrap-time
//! operation.

use std::sync::Arc;

use dashmap::DashMap;

use aac_model::AuthorityKind;

use crate::error::{IdentityError, IdentityResult};
use crate::provider::{IdentityProvider, IdentityProviderAuthority};

/// Registry of identity provider authorities.
///
/// Authorities are keyed by kind. Registering a second authority under an
/// already-used kind replaces the first: last write wins.
#[derive(Default)]
pub struct AuthorityRegistry {
    authorities: DashMap<AuthorityKind, Arc<dyn IdentityProviderAuthority>>,
}

impl AuthorityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an authority, replacing any previous one of the same kind.
    pub fn register_authority(&self, authority: Arc<dyn IdentityProviderAuthority>) {
        let kind = authority.kind();
        if self.authorities.insert(kind, authority).is_some() {
            tracing::warn!(authority = %kind, "replaced existing authority registration");
        }
    }

    /// Gets an authority by kind.
    ///
    /// ## Errors
    ///
    /// Returns `IdentityError::AuthorityNotFound` when no authority of the
    /// kind is registered.
    pub fn get_authority(
        &self,
        kind: AuthorityKind,
    ) -> IdentityResult<Arc<dyn IdentityProviderAuthority>> {
        self.authorities
            .get(&kind)
            .map(|a| Arc::clone(&a))
            .ok_or_else(|| IdentityError::AuthorityNotFound(kind.to_string()))
    }

    /// Checks whether an authority is registered.
    #[must_use]
    pub fn has_authority(&self, kind: AuthorityKind) -> bool {
        self.authorities.contains_key(&kind)
    }

    /// Finds a live provider by id across every authority.
    #[must_use]
    pub fn find_provider(&self, provider_id: &str) -> Option<Arc<dyn IdentityProvider>> {
        self.authorities
            .iter()
            .find_map(|a| a.get_provider(provider_id))
    }

    /// Lists every live provider serving a realm, across authorities.
    #[must_use]
    pub fn providers_for_realm(&self, realm: &str) -> Vec<Arc<dyn IdentityProvider>> {
        self.authorities
            .iter()
            .flat_map(|a| a.providers_for_realm(realm))
            .collect()
    }

    /// Number of registered authorities.
    #[must_use]
    pub fn authority_count(&self) -> usize {
        self.authorities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use aac_model::ProviderEntity;

    #[derive(Debug)]
    struct EmptyAuthority {
        kind: AuthorityKind,
    }

    #[async_trait]
    impl IdentityProviderAuthority for EmptyAuthority {
        fn kind(&self) -> AuthorityKind {
            self.kind
        }

        fn get_provider(&self, _provider_id: &str) -> Option<Arc<dyn IdentityProvider>> {
            None
        }

        fn providers_for_realm(&self, _realm: &str) -> Vec<Arc<dyn IdentityProvider>> {
            Vec::new()
        }

        async fn register_provider(
            &self,
            entity: &ProviderEntity,
        ) -> IdentityResult<Arc<dyn IdentityProvider>> {
            Err(IdentityError::Configuration(format!(
                "unsupported provider {}",
                entity.provider_id
            )))
        }

        fn unregister_provider(&self, _provider_id: &str) -> bool {
            false
        }
    }

    #[test]
    fn registry_starts_empty() {
        let registry = AuthorityRegistry::new();
        assert_eq!(registry.authority_count(), 0);
        assert!(registry.get_authority(AuthorityKind::Internal).is_err());
    }

    #[test]
    fn registration_is_last_write_wins() {
        let registry = AuthorityRegistry::new();

        registry.register_authority(Arc::new(EmptyAuthority {
            kind: AuthorityKind::Oidc,
        }));
        registry.register_authority(Arc::new(EmptyAuthority {
            kind: AuthorityKind::Oidc,
        }));

        assert_eq!(registry.authority_count(), 1);
        assert!(registry.has_authority(AuthorityKind::Oidc));
    }

    #[test]
    fn find_provider_misses_cleanly() {
        let registry = AuthorityRegistry::new();
        registry.register_authority(Arc::new(EmptyAuthority {
            kind: AuthorityKind::Saml,
        }));

        assert!(registry.find_provider("corp-saml").is_none());
        assert!(registry.providers_for_realm("acme").is_empty());
    }
}
