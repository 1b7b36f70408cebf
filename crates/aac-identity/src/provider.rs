//! Identity provider capability traits.
//!
//! Every concrete backend exposes the same capability set: raw-credential
//! authentication, subject resolution, identity conversion, and identity
//! listing. Backends that cannot support a capability say so through
//! explicit variants, never through null sentinels.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use aac_model::{AuthorityKind, Principal, ProviderEntity, Subject, UserIdentity};

use crate::error::{AuthenticationError, IdentityResult};
use crate::request::AuthenticationRequest;
use crate::token::ProviderAuthentication;

/// Verifies raw credentials into a provider authentication.
#[async_trait]
pub trait ExtendedAuthenticationProvider: Send + Sync {
    /// Checks whether this provider understands the request shape.
    ///
    /// A provider either handles a request deterministically or rejects
    /// it; `supports` is the cheap pre-filter used by realm-targeted
    /// dispatch.
    fn supports(&self, request: &AuthenticationRequest) -> bool;

    /// Authenticates a raw request.
    ///
    /// ## Errors
    ///
    /// Returns `BadCredentials` when the request is structurally invalid
    /// for this provider or the credential is wrong, and provider-specific
    /// status errors (locked, expired) otherwise. Never retries.
    async fn authenticate(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<ProviderAuthentication, AuthenticationError>;
}

/// Resolves principals onto durable subjects.
///
/// The three strategies are independent and ordered by the caller:
/// persisted-account match first, username second, verified email last.
#[async_trait]
pub trait SubjectResolver: Send + Sync {
    /// Resolves by exact persisted-account (principal) id.
    async fn resolve_by_principal_id(&self, principal_id: &str)
        -> IdentityResult<Option<Subject>>;

    /// Resolves by username.
    async fn resolve_by_username(&self, username: &str) -> IdentityResult<Option<Subject>>;

    /// Resolves by email address.
    ///
    /// Implementations must only match accounts whose email is verified;
    /// callers additionally gate this path on the incoming principal's
    /// verified flag.
    async fn resolve_by_email(&self, email: &str) -> IdentityResult<Option<Subject>>;
}

/// Result of an identity listing.
#[derive(Debug, Clone)]
pub enum IdentityListing {
    /// This provider does not support identity listing or linking.
    Unsupported,
    /// The identities bound to the requested subject.
    Identities(Vec<UserIdentity>),
}

impl IdentityListing {
    /// Returns the identities, treating `Unsupported` as empty.
    #[must_use]
    pub fn into_identities(self) -> Vec<UserIdentity> {
        match self {
            Self::Unsupported => Vec::new(),
            Self::Identities(identities) => identities,
        }
    }
}

/// A live identity provider: one configured backend in one realm.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authority family of this provider.
    fn authority(&self) -> AuthorityKind;

    /// Provider identifier, unique across the deployment.
    fn provider_id(&self) -> &str;

    /// Realm this provider serves.
    fn realm(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// The raw-credential verifier of this provider.
    fn authentication_provider(&self) -> &dyn ExtendedAuthenticationProvider;

    /// The subject resolver of this provider.
    fn subject_resolver(&self) -> &dyn SubjectResolver;

    /// Converts a principal into a durable identity bound to a subject.
    ///
    /// Persists the account-to-subject link when the provider supports
    /// persistence. Calling twice with the same (principal, subject) pair
    /// updates the existing binding in place.
    ///
    /// ## Errors
    ///
    /// Returns `IdentityError::IdentityNotFound` if the principal cannot
    /// be resolved into this provider's account model.
    async fn convert_identity(
        &self,
        principal: &Principal,
        subject_id: Uuid,
    ) -> IdentityResult<UserIdentity>;

    /// Lists the identities bound to a subject.
    ///
    /// `IdentityListing::Unsupported` is a valid, expected outcome for
    /// backends without identity linking.
    async fn list_identities(
        &self,
        subject_id: Uuid,
        fetch_attributes: bool,
    ) -> IdentityResult<IdentityListing>;

    /// Loads secondary attribute sets for a subject.
    ///
    /// Best-effort from the caller's perspective: failures are logged and
    /// skipped, never fatal to authentication.
    async fn load_attributes(
        &self,
        subject_id: Uuid,
    ) -> IdentityResult<HashMap<String, serde_json::Value>>;

    /// Removes this provider's account-to-subject links for a subject.
    ///
    /// Invoked during administrative subject deletion. Providers that keep
    /// no local link have nothing to do. Returns the number of links
    /// removed.
    ///
    /// ## Errors
    ///
    /// Propagates failures of the provider's account store.
    async fn unlink_identities(&self, subject_id: Uuid) -> IdentityResult<u64> {
        let _ = subject_id;
        Ok(0)
    }
}

/// An authority: owner of zero-or-more live providers of one kind.
///
/// Registration must be atomic from the perspective of concurrent lookups:
/// implementations construct the full provider first and only then publish
/// it into their lookup structure.
#[async_trait]
pub trait IdentityProviderAuthority: Send + Sync {
    /// The authority family this registry serves.
    fn kind(&self) -> AuthorityKind;

    /// Gets a live provider by id.
    fn get_provider(&self, provider_id: &str) -> Option<Arc<dyn IdentityProvider>>;

    /// Lists the live providers serving a realm.
    fn providers_for_realm(&self, realm: &str) -> Vec<Arc<dyn IdentityProvider>>;

    /// Builds a provider from persisted configuration and publishes it.
    ///
    /// ## Errors
    ///
    /// Returns `IdentityError::Configuration` when the entity does not
    /// describe a valid provider of this authority.
    async fn register_provider(
        &self,
        entity: &ProviderEntity,
    ) -> IdentityResult<Arc<dyn IdentityProvider>>;

    /// Removes a live provider.
    ///
    /// Returns whether a provider was actually removed.
    fn unregister_provider(&self, provider_id: &str) -> bool;
}
