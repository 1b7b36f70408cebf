//! Provider-level authentication token.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aac_model::{AuthorityKind, GrantedAuthority, Principal};

use crate::request::Credential;

/// The result of one successful provider-level authentication.
///
/// Produced by [`ExtendedAuthenticationProvider::authenticate`]; carries
/// the fresh principal and the authorities the provider vouches for. One or
/// more of these are embedded in the session-scoped user authentication.
///
/// [`ExtendedAuthenticationProvider::authenticate`]:
///     crate::ExtendedAuthenticationProvider::authenticate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderAuthentication {
    /// Authority family of the issuing provider.
    pub authority: AuthorityKind,
    /// Issuing provider.
    pub provider_id: String,
    /// Realm of the authentication.
    pub realm: String,
    /// The authenticated principal.
    pub principal: Principal,
    /// Authorities granted by this provider.
    pub authorities: BTreeSet<GrantedAuthority>,
    /// When the authentication happened.
    pub issued_at: DateTime<Utc>,
    /// Residual credential material from the exchange, if any.
    credentials: Credential,
}

impl ProviderAuthentication {
    /// Creates a new provider authentication.
    #[must_use]
    pub fn new(
        authority: AuthorityKind,
        provider_id: impl Into<String>,
        realm: impl Into<String>,
        principal: Principal,
        authorities: BTreeSet<GrantedAuthority>,
    ) -> Self {
        Self {
            authority,
            provider_id: provider_id.into(),
            realm: realm.into(),
            principal,
            authorities,
            issued_at: Utc::now(),
            credentials: Credential::default(),
        }
    }

    /// Attaches residual credential material from the exchange.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credential) -> Self {
        self.credentials = credentials;
        self
    }

    /// Returns whether residual credential material is still present.
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        !self.credentials.is_erased()
    }

    /// Erases residual credential material.
    pub fn erase_credentials(&mut self) {
        self.credentials.erase();
    }
}
