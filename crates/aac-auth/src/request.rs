//! Wrapped authentication requests.

use serde::{Deserialize, Serialize};

use aac_identity::AuthenticationRequest;
use aac_model::AuthorityKind;

/// Where an authentication request is aimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestTarget {
    /// A specific provider, e.g. a form submitted to one IdP's callback
    /// URL. Resolution is exact; there is no fallback search.
    Provider {
        /// Authority family of the provider.
        authority: AuthorityKind,
        /// Provider identifier.
        provider_id: String,
    },
    /// Any provider in the realm that understands the credential, e.g. a
    /// username/password form shared across several local providers.
    Realm,
}

/// An authentication request as received from the transport layer.
///
/// Carries the realm, the dispatch target, the raw credential, and the
/// request metadata the audit trail wants. The wrapper is erased together
/// with the rest of the credential material before any session token is
/// handed out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrappedAuthenticationRequest {
    /// Realm the request authenticates against.
    pub realm: String,
    /// Dispatch target.
    pub target: RequestTarget,
    /// The raw credential.
    pub request: AuthenticationRequest,
    /// Source IP address, when the transport knows it.
    pub ip_address: Option<String>,
}

impl WrappedAuthenticationRequest {
    /// Creates a provider-targeted request.
    #[must_use]
    pub fn for_provider(
        realm: impl Into<String>,
        authority: AuthorityKind,
        provider_id: impl Into<String>,
        request: AuthenticationRequest,
    ) -> Self {
        Self {
            realm: realm.into(),
            target: RequestTarget::Provider {
                authority,
                provider_id: provider_id.into(),
            },
            request,
            ip_address: None,
        }
    }

    /// Creates a realm-targeted request.
    #[must_use]
    pub fn for_realm(realm: impl Into<String>, request: AuthenticationRequest) -> Self {
        Self {
            realm: realm.into(),
            target: RequestTarget::Realm,
            request,
            ip_address: None,
        }
    }

    /// Sets the source IP address.
    #[must_use]
    pub fn with_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// The targeted provider id, for provider-targeted requests.
    #[must_use]
    pub fn provider_id(&self) -> Option<&str> {
        match &self.target {
            RequestTarget::Provider { provider_id, .. } => Some(provider_id),
            RequestTarget::Realm => None,
        }
    }

    /// Erases the raw credential held by the wrapper.
    pub fn erase_credentials(&mut self) {
        self.request.erase_credentials();
    }

    /// Returns whether the raw credential has been erased.
    #[must_use]
    pub const fn is_erased(&self) -> bool {
        self.request.is_erased()
    }
}
