//! Session-scoped user authentication token.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aac_identity::ProviderAuthentication;
use aac_model::{GrantedAuthority, Subject, UserDetails};

/// The session token produced by a successful authentication.
///
/// Aggregates every provider-level authentication performed within the
/// session, the merged authority set, and the [`UserDetails`] aggregate.
/// Tokens are copy-on-write: merging a fresh authentication into an
/// existing session produces a new token rather than mutating the one
/// already handed out, so readers of the old token never observe a
/// half-merged state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAuthentication {
    /// Session identifier, stable across merges within the same session.
    pub session_id: Uuid,
    /// Authenticated subject.
    pub subject_id: Uuid,
    /// Realm of the session.
    pub realm: String,
    /// Username of the subject.
    pub username: String,
    /// Aggregate view of the subject.
    pub details: UserDetails,
    /// When the token was created.
    pub created_at: DateTime<Utc>,
    tokens: Vec<ProviderAuthentication>,
    authorities: BTreeSet<GrantedAuthority>,
}

impl UserAuthentication {
    /// Creates a fresh session token from one provider authentication.
    #[must_use]
    pub fn new(
        subject: &Subject,
        token: ProviderAuthentication,
        authorities: BTreeSet<GrantedAuthority>,
        details: UserDetails,
    ) -> Self {
        Self {
            session_id: Uuid::now_v7(),
            subject_id: subject.subject_id,
            realm: subject.realm.clone(),
            username: subject.username.clone(),
            details,
            created_at: Utc::now(),
            tokens: vec![token],
            authorities,
        }
    }

    /// The provider-level tokens backing this session.
    #[must_use]
    pub fn tokens(&self) -> &[ProviderAuthentication] {
        &self.tokens
    }

    /// The merged authority set.
    #[must_use]
    pub const fn authorities(&self) -> &BTreeSet<GrantedAuthority> {
        &self.authorities
    }

    /// Checks whether an authority is granted.
    #[must_use]
    pub fn has_authority(&self, authority: &GrantedAuthority) -> bool {
        self.authorities.contains(authority)
    }

    /// The most recent token issued by the given provider, if any.
    #[must_use]
    pub fn token_for_provider(&self, provider_id: &str) -> Option<&ProviderAuthentication> {
        self.tokens
            .iter()
            .rev()
            .find(|t| t.provider_id == provider_id)
    }

    /// Returns whether the token belongs to the given subject and realm.
    #[must_use]
    pub fn is_same_session_scope(&self, subject_id: Uuid, realm: &str) -> bool {
        self.subject_id == subject_id && self.realm == realm
    }

    /// Merges a fresh authentication into this session, producing a new
    /// token that keeps this session's id.
    ///
    /// The caller has already established that the fresh authentication is
    /// for the same subject and realm. Provider tokens accumulate;
    /// authorities are the union of both sets; details and timestamps come
    /// from the fresh authentication.
    #[must_use]
    pub fn merged_with(&self, fresh: UserAuthentication) -> UserAuthentication {
        let mut tokens = self.tokens.clone();
        tokens.extend(fresh.tokens);

        let mut authorities = self.authorities.clone();
        authorities.extend(fresh.authorities);

        UserAuthentication {
            session_id: self.session_id,
            subject_id: fresh.subject_id,
            realm: fresh.realm,
            username: fresh.username,
            details: fresh.details,
            created_at: fresh.created_at,
            tokens,
            authorities,
        }
    }

    /// Erases credential material from every provider token and from the
    /// details aggregate.
    pub fn erase_credentials(&mut self) {
        for token in &mut self.tokens {
            token.erase_credentials();
        }
        self.details.erase_credentials();
    }

    /// Returns whether no credential material remains anywhere in the
    /// token.
    #[must_use]
    pub fn is_fully_erased(&self) -> bool {
        self.tokens.iter().all(|t| !t.has_credentials())
            && self.details.identities.iter().all(|i| !i.has_credentials())
    }
}
