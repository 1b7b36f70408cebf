//! User identity model.
//!
//! A `UserIdentity` is one (realm, authority, provider) binding of a subject
//! to an external account. The addressable key enforces the invariant that
//! at most one identity exists per (realm, authority, provider, subject).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authority::AuthorityKind;

/// Addressable key of a user identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    /// Realm of the binding.
    pub realm: String,
    /// Authority family of the provider.
    pub authority: AuthorityKind,
    /// Provider identifier.
    pub provider_id: String,
    /// Bound subject.
    pub subject_id: Uuid,
}

/// The account half of a user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    /// Provider-scoped account identifier.
    pub account_id: String,
    /// Username at the provider.
    pub username: String,
    /// Email at the provider.
    pub email: Option<String>,
    /// Whether the provider has verified the email.
    pub email_verified: bool,
    /// Whether the account is locked at the provider.
    pub locked: bool,
}

impl UserAccount {
    /// Creates a new unlocked account reference.
    #[must_use]
    pub fn new(account_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            username: username.into(),
            email: None,
            email_verified: false,
            locked: false,
        }
    }

    /// Sets the email address and its verification state.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>, verified: bool) -> Self {
        self.email = Some(email.into());
        self.email_verified = verified;
        self
    }

    /// Sets the locked flag.
    #[must_use]
    pub const fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }
}

/// One binding of a subject to an external account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Authority family of the owning provider.
    pub authority: AuthorityKind,
    /// Owning provider identifier.
    pub provider_id: String,
    /// Realm of the binding.
    pub realm: String,
    /// Bound subject.
    pub subject_id: Uuid,
    /// Account reference.
    pub account: UserAccount,
    /// Attribute sets attached to the identity.
    pub attributes: HashMap<String, serde_json::Value>,
    /// Credential material, erased before the identity is attached to any
    /// long-lived session token.
    credentials: Option<String>,
}

impl UserIdentity {
    /// Creates a new identity binding.
    #[must_use]
    pub fn new(
        authority: AuthorityKind,
        provider_id: impl Into<String>,
        realm: impl Into<String>,
        subject_id: Uuid,
        account: UserAccount,
    ) -> Self {
        Self {
            authority,
            provider_id: provider_id.into(),
            realm: realm.into(),
            subject_id,
            account,
            attributes: HashMap::new(),
            credentials: None,
        }
    }

    /// Attaches credential material.
    #[must_use]
    pub fn with_credentials(mut self, credentials: impl Into<String>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    /// Returns the addressable key of this identity.
    #[must_use]
    pub fn key(&self) -> IdentityKey {
        IdentityKey {
            realm: self.realm.clone(),
            authority: self.authority,
            provider_id: self.provider_id.clone(),
            subject_id: self.subject_id,
        }
    }

    /// Returns whether credential material is still attached.
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Erases credential material.
    ///
    /// Must be called before the identity is attached to a session token.
    pub fn erase_credentials(&mut self) {
        self.credentials = None;
    }
}
