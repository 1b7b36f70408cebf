//! Authenticated principal model.
//!
//! A principal is the transient, provider-specific proof of identity
//! produced fresh for each authentication attempt. It is never persisted
//! directly, only through the `UserIdentity` it is converted into.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A provider-issued authenticated principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Provider-scoped principal identifier.
    pub principal_id: String,
    /// Username reported by the provider.
    pub username: String,
    /// Email address reported by the provider.
    pub email: Option<String>,
    /// Whether the issuing provider has verified the email address.
    ///
    /// Cross-provider resolution by email is only permitted when this is
    /// true; an unverified email must never link accounts.
    pub email_verified: bool,
    /// Raw attributes reported by the provider.
    pub attributes: HashMap<String, serde_json::Value>,
}

impl Principal {
    /// Creates a new principal.
    #[must_use]
    pub fn new(principal_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            username: username.into(),
            email: None,
            email_verified: false,
            attributes: HashMap::new(),
        }
    }

    /// Sets the email address and its verification state.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>, verified: bool) -> Self {
        self.email = Some(email.into());
        self.email_verified = verified;
        self
    }

    /// Adds a raw attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Returns the email only when the provider marked it verified.
    #[must_use]
    pub fn verified_email(&self) -> Option<&str> {
        if self.email_verified {
            self.email.as_deref()
        } else {
            None
        }
    }
}
