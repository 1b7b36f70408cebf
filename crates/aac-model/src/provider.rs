//! Persisted provider configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::authority::AuthorityKind;
use crate::realm::is_reserved_realm;

/// Persisted configuration of an identity provider.
///
/// Entities are created disabled and only become live through an explicit
/// register operation. Providers in the reserved realms never exist as
/// entities; they are config-file-defined and immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEntity {
    /// Provider identifier, unique across the deployment.
    pub provider_id: String,
    /// Authority family that owns this provider.
    pub authority: AuthorityKind,
    /// Realm the provider serves.
    pub realm: String,
    /// Human-readable name.
    pub name: String,
    /// Whether the provider should be live.
    pub enabled: bool,
    /// Provider-specific configuration map.
    pub configuration: HashMap<String, serde_json::Value>,
}

impl ProviderEntity {
    /// Creates a new, disabled provider entity.
    #[must_use]
    pub fn new(
        provider_id: impl Into<String>,
        authority: AuthorityKind,
        realm: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            authority,
            realm: realm.into(),
            name: name.into(),
            enabled: false,
            configuration: HashMap::new(),
        }
    }

    /// Sets a configuration value.
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.configuration.insert(key.into(), value);
        self
    }

    /// Gets a string configuration value.
    #[must_use]
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.configuration.get(key).and_then(|v| v.as_str())
    }

    /// Returns whether this entity lives in a reserved realm.
    #[must_use]
    pub fn in_reserved_realm(&self) -> bool {
        is_reserved_realm(&self.realm)
    }
}
