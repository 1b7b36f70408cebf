//! Configuration for the AAC core.
//!
//! Supports loading configuration from files or environment via serde.
//! Providers declared here are registered at bootstrap into the reserved
//! realms and never enter the persisted CRUD path.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Main configuration structure for AAC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Realm configuration.
    pub realm: RealmConfig,
    /// Session timeout configuration.
    pub session: SessionConfig,
    /// Account lockout policy.
    pub lockout: LockoutConfig,
    /// Providers defined at bootstrap (immutable, config-file only).
    #[serde(default)]
    pub bootstrap_providers: Vec<BootstrapProvider>,
}

/// Realm configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealmConfig {
    /// Default realm for requests that do not name one.
    pub default_realm: String,
}

/// Session timeout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum idle time in seconds before a session expires.
    pub idle_timeout: i64,
    /// Maximum session lifespan in seconds.
    pub max_lifespan: i64,
}

/// Account lockout policy.
///
/// ## NIST 800-53 Rev5: AC-7 (Unsuccessful Logon Attempts)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutConfig {
    /// Failed attempts before an account is temporarily locked.
    pub max_failures: u32,
    /// Lockout duration in seconds.
    pub lockout_seconds: i64,
}

/// A provider declared in configuration.
///
/// Bootstrap providers live in the reserved realms and are registered
/// directly with their authority at startup. They are never persisted and
/// never mutable through the provider CRUD path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapProvider {
    /// Provider identifier, unique across the deployment.
    pub provider_id: String,
    /// Authority identifier (e.g. "internal", "oidc", "saml").
    pub authority: String,
    /// Realm the provider serves.
    pub realm: String,
    /// Human-readable name.
    pub name: String,
    /// Provider-specific configuration map.
    #[serde(default)]
    pub configuration: HashMap<String, serde_json::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            realm: RealmConfig {
                default_realm: "system".to_string(),
            },
            session: SessionConfig {
                idle_timeout: 1800,
                max_lifespan: 36000,
            },
            lockout: LockoutConfig {
                max_failures: 5,
                lockout_seconds: 900,
            },
            bootstrap_providers: Vec::new(),
        }
    }
}
