//! Reserved realm identifiers.
//!
//! Providers in the reserved realms are config-file-defined and immutable:
//! they never enter the persisted provider CRUD path.

/// The system realm, home of deployment-level providers.
pub const SYSTEM_REALM: &str = "system";

/// The global realm, shared across all tenant realms.
pub const GLOBAL_REALM: &str = "global";

/// Checks whether a realm is reserved.
#[must_use]
pub fn is_reserved_realm(realm: &str) -> bool {
    realm == SYSTEM_REALM || realm == GLOBAL_REALM
}
