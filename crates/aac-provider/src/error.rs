//! Provider lifecycle errors.

use thiserror::Error;

use aac_identity::IdentityError;
use aac_session::SessionError;
use aac_storage::StorageError;

/// Errors from provider lifecycle operations.
///
/// Constraint violations are always surfaced to the caller, never silently
/// ignored.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The operation targets a reserved-realm provider.
    #[error("global providers are immutable")]
    Immutable,

    /// The provider is live and must be unregistered first.
    #[error("active providers can not be deleted")]
    ActiveDelete,

    /// The provider is already live.
    #[error("active providers can not be registered again")]
    ActiveRegister,

    /// The provider's stored realm does not match the realm argument.
    #[error("provider {provider_id} does not belong to realm {realm}")]
    RealmMismatch {
        /// Provider named by the operation.
        provider_id: String,
        /// Realm argument of the operation.
        realm: String,
    },

    /// No persisted entity with the given id.
    #[error("provider not found: {0}")]
    NotFound(String),

    /// An entity with the same id already exists.
    #[error("provider already exists: {0}")]
    AlreadyExists(String),

    /// The bootstrap declaration is invalid.
    #[error("invalid provider configuration: {0}")]
    Configuration(String),

    /// The owning authority rejected the operation.
    #[error(transparent)]
    Authority(#[from] IdentityError),

    /// The entity store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The session manager failed during unregistration cleanup.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Result type for provider lifecycle operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_messages_are_stable() {
        assert_eq!(
            RegistrationError::Immutable.to_string(),
            "global providers are immutable"
        );
        assert_eq!(
            RegistrationError::ActiveDelete.to_string(),
            "active providers can not be deleted"
        );
        assert_eq!(
            RegistrationError::ActiveRegister.to_string(),
            "active providers can not be registered again"
        );
    }
}
