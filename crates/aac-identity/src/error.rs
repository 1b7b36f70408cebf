//! Identity and authentication error types.
//!
//! ## NIST 800-53 Rev5: IA-6 (Authentication Feedback)
//!
//! Authentication failures surface generic messages; which provider
//! recognized-but-rejected a credential is never revealed to callers.

use chrono::{DateTime, Utc};
use thiserror::Error;

use aac_storage::StorageError;

/// Errors from identity provider and registry operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No authority registered for the requested kind.
    #[error("authority not found: {0}")]
    AuthorityNotFound(String),

    /// No live provider for the requested id.
    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    /// The principal has no account in this provider.
    #[error("identity not found: {0}")]
    IdentityNotFound(String),

    /// Provider configuration is invalid.
    #[error("provider configuration error: {0}")]
    Configuration(String),

    /// Underlying storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Errors terminating an authentication attempt.
///
/// Every variant is terminal for the current attempt; nothing in the core
/// is retried automatically.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// Requested authority/provider/realm combination has no live provider.
    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    /// Raw token rejected by every candidate provider, or structurally
    /// invalid.
    #[error("bad credentials")]
    BadCredentials,

    /// Subject or account is blocked.
    #[error("account is locked")]
    Locked {
        /// When the lockout expires, when known.
        until: Option<DateTime<Utc>>,
    },

    /// Subject is deactivated.
    #[error("account is disabled")]
    Disabled,

    /// Subject account has expired.
    #[error("account has expired")]
    AccountExpired,

    /// Principal present but no identity could be resolved for it.
    #[error("user not found")]
    UsernameNotFound,

    /// Internal consistency violation in a collaborator.
    ///
    /// Logged at error level; the message shown to callers stays generic.
    #[error("error processing request")]
    Service(String),
}

impl AuthenticationError {
    /// Creates a service error.
    #[must_use]
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Checks whether this is a credential failure, as opposed to a
    /// status gate or an internal error.
    #[must_use]
    pub const fn is_credential_failure(&self) -> bool {
        matches!(self, Self::BadCredentials | Self::UsernameNotFound)
    }

    /// Checks whether this is a subject-status gate.
    #[must_use]
    pub const fn is_status_gate(&self) -> bool {
        matches!(self, Self::Locked { .. } | Self::Disabled | Self::AccountExpired)
    }

    /// A short stable code for audit records.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ProviderNotFound(_) => "provider_not_found",
            Self::BadCredentials => "bad_credentials",
            Self::Locked { .. } => "locked",
            Self::Disabled => "disabled",
            Self::AccountExpired => "account_expired",
            Self::UsernameNotFound => "user_not_found",
            Self::Service(_) => "service_error",
        }
    }
}

impl From<IdentityError> for AuthenticationError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::AuthorityNotFound(id) | IdentityError::ProviderNotFound(id) => {
                Self::ProviderNotFound(id)
            }
            IdentityError::IdentityNotFound(_) => Self::UsernameNotFound,
            IdentityError::Configuration(msg) => Self::Service(msg),
            IdentityError::Storage(err) => Self::Service(err.to_string()),
        }
    }
}
