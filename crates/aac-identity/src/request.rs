//! Raw authentication requests and erasable credentials.

use serde::{Deserialize, Serialize};

use aac_model::AuthorityKind;

/// A single erasable secret.
///
/// Wraps raw credential material so it can be wiped in place once the
/// authentication pipeline no longer needs it. The secret is excluded from
/// serialization and from `Debug` output.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credential {
    #[serde(skip)]
    secret: Option<String>,
}

impl Credential {
    /// Creates a credential holding the given secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(secret.into()),
        }
    }

    /// Returns the secret, if not yet erased.
    #[must_use]
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    /// Returns whether secret material is still present.
    #[must_use]
    pub const fn is_erased(&self) -> bool {
        self.secret.is_none()
    }

    /// Erases the secret in place.
    pub fn erase(&mut self) {
        self.secret = None;
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.secret.is_some() {
            f.write_str("Credential(****)")
        } else {
            f.write_str("Credential(erased)")
        }
    }
}

/// The closed set of raw authentication request shapes.
///
/// Concrete backends accept the shapes they understand via
/// [`supports`](crate::ExtendedAuthenticationProvider::supports); a shape a
/// provider does not understand is rejected as bad credentials, never
/// guessed at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuthenticationRequest {
    /// A username/password form submission.
    UsernamePassword {
        /// Submitted username.
        username: String,
        /// Submitted password.
        password: Credential,
    },
    /// An externally issued assertion (OIDC code/token, SAML response,
    /// WebAuthn ceremony result, Apple identity token).
    Assertion {
        /// Authority family the assertion targets.
        authority: AuthorityKind,
        /// Opaque assertion payload.
        assertion: Credential,
    },
}

impl AuthenticationRequest {
    /// Creates a username/password request.
    #[must_use]
    pub fn username_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::UsernamePassword {
            username: username.into(),
            password: Credential::new(password),
        }
    }

    /// Creates an assertion request.
    #[must_use]
    pub fn assertion(authority: AuthorityKind, assertion: impl Into<String>) -> Self {
        Self::Assertion {
            authority,
            assertion: Credential::new(assertion),
        }
    }

    /// Erases every secret held by the request.
    pub fn erase_credentials(&mut self) {
        match self {
            Self::UsernamePassword { password, .. } => password.erase(),
            Self::Assertion { assertion, .. } => assertion.erase(),
        }
    }

    /// Returns whether all secret material has been erased.
    #[must_use]
    pub const fn is_erased(&self) -> bool {
        match self {
            Self::UsernamePassword { password, .. } => password.is_erased(),
            Self::Assertion { assertion, .. } => assertion.is_erased(),
        }
    }
}
