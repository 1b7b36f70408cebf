//! Authority kinds and granted authorities.
//!
//! `AuthorityKind` is the closed set of identity backend families. Dispatch
//! over backends happens through the provider capability traits; the kind is
//! the registration key, not a reflection hook.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of identity provider authority families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorityKind {
    /// Internal account store.
    Internal,
    /// Internal password verification.
    Password,
    /// OpenID Connect relying party.
    Oidc,
    /// SAML service provider.
    Saml,
    /// SPID (Italian public digital identity, SAML profile).
    Spid,
    /// WebAuthn relying party.
    #[serde(rename = "webauthn")]
    WebAuthn,
    /// Sign in with Apple.
    Apple,
}

impl AuthorityKind {
    /// Returns the stable string identifier for this authority.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::Password => "password",
            Self::Oidc => "oidc",
            Self::Saml => "saml",
            Self::Spid => "spid",
            Self::WebAuthn => "webauthn",
            Self::Apple => "apple",
        }
    }
}

impl fmt::Display for AuthorityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown authority identifier.
#[derive(Debug, Error)]
#[error("unknown authority: {0}")]
pub struct ParseAuthorityError(pub String);

impl FromStr for AuthorityKind {
    type Err = ParseAuthorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal" => Ok(Self::Internal),
            "password" => Ok(Self::Password),
            "oidc" => Ok(Self::Oidc),
            "saml" => Ok(Self::Saml),
            "spid" => Ok(Self::Spid),
            "webauthn" => Ok(Self::WebAuthn),
            "apple" => Ok(Self::Apple),
            other => Err(ParseAuthorityError(other.to_string())),
        }
    }
}

/// An authority granted to an authenticated session.
///
/// Ordered so that authority sets live in `BTreeSet` and merge-union is
/// canonical and deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GrantedAuthority {
    /// Base authority carried by every authenticated user.
    User,
    /// Deployment administrator.
    Admin,
    /// A realm-scoped role.
    Realm {
        /// Realm the role belongs to.
        realm: String,
        /// Role name.
        role: String,
    },
}

impl GrantedAuthority {
    /// Creates a realm-scoped role authority.
    #[must_use]
    pub fn realm_role(realm: impl Into<String>, role: impl Into<String>) -> Self {
        Self::Realm {
            realm: realm.into(),
            role: role.into(),
        }
    }
}

impl fmt::Display for GrantedAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("ROLE_USER"),
            Self::Admin => f.write_str("ROLE_ADMIN"),
            Self::Realm { realm, role } => write!(f, "{realm}:{role}"),
        }
    }
}
