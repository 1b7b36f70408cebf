//! # aac-identity
//!
//! Identity provider contracts for AAC.
//!
//! Every authentication backend implements the same capability set: an
//! authentication provider that verifies raw credentials into a principal,
//! a subject resolver that maps principals onto durable subjects, and
//! identity conversion that persists the account-to-subject binding. The
//! authority registry is the runtime lookup table the authentication
//! manager dispatches through.
//!
//! The internal password backend ships here as the reference
//! implementation of the full capability set.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod error;
pub mod internal;
pub mod password;
pub mod provider;
pub mod registry;
pub mod request;
pub mod token;

pub use error::{AuthenticationError, IdentityError, IdentityResult};
pub use internal::{InternalAuthority, InternalPasswordProvider};
pub use password::{PasswordHasherService, PasswordPolicy};
pub use provider::{
    ExtendedAuthenticationProvider, IdentityListing, IdentityProvider, IdentityProviderAuthority,
    SubjectResolver,
};
pub use registry::AuthorityRegistry;
pub use request::{AuthenticationRequest, Credential};
pub use token::ProviderAuthentication;
