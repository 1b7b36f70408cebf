//! # aac-model
//!
//! Domain model for AAC.
//!
//! Subjects are the durable identity anchors; principals are transient
//! per-attempt proofs of identity; user identities bind a subject to one
//! external account through a (realm, authority, provider) tuple.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod authority;
pub mod identity;
pub mod principal;
pub mod provider;
pub mod realm;
pub mod subject;
pub mod user;

pub use authority::{AuthorityKind, GrantedAuthority, ParseAuthorityError};
pub use identity::{IdentityKey, UserAccount, UserIdentity};
pub use principal::Principal;
pub use provider::ProviderEntity;
pub use realm::{is_reserved_realm, GLOBAL_REALM, SYSTEM_REALM};
pub use subject::Subject;
pub use user::UserDetails;
