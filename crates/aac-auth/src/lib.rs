//! # aac-auth
//!
//! The extended authentication pipeline.
//!
//! [`ExtendedAuthenticationManager`] orchestrates one authentication
//! attempt end to end: unwrap the request, locate the provider or
//! candidates, verify raw credentials, resolve the principal onto a
//! durable subject, gate on subject status, convert and link the
//! identity, merge authorities with any existing session, and build the
//! session token. Any step failing aborts the whole attempt; nothing is
//! partially committed.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod admin;
pub mod events;
pub mod manager;
pub mod request;
pub mod token;

pub use aac_identity::AuthenticationError;
pub use admin::{AdminError, SubjectAdministrator};
pub use events::{AuthenticationEventPublisher, TracingEventPublisher};
pub use manager::ExtendedAuthenticationManager;
pub use request::{RequestTarget, WrappedAuthenticationRequest};
pub use token::UserAuthentication;
