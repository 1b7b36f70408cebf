//! # aac-session
//!
//! Session model and the session manager contract.
//!
//! Sessions record which provider authenticated which subject. The provider
//! lifecycle depends on the manager to terminate every session bound to a
//! provider when that provider is unregistered.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod error;
pub mod manager;
pub mod session;

pub use error::{SessionError, SessionResult};
pub use manager::{InMemorySessionManager, SessionManager};
pub use session::{Session, SessionState};
