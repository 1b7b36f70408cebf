//! # aac-provider
//!
//! The provider lifecycle state machine.
//!
//! Persisted provider entities move between two states: unregistered
//! (stored, disabled) and registered (live in the authority registry).
//! [`ProviderManager`] drives the transitions and enforces the lifecycle
//! constraints: reserved-realm providers are immutable, active providers
//! cannot be deleted or registered twice, and unregistration always
//! terminates the sessions bound to the provider.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod error;
pub mod manager;
pub mod service;

pub use error::{RegistrationError, RegistrationResult};
pub use manager::ProviderManager;
pub use service::{InMemoryProviderService, ProviderService};
