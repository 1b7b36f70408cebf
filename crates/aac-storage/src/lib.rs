//! # aac-storage
//!
//! Persistence contracts for subjects and user entities.
//!
//! The authentication core consumes these services; it does not own the
//! backing store. An in-memory implementation is provided for tests and
//! for the internal provider.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod error;
pub mod memory;
pub mod service;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryUserService;
pub use service::{SubjectService, UserEntityService};
