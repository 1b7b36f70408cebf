//! End-to-end tests for the authentication core.
//!
//! These tests wire the full stack together in memory: authority registry,
//! internal password providers, user and session storage, the extended
//! authentication manager, and the provider lifecycle manager.

mod common;

mod auth_pipeline;
mod provider_lifecycle;
