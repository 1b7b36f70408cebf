//! # aac-core
//!
//! Core configuration and audit events for AAC.
//!
//! This crate provides foundational types used across all other AAC crates.
//!
//! ## NIST 800-53 Rev5 Controls
//!
//! - AU-2: Event logging framework

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod event;

pub use config::Config;
pub use event::{Event, EventBuilder, EventOutcome, EventType};
