//! Session error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Session not found.
    #[error("session not found: {0}")]
    NotFound(Uuid),

    /// Session store failure.
    #[error("session store error: {0}")]
    Store(String),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
