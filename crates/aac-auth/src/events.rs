//! Authentication event publishing.
//!
//! ## NIST 800-53 Rev5: AU-2 (Event Logging)
//!
//! Every authentication attempt produces exactly one event: a success
//! event when a session token is handed out, or a failure event carrying
//! the error code otherwise.

use aac_core::event::{Event, EventType};
use aac_identity::AuthenticationError;

use crate::request::WrappedAuthenticationRequest;
use crate::token::UserAuthentication;

/// Sink for authentication audit events.
pub trait AuthenticationEventPublisher: Send + Sync {
    /// Publishes a successful authentication.
    fn publish_authentication_success(&self, authentication: &UserAuthentication);

    /// Publishes a failed authentication attempt.
    fn publish_authentication_failure(
        &self,
        request: &WrappedAuthenticationRequest,
        error: &AuthenticationError,
    );
}

/// Publisher that emits events to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventPublisher;

impl TracingEventPublisher {
    /// Creates a new tracing publisher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AuthenticationEventPublisher for TracingEventPublisher {
    fn publish_authentication_success(&self, authentication: &UserAuthentication) {
        let mut builder = Event::builder(EventType::Login)
            .success()
            .realm(authentication.realm.as_str())
            .subject(authentication.subject_id);
        if let Some(token) = authentication.tokens().last() {
            builder = builder.provider(token.provider_id.as_str());
        }
        let event = builder.build();

        tracing::info!(
            target: "aac::audit",
            event = %serde_json::to_string(&event).unwrap_or_default(),
            session_id = %authentication.session_id,
            "authentication succeeded"
        );
    }

    fn publish_authentication_failure(
        &self,
        request: &WrappedAuthenticationRequest,
        error: &AuthenticationError,
    ) {
        let mut builder = Event::builder(EventType::LoginError)
            .failure(error.code())
            .realm(request.realm.as_str());
        if let Some(provider_id) = request.provider_id() {
            builder = builder.provider(provider_id);
        }
        if let Some(ip) = &request.ip_address {
            builder = builder.ip_address(ip);
        }
        let event = builder.build();

        tracing::warn!(
            target: "aac::audit",
            event = %serde_json::to_string(&event).unwrap_or_default(),
            code = %error.code(),
            "authentication failed"
        );
    }
}
