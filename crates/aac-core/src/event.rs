//! Audit event model.
//!
//! ## NIST 800-53 Rev5: AU-2 (Event Logging)
//!
//! Structured events for security-relevant operations: authentication
//! attempts, identity linking, subject lifecycle, and provider lifecycle.
//!
//! ## NIST 800-53 Rev5: AU-3 (Content of Audit Records)
//!
//! Every event carries a timestamp, event type, outcome, and the subject,
//! realm, provider, and source IP when available.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// User authenticated successfully.
    Login,
    /// Authentication attempt failed.
    LoginError,
    /// User logged out.
    Logout,
    /// A new subject was created during authentication.
    SubjectCreated,
    /// A subject was deleted by an administrator.
    SubjectDeleted,
    /// An identity was linked to an existing subject.
    IdentityLinked,
    /// A provider was registered into the live registry.
    ProviderRegistered,
    /// A provider was unregistered from the live registry.
    ProviderUnregistered,
    /// Sessions were destroyed.
    SessionsDestroyed,
}

/// Outcome of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Failure,
}

/// A security event for audit logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,

    /// Timestamp of the event (ISO 8601).
    pub timestamp: DateTime<Utc>,

    /// Type of event.
    pub event_type: EventType,

    /// Outcome of the event.
    pub outcome: EventOutcome,

    /// Realm where the event occurred.
    pub realm: Option<String>,

    /// Subject associated with the event.
    pub subject_id: Option<Uuid>,

    /// Provider associated with the event.
    pub provider_id: Option<String>,

    /// Source IP address.
    pub ip_address: Option<String>,

    /// Error message (for failure events).
    pub error: Option<String>,

    /// Additional details as key-value pairs.
    pub details: Vec<(String, String)>,
}

impl Event {
    /// Creates a new event builder.
    #[must_use]
    pub const fn builder(event_type: EventType) -> EventBuilder {
        EventBuilder::new(event_type)
    }

    /// Emits the event to the `aac::audit` log target as structured JSON.
    pub fn log(&self) {
        tracing::info!(
            target: "aac::audit",
            event_type = ?self.event_type,
            event = %serde_json::to_string(self).unwrap_or_default(),
            "audit event"
        );
    }
}

/// Builder for creating events.
pub struct EventBuilder {
    event_type: EventType,
    outcome: EventOutcome,
    realm: Option<String>,
    subject_id: Option<Uuid>,
    provider_id: Option<String>,
    ip_address: Option<String>,
    error: Option<String>,
    details: Vec<(String, String)>,
}

impl EventBuilder {
    /// Creates a new event builder.
    #[must_use]
    pub const fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            outcome: EventOutcome::Success,
            realm: None,
            subject_id: None,
            provider_id: None,
            ip_address: None,
            error: None,
            details: Vec::new(),
        }
    }

    /// Sets the outcome to success.
    #[must_use]
    pub const fn success(mut self) -> Self {
        self.outcome = EventOutcome::Success;
        self
    }

    /// Sets the outcome to failure with an error message.
    #[must_use]
    pub fn failure(mut self, error: impl Into<String>) -> Self {
        self.outcome = EventOutcome::Failure;
        self.error = Some(error.into());
        self
    }

    /// Sets the realm.
    #[must_use]
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Sets the subject ID.
    #[must_use]
    pub const fn subject(mut self, subject_id: Uuid) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    /// Sets the provider ID.
    #[must_use]
    pub fn provider(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    /// Sets the source IP address.
    #[must_use]
    pub fn ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Adds a detail key-value pair.
    #[must_use]
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }

    /// Builds the event.
    #[must_use]
    pub fn build(self) -> Event {
        Event {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            event_type: self.event_type,
            outcome: self.outcome,
            realm: self.realm,
            subject_id: self.subject_id,
            provider_id: self.provider_id,
            ip_address: self.ip_address,
            error: self.error,
            details: self.details,
        }
    }
}
