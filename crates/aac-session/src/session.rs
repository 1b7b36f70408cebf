//! Session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// Session is active and valid.
    #[default]
    Active,
    /// Session has been terminated.
    Terminated,
}

/// An authenticated session.
///
/// Binds a subject to the provider that authenticated it. One subject may
/// hold several sessions, and one session is always bound to exactly one
/// realm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub session_id: Uuid,
    /// Realm of the session.
    pub realm: String,
    /// Authenticated subject.
    pub subject_id: Uuid,
    /// Providers that contributed an authentication to this session.
    pub provider_ids: Vec<String>,
    /// Current state.
    pub state: SessionState,
    /// When the session was created.
    pub started_at: DateTime<Utc>,
    /// Last activity timestamp.
    pub last_activity: DateTime<Utc>,
    /// Source IP address.
    pub ip_address: Option<String>,
}

impl Session {
    /// Creates a new active session.
    #[must_use]
    pub fn new(realm: impl Into<String>, subject_id: Uuid, provider_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::now_v7(),
            realm: realm.into(),
            subject_id,
            provider_ids: vec![provider_id.into()],
            state: SessionState::Active,
            started_at: now,
            last_activity: now,
            ip_address: None,
        }
    }

    /// Sets the source IP address.
    #[must_use]
    pub fn with_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Records a provider contributing to the session.
    pub fn add_provider(&mut self, provider_id: impl Into<String>) {
        let provider_id = provider_id.into();
        if !self.provider_ids.contains(&provider_id) {
            self.provider_ids.push(provider_id);
        }
    }

    /// Checks whether a provider contributed to this session.
    #[must_use]
    pub fn has_provider(&self, provider_id: &str) -> bool {
        self.provider_ids.iter().any(|p| p == provider_id)
    }

    /// Updates the last activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Checks if the session is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active)
    }

    /// Checks if the session has expired based on timeouts in seconds.
    #[must_use]
    pub fn is_expired(&self, idle_timeout: i64, max_lifespan: i64) -> bool {
        let now = Utc::now();

        if (now - self.last_activity).num_seconds() > idle_timeout {
            return true;
        }
        if (now - self.started_at).num_seconds() > max_lifespan {
            return true;
        }

        false
    }

    /// Terminates the session.
    pub fn terminate(&mut self) {
        self.state = SessionState::Terminated;
    }
}
