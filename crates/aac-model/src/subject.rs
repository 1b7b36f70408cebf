//! Subject domain model.
//!
//! A subject is the durable identity anchor for a person or service inside
//! a realm. It is created exactly once per (realm, person), the first time
//! no resolver can find an existing match, and is mutated on every
//! successful login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A durable subject inside a realm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Opaque stable identifier.
    pub subject_id: Uuid,
    /// Realm this subject belongs to.
    pub realm: String,
    /// Username, unique within the realm.
    pub username: String,
    /// Email address, if known.
    pub email: Option<String>,
    /// Whether the email address has been verified.
    pub email_verified: bool,

    // === Status flags ===
    /// Administratively blocked; authentication is rejected.
    pub blocked: bool,
    /// Deactivated; authentication is rejected.
    pub inactive: bool,
    /// Account past its expiry; authentication is rejected.
    pub expired: bool,

    // === Timestamps ===
    /// When the subject was created.
    pub created_at: DateTime<Utc>,
    /// When the subject was last updated.
    pub updated_at: DateTime<Utc>,
    /// Timestamp of the last successful login.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Source IP of the last successful login.
    pub last_login_ip: Option<String>,
    /// Number of successful logins.
    pub login_count: u64,
}

impl Subject {
    /// Creates a new subject in the given realm.
    #[must_use]
    pub fn new(realm: impl Into<String>, username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            subject_id: Uuid::now_v7(),
            realm: realm.into(),
            username: username.into(),
            email: None,
            email_verified: false,
            blocked: false,
            inactive: false,
            expired: false,
            created_at: now,
            updated_at: now,
            last_login_at: None,
            last_login_ip: None,
            login_count: 0,
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Marks the email as verified.
    #[must_use]
    pub const fn with_email_verified(mut self, verified: bool) -> Self {
        self.email_verified = verified;
        self
    }

    /// Checks whether this subject may authenticate at all.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.blocked && !self.inactive && !self.expired
    }

    /// Records a successful login.
    pub fn record_login(&mut self, ip_address: Option<&str>) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.last_login_ip = ip_address.map(ToOwned::to_owned);
        self.login_count += 1;
        self.updated_at = now;
    }

    /// Synchronizes username and email from a fresh authentication.
    ///
    /// Email is only overwritten when the incoming value is present; an
    /// unverified incoming email never downgrades a verified one.
    pub fn sync_profile(&mut self, username: &str, email: Option<&str>, email_verified: bool) {
        if self.username != username {
            self.username = username.to_string();
        }
        if let Some(email) = email {
            if self.email.as_deref() != Some(email) {
                self.email = Some(email.to_string());
                self.email_verified = email_verified;
            } else if email_verified {
                self.email_verified = true;
            }
        }
        self.updated_at = Utc::now();
    }
}
