//! Administrative subject operations.
//!
//! ## NIST 800-53 Rev5: AC-2 (Account Management)
//!
//! Subject deletion is an explicit administrative act and removes the
//! whole footprint at once: the provider links, the durable subject
//! record, and every live session of the subject.

use std::sync::Arc;

use aac_core::event::{Event, EventType};
use aac_identity::AuthorityRegistry;
use aac_session::{SessionError, SessionManager};
use aac_storage::{StorageError, UserEntityService};
use thiserror::Error;
use uuid::Uuid;

/// Errors from administrative subject operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Subject storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Session store failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Administrative operations over subjects.
pub struct SubjectAdministrator {
    registry: Arc<AuthorityRegistry>,
    users: Arc<dyn UserEntityService>,
    sessions: Arc<dyn SessionManager>,
}

impl SubjectAdministrator {
    /// Creates an administrator over the given collaborators.
    #[must_use]
    pub fn new(
        registry: Arc<AuthorityRegistry>,
        users: Arc<dyn UserEntityService>,
        sessions: Arc<dyn SessionManager>,
    ) -> Self {
        Self {
            registry,
            users,
            sessions,
        }
    }

    /// Deletes a subject and everything hanging off it.
    ///
    /// Provider identity links go first (best effort per provider), then
    /// the subject record with its stored authorities, then every live
    /// session of the subject. Returns the number of sessions destroyed.
    ///
    /// ## Errors
    ///
    /// Returns `Storage(NotFound)` when no subject matches the realm and
    /// id; storage and session failures after that point propagate.
    pub async fn delete_subject(&self, realm: &str, subject_id: Uuid) -> Result<u64, AdminError> {
        let subject = self.users.get_user(realm, subject_id).await?;

        for provider in self.registry.providers_for_realm(realm) {
            match provider.unlink_identities(subject_id).await {
                Ok(0) => {}
                Ok(unlinked) => {
                    tracing::info!(
                        provider = %provider.provider_id(),
                        subject_id = %subject_id,
                        unlinked,
                        "unlinked provider identities"
                    );
                }
                Err(error) => {
                    tracing::warn!(
                        provider = %provider.provider_id(),
                        error = %error,
                        "identity unlink failed, skipping provider"
                    );
                }
            }
        }

        self.users.delete_user(realm, subject_id).await?;
        let destroyed = self.sessions.destroy_user_sessions(subject_id).await?;

        Event::builder(EventType::SubjectDeleted)
            .success()
            .realm(realm)
            .subject(subject_id)
            .detail("username", subject.username.as_str())
            .detail("sessions_destroyed", destroyed.to_string())
            .build()
            .log();
        Ok(destroyed)
    }
}
