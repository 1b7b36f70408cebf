//! Session manager contract and in-memory implementation.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::SessionResult;
use crate::session::Session;

/// Manager for authenticated sessions.
///
/// Provider unregistration and administrative user deletion rely on the
/// destroy operations to leave no session referencing an unloaded provider
/// or a deleted subject.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Registers a new session.
    async fn register_session(&self, session: &Session) -> SessionResult<()>;

    /// Gets a session by id.
    async fn get_session(&self, session_id: Uuid) -> SessionResult<Option<Session>>;

    /// Updates a session.
    async fn update_session(&self, session: &Session) -> SessionResult<()>;

    /// Lists the active sessions of a subject.
    async fn list_subject_sessions(&self, subject_id: Uuid) -> SessionResult<Vec<Session>>;

    /// Lists the active sessions bound to a provider.
    async fn list_provider_sessions(&self, provider_id: &str) -> SessionResult<Vec<Session>>;

    /// Destroys one session.
    async fn destroy_session(&self, session_id: Uuid) -> SessionResult<()>;

    /// Destroys every session bound to a provider.
    ///
    /// Returns the number of sessions destroyed.
    async fn destroy_provider_sessions(&self, provider_id: &str) -> SessionResult<u64>;

    /// Destroys every session of a subject.
    ///
    /// Returns the number of sessions destroyed.
    async fn destroy_user_sessions(&self, subject_id: Uuid) -> SessionResult<u64>;
}

/// In-memory session manager.
#[derive(Debug, Default)]
pub struct InMemorySessionManager {
    sessions: DashMap<Uuid, Session>,
}

impl InMemorySessionManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionManager for InMemorySessionManager {
    async fn register_session(&self, session: &Session) -> SessionResult<()> {
        self.sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn get_session(&self, session_id: Uuid) -> SessionResult<Option<Session>> {
        Ok(self.sessions.get(&session_id).map(|s| s.clone()))
    }

    async fn update_session(&self, session: &Session) -> SessionResult<()> {
        self.sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn list_subject_sessions(&self, subject_id: Uuid) -> SessionResult<Vec<Session>> {
        Ok(self
            .sessions
            .iter()
            .filter(|s| s.subject_id == subject_id && s.is_active())
            .map(|s| s.clone())
            .collect())
    }

    async fn list_provider_sessions(&self, provider_id: &str) -> SessionResult<Vec<Session>> {
        Ok(self
            .sessions
            .iter()
            .filter(|s| s.has_provider(provider_id) && s.is_active())
            .map(|s| s.clone())
            .collect())
    }

    async fn destroy_session(&self, session_id: Uuid) -> SessionResult<()> {
        self.sessions.remove(&session_id);
        Ok(())
    }

    async fn destroy_provider_sessions(&self, provider_id: &str) -> SessionResult<u64> {
        let doomed: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|s| s.has_provider(provider_id))
            .map(|s| s.session_id)
            .collect();

        let count = doomed.len() as u64;
        for id in doomed {
            self.sessions.remove(&id);
        }
        Ok(count)
    }

    async fn destroy_user_sessions(&self, subject_id: Uuid) -> SessionResult<u64> {
        let doomed: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|s| s.subject_id == subject_id)
            .map(|s| s.session_id)
            .collect();

        let count = doomed.len() as u64;
        for id in doomed {
            self.sessions.remove(&id);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_and_get_session() {
        let manager = InMemorySessionManager::new();
        let session = Session::new("acme", Uuid::now_v7(), "internal-pwd");

        manager.register_session(&session).await.unwrap();

        let loaded = manager.get_session(session.session_id).await.unwrap();
        assert!(loaded.is_some());
    }

    #[tokio::test]
    async fn destroy_provider_sessions_leaves_others() {
        let manager = InMemorySessionManager::new();
        let subject_id = Uuid::now_v7();

        let bound = Session::new("acme", subject_id, "internal-pwd");
        let other = Session::new("acme", subject_id, "corp-saml");
        manager.register_session(&bound).await.unwrap();
        manager.register_session(&other).await.unwrap();

        let destroyed = manager
            .destroy_provider_sessions("internal-pwd")
            .await
            .unwrap();
        assert_eq!(destroyed, 1);

        assert!(manager
            .get_session(bound.session_id)
            .await
            .unwrap()
            .is_none());
        assert!(manager
            .get_session(other.session_id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn destroy_user_sessions_covers_all_providers() {
        let manager = InMemorySessionManager::new();
        let subject_id = Uuid::now_v7();

        manager
            .register_session(&Session::new("acme", subject_id, "internal-pwd"))
            .await
            .unwrap();
        manager
            .register_session(&Session::new("acme", subject_id, "corp-saml"))
            .await
            .unwrap();
        manager
            .register_session(&Session::new("acme", Uuid::now_v7(), "internal-pwd"))
            .await
            .unwrap();

        let destroyed = manager.destroy_user_sessions(subject_id).await.unwrap();
        assert_eq!(destroyed, 2);
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn merged_sessions_match_every_contributing_provider() {
        let manager = InMemorySessionManager::new();
        let mut session = Session::new("acme", Uuid::now_v7(), "internal-pwd");
        session.add_provider("corp-saml");
        manager.register_session(&session).await.unwrap();

        let destroyed = manager.destroy_provider_sessions("corp-saml").await.unwrap();
        assert_eq!(destroyed, 1);
    }
}
