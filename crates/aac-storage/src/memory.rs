//! In-memory user and subject storage.
//!
//! Backs tests and small deployments. Keyed maps use `DashMap` so the
//! service is safe for concurrent access without external locking.

use std::collections::BTreeSet;

use async_trait::async_trait;
use aac_model::{GrantedAuthority, Subject};
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::service::{SubjectService, UserEntityService};

/// In-memory implementation of the user-entity and subject services.
#[derive(Debug, Default)]
pub struct InMemoryUserService {
    subjects: DashMap<Uuid, Subject>,
    authorities: DashMap<Uuid, BTreeSet<GrantedAuthority>>,
}

impl InMemoryUserService {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn get_in_realm(&self, realm: &str, subject_id: Uuid) -> Option<Subject> {
        self.subjects
            .get(&subject_id)
            .filter(|s| s.realm == realm)
            .map(|s| s.clone())
    }
}

#[async_trait]
impl UserEntityService for InMemoryUserService {
    async fn create_user(&self, realm: &str, username: &str) -> StorageResult<Subject> {
        let taken = self
            .subjects
            .iter()
            .any(|s| s.realm == realm && s.username == username);
        if taken {
            return Err(StorageError::duplicate(format!("{realm}/{username}")));
        }

        let subject = Subject::new(realm, username);
        self.subjects.insert(subject.subject_id, subject.clone());
        Ok(subject)
    }

    async fn add_user(&self, subject: &Subject) -> StorageResult<()> {
        if self.subjects.contains_key(&subject.subject_id) {
            return Err(StorageError::duplicate(subject.subject_id.to_string()));
        }
        self.subjects.insert(subject.subject_id, subject.clone());
        Ok(())
    }

    async fn find_user(&self, realm: &str, subject_id: Uuid) -> StorageResult<Option<Subject>> {
        Ok(self.get_in_realm(realm, subject_id))
    }

    async fn get_user(&self, realm: &str, subject_id: Uuid) -> StorageResult<Subject> {
        self.get_in_realm(realm, subject_id)
            .ok_or_else(|| StorageError::not_found(format!("subject {subject_id} in {realm}")))
    }

    async fn find_user_by_username(
        &self,
        realm: &str,
        username: &str,
    ) -> StorageResult<Option<Subject>> {
        Ok(self
            .subjects
            .iter()
            .find(|s| s.realm == realm && s.username == username)
            .map(|s| s.clone()))
    }

    async fn update_user(&self, subject: &Subject) -> StorageResult<()> {
        if !self.subjects.contains_key(&subject.subject_id) {
            return Err(StorageError::not_found(subject.subject_id.to_string()));
        }
        self.subjects.insert(subject.subject_id, subject.clone());
        Ok(())
    }

    async fn update_login(
        &self,
        realm: &str,
        subject_id: Uuid,
        ip_address: Option<&str>,
    ) -> StorageResult<()> {
        let mut entry = self
            .subjects
            .get_mut(&subject_id)
            .filter(|s| s.realm == realm)
            .ok_or_else(|| StorageError::not_found(format!("subject {subject_id} in {realm}")))?;
        entry.record_login(ip_address);
        Ok(())
    }

    async fn verify_email(
        &self,
        realm: &str,
        subject_id: Uuid,
        email: &str,
    ) -> StorageResult<()> {
        let mut entry = self
            .subjects
            .get_mut(&subject_id)
            .filter(|s| s.realm == realm)
            .ok_or_else(|| StorageError::not_found(format!("subject {subject_id} in {realm}")))?;
        entry.email = Some(email.to_string());
        entry.email_verified = true;
        entry.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn delete_user(&self, realm: &str, subject_id: Uuid) -> StorageResult<()> {
        let existed = self
            .subjects
            .remove_if(&subject_id, |_, s| s.realm == realm)
            .is_some();
        if !existed {
            return Err(StorageError::not_found(format!(
                "subject {subject_id} in {realm}"
            )));
        }
        self.authorities.remove(&subject_id);
        Ok(())
    }
}

#[async_trait]
impl SubjectService for InMemoryUserService {
    async fn get_subject(&self, subject_id: Uuid) -> StorageResult<Subject> {
        self.subjects
            .get(&subject_id)
            .map(|s| s.clone())
            .ok_or_else(|| StorageError::not_found(format!("subject {subject_id}")))
    }

    async fn update_subject(&self, subject: &Subject) -> StorageResult<()> {
        if !self.subjects.contains_key(&subject.subject_id) {
            return Err(StorageError::not_found(subject.subject_id.to_string()));
        }
        self.subjects.insert(subject.subject_id, subject.clone());
        Ok(())
    }

    async fn get_authorities(
        &self,
        subject_id: Uuid,
    ) -> StorageResult<BTreeSet<GrantedAuthority>> {
        Ok(self
            .authorities
            .get(&subject_id)
            .map(|a| a.clone())
            .unwrap_or_default())
    }

    async fn add_authority(
        &self,
        subject_id: Uuid,
        authority: GrantedAuthority,
    ) -> StorageResult<()> {
        self.authorities
            .entry(subject_id)
            .or_default()
            .insert(authority);
        Ok(())
    }
}
