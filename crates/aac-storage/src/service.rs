//! Subject and user-entity service contracts.

use std::collections::BTreeSet;

use async_trait::async_trait;
use aac_model::{GrantedAuthority, Subject};
use uuid::Uuid;

use crate::error::StorageResult;

/// Service for user entities, realm-scoped.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait UserEntityService: Send + Sync {
    /// Creates and persists a brand-new subject in a realm.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if the username is taken in the
    /// realm.
    async fn create_user(&self, realm: &str, username: &str) -> StorageResult<Subject>;

    /// Persists an already-constructed subject.
    async fn add_user(&self, subject: &Subject) -> StorageResult<()>;

    /// Finds a subject by id within a realm.
    async fn find_user(&self, realm: &str, subject_id: Uuid) -> StorageResult<Option<Subject>>;

    /// Gets a subject by id within a realm.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the subject does not exist.
    async fn get_user(&self, realm: &str, subject_id: Uuid) -> StorageResult<Subject>;

    /// Finds a subject by username within a realm.
    async fn find_user_by_username(
        &self,
        realm: &str,
        username: &str,
    ) -> StorageResult<Option<Subject>>;

    /// Updates a persisted subject.
    async fn update_user(&self, subject: &Subject) -> StorageResult<()>;

    /// Records a successful login for a subject.
    async fn update_login(
        &self,
        realm: &str,
        subject_id: Uuid,
        ip_address: Option<&str>,
    ) -> StorageResult<()>;

    /// Marks a subject's email as verified.
    async fn verify_email(&self, realm: &str, subject_id: Uuid, email: &str)
        -> StorageResult<()>;

    /// Deletes a subject.
    ///
    /// Cascading cleanup (identities, sessions, approvals) is the caller's
    /// responsibility; this removes only the subject record.
    async fn delete_user(&self, realm: &str, subject_id: Uuid) -> StorageResult<()>;
}

/// Service for subject records and their role grants.
#[async_trait]
pub trait SubjectService: Send + Sync {
    /// Gets a subject by id, across realms.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the subject does not exist.
    async fn get_subject(&self, subject_id: Uuid) -> StorageResult<Subject>;

    /// Updates a subject record.
    async fn update_subject(&self, subject: &Subject) -> StorageResult<()>;

    /// Gets the authorities granted to a subject.
    async fn get_authorities(&self, subject_id: Uuid)
        -> StorageResult<BTreeSet<GrantedAuthority>>;

    /// Grants an authority to a subject.
    async fn add_authority(
        &self,
        subject_id: Uuid,
        authority: GrantedAuthority,
    ) -> StorageResult<()>;
}
