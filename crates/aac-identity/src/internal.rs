//! Internal password backend.
//!
//! The reference implementation of the full identity provider capability
//! set: an account store with Argon2id password verification, failed
//! attempt lockout, subject resolution against the user-entity service,
//! and persistent account-to-subject linking.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use aac_core::config::LockoutConfig;
use aac_model::{
    AuthorityKind, GrantedAuthority, Principal, ProviderEntity, Subject, UserAccount,
    UserIdentity,
};
use aac_storage::UserEntityService;

use crate::error::{AuthenticationError, IdentityError, IdentityResult};
use crate::password::{PasswordHasherService, PasswordPolicy};
use crate::provider::{
    ExtendedAuthenticationProvider, IdentityListing, IdentityProvider, IdentityProviderAuthority,
    SubjectResolver,
};
use crate::request::AuthenticationRequest;
use crate::token::ProviderAuthentication;

/// One account in the internal store.
#[derive(Debug, Clone)]
struct InternalAccount {
    account_id: String,
    username: String,
    email: Option<String>,
    email_verified: bool,
    password_hash: String,
    subject_id: Option<Uuid>,
    locked: bool,
    failed_attempts: u32,
    locked_until: Option<DateTime<Utc>>,
}

impl InternalAccount {
    fn lockout_active(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.locked_until.filter(|until| *until > now)
    }
}

/// Identity provider backed by the internal password store.
pub struct InternalPasswordProvider {
    provider_id: String,
    realm: String,
    name: String,
    accounts: DashMap<String, InternalAccount>,
    users: Arc<dyn UserEntityService>,
    hasher: PasswordHasherService,
    lockout: LockoutConfig,
}

impl InternalPasswordProvider {
    /// Creates a provider with an empty account store.
    #[must_use]
    pub fn new(
        provider_id: impl Into<String>,
        realm: impl Into<String>,
        name: impl Into<String>,
        users: Arc<dyn UserEntityService>,
        lockout: LockoutConfig,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            realm: realm.into(),
            name: name.into(),
            accounts: DashMap::new(),
            users,
            hasher: PasswordHasherService::with_defaults(),
            lockout,
        }
    }

    /// Replaces the hashing policy, usually with one read from the
    /// provider configuration map.
    #[must_use]
    pub fn with_hashing_policy(mut self, policy: PasswordPolicy) -> Self {
        self.hasher = PasswordHasherService::new(policy);
        self
    }

    /// Creates an account, hashing the password.
    ///
    /// Returns the new account id.
    ///
    /// ## Errors
    ///
    /// Returns `IdentityError::Configuration` if the username is already
    /// taken in this provider, or if hashing fails.
    pub fn create_account(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
        email_verified: bool,
    ) -> IdentityResult<String> {
        if self.find_by_username(username).is_some() {
            return Err(IdentityError::Configuration(format!(
                "username already registered: {username}"
            )));
        }

        let account_id = Uuid::now_v7().to_string();
        let account = InternalAccount {
            account_id: account_id.clone(),
            username: username.to_string(),
            email: email.map(ToOwned::to_owned),
            email_verified,
            password_hash: self.hasher.hash(password)?,
            subject_id: None,
            locked: false,
            failed_attempts: 0,
            locked_until: None,
        };
        self.accounts.insert(account_id.clone(), account);
        Ok(account_id)
    }

    /// Administratively locks or unlocks an account.
    ///
    /// ## Errors
    ///
    /// Returns `IdentityError::IdentityNotFound` if no account matches the
    /// username.
    pub fn set_account_locked(&self, username: &str, locked: bool) -> IdentityResult<()> {
        let account_id = self
            .find_by_username(username)
            .map(|a| a.account_id)
            .ok_or_else(|| IdentityError::IdentityNotFound(username.to_string()))?;

        if let Some(mut account) = self.accounts.get_mut(&account_id) {
            account.locked = locked;
            if !locked {
                account.failed_attempts = 0;
                account.locked_until = None;
            }
        }
        Ok(())
    }

    fn find_by_username(&self, username: &str) -> Option<InternalAccount> {
        self.accounts
            .iter()
            .find(|a| a.username == username)
            .map(|a| a.clone())
    }

    fn record_failure(&self, account_id: &str) {
        if let Some(mut account) = self.accounts.get_mut(account_id) {
            account.failed_attempts += 1;
            if account.failed_attempts >= self.lockout.max_failures {
                account.locked_until =
                    Some(Utc::now() + Duration::seconds(self.lockout.lockout_seconds));
                account.failed_attempts = 0;
                tracing::warn!(
                    provider = %self.provider_id,
                    username = %account.username,
                    "account temporarily locked after repeated failures"
                );
            }
        }
    }

    fn record_success(&self, account_id: &str) {
        if let Some(mut account) = self.accounts.get_mut(account_id) {
            account.failed_attempts = 0;
            account.locked_until = None;
        }
    }

    fn identity_for(&self, account: &InternalAccount, subject_id: Uuid) -> UserIdentity {
        let mut user_account = UserAccount::new(&account.account_id, &account.username)
            .with_locked(account.locked);
        if let Some(email) = &account.email {
            user_account = user_account.with_email(email, account.email_verified);
        }

        UserIdentity::new(
            AuthorityKind::Internal,
            &self.provider_id,
            &self.realm,
            subject_id,
            user_account,
        )
        .with_credentials(&account.password_hash)
    }
}

#[async_trait]
impl ExtendedAuthenticationProvider for InternalPasswordProvider {
    fn supports(&self, request: &AuthenticationRequest) -> bool {
        matches!(request, AuthenticationRequest::UsernamePassword { .. })
    }

    async fn authenticate(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<ProviderAuthentication, AuthenticationError> {
        let AuthenticationRequest::UsernamePassword { username, password } = request else {
            return Err(AuthenticationError::BadCredentials);
        };
        let password = password
            .secret()
            .ok_or(AuthenticationError::BadCredentials)?;

        let account = self
            .find_by_username(username)
            .ok_or(AuthenticationError::BadCredentials)?;

        if account.locked {
            return Err(AuthenticationError::Locked { until: None });
        }
        if let Some(until) = account.lockout_active(Utc::now()) {
            return Err(AuthenticationError::Locked { until: Some(until) });
        }

        let verified = self
            .hasher
            .verify(password, &account.password_hash)
            .map_err(|e| AuthenticationError::service(e.to_string()))?;
        if !verified {
            self.record_failure(&account.account_id);
            return Err(AuthenticationError::BadCredentials);
        }
        self.record_success(&account.account_id);

        let mut principal = Principal::new(&account.account_id, &account.username);
        if let Some(email) = &account.email {
            principal = principal.with_email(email, account.email_verified);
        }

        let mut authorities = std::collections::BTreeSet::new();
        authorities.insert(GrantedAuthority::User);

        Ok(ProviderAuthentication::new(
            AuthorityKind::Internal,
            &self.provider_id,
            &self.realm,
            principal,
            authorities,
        ))
    }
}

#[async_trait]
impl SubjectResolver for InternalPasswordProvider {
    async fn resolve_by_principal_id(
        &self,
        principal_id: &str,
    ) -> IdentityResult<Option<Subject>> {
        let Some(account) = self.accounts.get(principal_id).map(|a| a.clone()) else {
            return Ok(None);
        };
        let Some(subject_id) = account.subject_id else {
            return Ok(None);
        };
        Ok(self.users.find_user(&self.realm, subject_id).await?)
    }

    async fn resolve_by_username(&self, username: &str) -> IdentityResult<Option<Subject>> {
        Ok(self.users.find_user_by_username(&self.realm, username).await?)
    }

    async fn resolve_by_email(&self, email: &str) -> IdentityResult<Option<Subject>> {
        // Only verified account emails participate in email linking.
        let linked = self
            .accounts
            .iter()
            .find(|a| a.email_verified && a.email.as_deref() == Some(email))
            .and_then(|a| a.subject_id);

        match linked {
            Some(subject_id) => Ok(self.users.find_user(&self.realm, subject_id).await?),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl IdentityProvider for InternalPasswordProvider {
    fn authority(&self) -> AuthorityKind {
        AuthorityKind::Internal
    }

    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    fn realm(&self) -> &str {
        &self.realm
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn authentication_provider(&self) -> &dyn ExtendedAuthenticationProvider {
        self
    }

    fn subject_resolver(&self) -> &dyn SubjectResolver {
        self
    }

    async fn convert_identity(
        &self,
        principal: &Principal,
        subject_id: Uuid,
    ) -> IdentityResult<UserIdentity> {
        let mut account = self
            .accounts
            .get_mut(&principal.principal_id)
            .ok_or_else(|| IdentityError::IdentityNotFound(principal.principal_id.clone()))?;

        // Idempotent link: a second conversion updates the same binding.
        account.subject_id = Some(subject_id);
        let snapshot = account.clone();
        drop(account);

        Ok(self.identity_for(&snapshot, subject_id))
    }

    async fn list_identities(
        &self,
        subject_id: Uuid,
        _fetch_attributes: bool,
    ) -> IdentityResult<IdentityListing> {
        let identities = self
            .accounts
            .iter()
            .filter(|a| a.subject_id == Some(subject_id))
            .map(|a| {
                let mut identity = self.identity_for(a.value(), subject_id);
                identity.erase_credentials();
                identity
            })
            .collect();
        Ok(IdentityListing::Identities(identities))
    }

    async fn load_attributes(
        &self,
        _subject_id: Uuid,
    ) -> IdentityResult<HashMap<String, serde_json::Value>> {
        // The internal store has no secondary attribute sources.
        Ok(HashMap::new())
    }

    async fn unlink_identities(&self, subject_id: Uuid) -> IdentityResult<u64> {
        let mut unlinked = 0;
        for mut account in self.accounts.iter_mut() {
            if account.subject_id == Some(subject_id) {
                account.subject_id = None;
                unlinked += 1;
            }
        }
        Ok(unlinked)
    }
}

/// Authority owning the internal password providers.
pub struct InternalAuthority {
    users: Arc<dyn UserEntityService>,
    lockout: LockoutConfig,
    providers: DashMap<String, Arc<InternalPasswordProvider>>,
}

impl InternalAuthority {
    /// Creates an authority building providers against the given user
    /// service with the given default lockout policy.
    #[must_use]
    pub fn new(users: Arc<dyn UserEntityService>, lockout: LockoutConfig) -> Self {
        Self {
            users,
            lockout,
            providers: DashMap::new(),
        }
    }

    /// Publishes an already-built provider.
    pub fn register_built(&self, provider: Arc<InternalPasswordProvider>) {
        self.providers
            .insert(provider.provider_id().to_string(), provider);
    }

    /// Gets a provider with its concrete type, for account administration.
    #[must_use]
    pub fn get_internal(&self, provider_id: &str) -> Option<Arc<InternalPasswordProvider>> {
        self.providers.get(provider_id).map(|p| Arc::clone(&p))
    }

    fn lockout_from(&self, entity: &ProviderEntity) -> IdentityResult<LockoutConfig> {
        let mut lockout = self.lockout.clone();
        if let Some(max) = entity
            .configuration
            .get("max_failures")
            .and_then(|v| v.as_u64())
        {
            lockout.max_failures = u32::try_from(max).map_err(|_| {
                IdentityError::Configuration(format!(
                    "max_failures out of range for {}: {max}",
                    entity.provider_id
                ))
            })?;
        }
        if let Some(seconds) = entity
            .configuration
            .get("lockout_seconds")
            .and_then(|v| v.as_i64())
        {
            lockout.lockout_seconds = seconds;
        }
        Ok(lockout)
    }
}

#[async_trait]
impl IdentityProviderAuthority for InternalAuthority {
    fn kind(&self) -> AuthorityKind {
        AuthorityKind::Internal
    }

    fn get_provider(&self, provider_id: &str) -> Option<Arc<dyn IdentityProvider>> {
        self.providers
            .get(provider_id)
            .map(|p| Arc::clone(&p) as Arc<dyn IdentityProvider>)
    }

    fn providers_for_realm(&self, realm: &str) -> Vec<Arc<dyn IdentityProvider>> {
        self.providers
            .iter()
            .filter(|p| p.realm() == realm)
            .map(|p| Arc::clone(&p) as Arc<dyn IdentityProvider>)
            .collect()
    }

    async fn register_provider(
        &self,
        entity: &ProviderEntity,
    ) -> IdentityResult<Arc<dyn IdentityProvider>> {
        if entity.authority != AuthorityKind::Internal {
            return Err(IdentityError::Configuration(format!(
                "entity {} targets authority {}",
                entity.provider_id, entity.authority
            )));
        }

        // Build the full provider first, publish second, so a concurrent
        // lookup never observes a half-constructed provider.
        let provider = Arc::new(
            InternalPasswordProvider::new(
                &entity.provider_id,
                &entity.realm,
                &entity.name,
                Arc::clone(&self.users),
                self.lockout_from(entity)?,
            )
            .with_hashing_policy(PasswordPolicy::from_config(&entity.configuration)),
        );
        self.providers
            .insert(entity.provider_id.clone(), Arc::clone(&provider));

        tracing::info!(
            provider = %entity.provider_id,
            realm = %entity.realm,
            "registered internal password provider"
        );
        Ok(provider as Arc<dyn IdentityProvider>)
    }

    fn unregister_provider(&self, provider_id: &str) -> bool {
        let removed = self.providers.remove(provider_id).is_some();
        if removed {
            tracing::info!(provider = %provider_id, "unregistered internal password provider");
        }
        removed
    }
}
