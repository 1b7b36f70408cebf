//! The extended authentication manager.
//!
//! ## NIST 800-53 Rev5: IA-6 (Authentication Feedback)
//!
//! Realm-targeted dispatch swallows per-provider failures and answers with
//! a single generic error, so callers cannot probe which provider
//! recognized a username. Per-provider outcomes are kept in the internal
//! diagnostic log only.

use std::sync::Arc;

use aac_core::event::{Event, EventType};
use aac_identity::{
    AuthenticationError, AuthorityRegistry, IdentityListing, IdentityProvider,
    ProviderAuthentication,
};
use aac_model::{GrantedAuthority, Principal, Subject, UserDetails};
use aac_session::{Session, SessionManager};
use aac_storage::{SubjectService, UserEntityService};

use crate::events::AuthenticationEventPublisher;
use crate::request::{RequestTarget, WrappedAuthenticationRequest};
use crate::token::UserAuthentication;

fn service_err(err: impl std::fmt::Display) -> AuthenticationError {
    AuthenticationError::service(err.to_string())
}

/// Orchestrates one authentication attempt end to end.
///
/// The manager owns no provider logic of its own: providers verify raw
/// credentials and resolve subjects, storage persists them, the session
/// manager tracks live sessions, and the event publisher gets exactly one
/// event per attempt. A failure at any stage aborts the whole attempt.
pub struct ExtendedAuthenticationManager {
    registry: Arc<AuthorityRegistry>,
    users: Arc<dyn UserEntityService>,
    subjects: Arc<dyn SubjectService>,
    sessions: Arc<dyn SessionManager>,
    events: Arc<dyn AuthenticationEventPublisher>,
}

impl ExtendedAuthenticationManager {
    /// Creates a manager over the given collaborators.
    #[must_use]
    pub fn new(
        registry: Arc<AuthorityRegistry>,
        users: Arc<dyn UserEntityService>,
        subjects: Arc<dyn SubjectService>,
        sessions: Arc<dyn SessionManager>,
        events: Arc<dyn AuthenticationEventPublisher>,
    ) -> Self {
        Self {
            registry,
            users,
            subjects,
            sessions,
            events,
        }
    }

    /// Authenticates a wrapped request, optionally within an existing
    /// session context.
    ///
    /// On success the returned token is fully credential-erased and a
    /// session exists for it. When `context` belongs to the same subject
    /// and realm, the fresh authentication is merged into that session;
    /// otherwise the context session is replaced.
    ///
    /// The raw credential in `request` is erased before this returns,
    /// success or not.
    ///
    /// ## Errors
    ///
    /// Returns the terminal [`AuthenticationError`] of the attempt. One
    /// failure event is published per error, one success event per token.
    pub async fn authenticate(
        &self,
        context: Option<&UserAuthentication>,
        request: &mut WrappedAuthenticationRequest,
    ) -> Result<UserAuthentication, AuthenticationError> {
        let result = self.run_pipeline(context, request).await;
        request.erase_credentials();

        match result {
            Ok(authentication) => {
                self.events.publish_authentication_success(&authentication);
                Ok(authentication)
            }
            Err(error) => {
                self.events.publish_authentication_failure(request, &error);
                Err(error)
            }
        }
    }

    /// Terminates the session behind a token.
    ///
    /// ## Errors
    ///
    /// Returns a service error when the session store fails.
    pub async fn logout(
        &self,
        authentication: &UserAuthentication,
    ) -> Result<(), AuthenticationError> {
        self.sessions
            .destroy_session(authentication.session_id)
            .await
            .map_err(service_err)?;
        Event::builder(EventType::Logout)
            .success()
            .realm(authentication.realm.as_str())
            .subject(authentication.subject_id)
            .build()
            .log();
        Ok(())
    }

    async fn run_pipeline(
        &self,
        context: Option<&UserAuthentication>,
        request: &WrappedAuthenticationRequest,
    ) -> Result<UserAuthentication, AuthenticationError> {
        match &request.target {
            RequestTarget::Provider {
                authority,
                provider_id,
            } => {
                let authority = self.registry.get_authority(*authority)?;
                let provider = authority
                    .get_provider(provider_id)
                    .filter(|p| p.realm() == request.realm)
                    .ok_or_else(|| AuthenticationError::ProviderNotFound(provider_id.clone()))?;

                let token = provider
                    .authentication_provider()
                    .authenticate(&request.request)
                    .await?;
                self.establish(context, request, &provider, token).await
            }
            RequestTarget::Realm => {
                let candidates: Vec<_> = self
                    .registry
                    .providers_for_realm(&request.realm)
                    .into_iter()
                    .filter(|p| p.authentication_provider().supports(&request.request))
                    .collect();
                if candidates.is_empty() {
                    return Err(AuthenticationError::ProviderNotFound(request.realm.clone()));
                }

                for provider in candidates {
                    match provider
                        .authentication_provider()
                        .authenticate(&request.request)
                        .await
                    {
                        Ok(token) => {
                            return self.establish(context, request, &provider, token).await
                        }
                        Err(error) => {
                            tracing::debug!(
                                provider = %provider.provider_id(),
                                realm = %request.realm,
                                code = %error.code(),
                                "candidate provider rejected the request"
                            );
                        }
                    }
                }
                Err(AuthenticationError::BadCredentials)
            }
        }
    }

    /// Turns a fresh provider authentication into a full session token.
    async fn establish(
        &self,
        context: Option<&UserAuthentication>,
        request: &WrappedAuthenticationRequest,
        provider: &Arc<dyn IdentityProvider>,
        token: ProviderAuthentication,
    ) -> Result<UserAuthentication, AuthenticationError> {
        let realm = request.realm.as_str();
        let principal = token.principal.clone();

        let mut subject = match self.resolve_subject(provider, &principal, realm).await? {
            Some(existing) => existing,
            None => {
                let created = self
                    .users
                    .create_user(realm, &principal.username)
                    .await
                    .map_err(service_err)?;
                Event::builder(EventType::SubjectCreated)
                    .success()
                    .realm(realm)
                    .subject(created.subject_id)
                    .provider(provider.provider_id())
                    .build()
                    .log();
                created
            }
        };

        if subject.blocked {
            return Err(AuthenticationError::Locked { until: None });
        }
        if subject.inactive {
            return Err(AuthenticationError::Disabled);
        }
        if subject.expired {
            return Err(AuthenticationError::AccountExpired);
        }

        let identity = provider
            .convert_identity(&principal, subject.subject_id)
            .await?;
        if identity.subject_id != subject.subject_id {
            tracing::error!(
                provider = %provider.provider_id(),
                expected = %subject.subject_id,
                actual = %identity.subject_id,
                "identity bound to the wrong subject"
            );
            return Err(AuthenticationError::service(
                "identity bound to the wrong subject",
            ));
        }
        if identity.account.locked {
            return Err(AuthenticationError::Locked { until: None });
        }

        let was_verified = subject.email_verified;
        subject.sync_profile(
            &principal.username,
            principal.email.as_deref(),
            principal.email_verified,
        );
        self.users.update_user(&subject).await.map_err(service_err)?;
        if !was_verified {
            if let Some(email) = principal.verified_email() {
                self.users
                    .verify_email(realm, subject.subject_id, email)
                    .await
                    .map_err(service_err)?;
            }
        }

        // Exactly one login record per successful attempt.
        self.users
            .update_login(realm, subject.subject_id, request.ip_address.as_deref())
            .await
            .map_err(service_err)?;
        let subject = self
            .users
            .get_user(realm, subject.subject_id)
            .await
            .map_err(service_err)?;

        let mut authorities = self
            .subjects
            .get_authorities(subject.subject_id)
            .await
            .map_err(service_err)?;
        authorities.extend(token.authorities.iter().cloned());
        authorities.insert(GrantedAuthority::User);

        let mut details = UserDetails::new(&subject, authorities.clone());
        details.add_identity(identity);
        self.collect_identities(provider, &subject, &mut details)
            .await;

        let fresh = UserAuthentication::new(&subject, token, authorities, details);

        let mut authentication = match context {
            Some(ctx) if ctx.is_same_session_scope(subject.subject_id, realm) => {
                let merged = ctx.merged_with(fresh);
                match self
                    .sessions
                    .get_session(merged.session_id)
                    .await
                    .map_err(service_err)?
                {
                    Some(mut session) => {
                        session.add_provider(provider.provider_id());
                        session.touch();
                        self.sessions
                            .update_session(&session)
                            .await
                            .map_err(service_err)?;
                    }
                    None => {
                        self.open_session(&merged, provider.provider_id(), request)
                            .await?;
                    }
                }
                merged
            }
            Some(ctx) => {
                // Different subject or realm: the fresh login replaces the
                // context session outright.
                self.sessions
                    .destroy_session(ctx.session_id)
                    .await
                    .map_err(service_err)?;
                self.open_session(&fresh, provider.provider_id(), request)
                    .await?;
                fresh
            }
            None => {
                self.open_session(&fresh, provider.provider_id(), request)
                    .await?;
                fresh
            }
        };

        authentication.erase_credentials();
        Ok(authentication)
    }

    /// Resolves the durable subject for a fresh principal.
    ///
    /// Order: persisted account link, then username, then a verified-email
    /// scan across the other providers of the realm. An unverified email
    /// never participates in resolution.
    async fn resolve_subject(
        &self,
        provider: &Arc<dyn IdentityProvider>,
        principal: &Principal,
        realm: &str,
    ) -> Result<Option<Subject>, AuthenticationError> {
        let resolver = provider.subject_resolver();

        if let Some(subject) = resolver
            .resolve_by_principal_id(&principal.principal_id)
            .await?
        {
            return Ok(Some(subject));
        }
        if let Some(subject) = resolver.resolve_by_username(&principal.username).await? {
            return Ok(Some(subject));
        }

        let Some(email) = principal.verified_email() else {
            return Ok(None);
        };
        for other in self.registry.providers_for_realm(realm) {
            if other.provider_id() == provider.provider_id() {
                continue;
            }
            match other.subject_resolver().resolve_by_email(email).await {
                Ok(Some(subject)) => {
                    Event::builder(EventType::IdentityLinked)
                        .success()
                        .realm(realm)
                        .subject(subject.subject_id)
                        .provider(provider.provider_id())
                        .detail("resolved_via", other.provider_id())
                        .detail("strategy", "verified_email")
                        .build()
                        .log();
                    return Ok(Some(subject));
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(
                        provider = %other.provider_id(),
                        error = %error,
                        "email resolution failed, skipping provider"
                    );
                }
            }
        }
        Ok(None)
    }

    /// Collects identities and attribute sets from the realm's other
    /// providers, best effort.
    async fn collect_identities(
        &self,
        winner: &Arc<dyn IdentityProvider>,
        subject: &Subject,
        details: &mut UserDetails,
    ) {
        for provider in self.registry.providers_for_realm(&subject.realm) {
            if provider.provider_id() != winner.provider_id() {
                match provider.list_identities(subject.subject_id, true).await {
                    Ok(IdentityListing::Unsupported) => {}
                    Ok(IdentityListing::Identities(identities)) => {
                        for identity in identities {
                            details.add_identity(identity);
                        }
                    }
                    Err(error) => {
                        tracing::warn!(
                            provider = %provider.provider_id(),
                            error = %error,
                            "identity listing failed, skipping provider"
                        );
                    }
                }
            }

            match provider.load_attributes(subject.subject_id).await {
                Ok(attributes) => {
                    if !attributes.is_empty() {
                        details.add_attributes(attributes);
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        provider = %provider.provider_id(),
                        error = %error,
                        "attribute loading failed, skipping provider"
                    );
                }
            }
        }
    }

    async fn open_session(
        &self,
        authentication: &UserAuthentication,
        provider_id: &str,
        request: &WrappedAuthenticationRequest,
    ) -> Result<(), AuthenticationError> {
        let mut session = Session::new(
            &authentication.realm,
            authentication.subject_id,
            provider_id,
        );
        session.session_id = authentication.session_id;
        session.ip_address = request.ip_address.clone();
        self.sessions
            .register_session(&session)
            .await
            .map_err(service_err)
    }
}
