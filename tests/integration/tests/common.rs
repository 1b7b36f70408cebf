//! Shared in-memory test environment.

use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use aac_auth::{
    AuthenticationEventPublisher, ExtendedAuthenticationManager, SubjectAdministrator,
    UserAuthentication, WrappedAuthenticationRequest,
};
use aac_core::config::LockoutConfig;
use aac_identity::{
    AuthenticationError, AuthenticationRequest, AuthorityRegistry, IdentityProviderAuthority,
    InternalAuthority, InternalPasswordProvider,
};
use aac_model::{AuthorityKind, ProviderEntity};
use aac_provider::{InMemoryProviderService, ProviderManager, ProviderService};
use aac_session::{InMemorySessionManager, SessionManager};
use aac_storage::{InMemoryUserService, SubjectService, UserEntityService};

/// Realm used by all end-to-end scenarios.
pub const REALM: &str = "acme";

/// Event sink recording every published outcome.
#[derive(Default)]
pub struct RecordingEvents {
    successes: Mutex<Vec<Uuid>>,
    failures: Mutex<Vec<&'static str>>,
}

impl RecordingEvents {
    pub fn success_count(&self) -> usize {
        self.successes.lock().len()
    }

    pub fn failure_codes(&self) -> Vec<&'static str> {
        self.failures.lock().clone()
    }
}

impl AuthenticationEventPublisher for RecordingEvents {
    fn publish_authentication_success(&self, authentication: &UserAuthentication) {
        self.successes.lock().push(authentication.subject_id);
    }

    fn publish_authentication_failure(
        &self,
        _request: &WrappedAuthenticationRequest,
        error: &AuthenticationError,
    ) {
        self.failures.lock().push(error.code());
    }
}

/// Fully wired in-memory deployment.
pub struct TestEnv {
    pub users: Arc<InMemoryUserService>,
    pub sessions: Arc<InMemorySessionManager>,
    pub registry: Arc<AuthorityRegistry>,
    pub authority: Arc<InternalAuthority>,
    pub store: Arc<InMemoryProviderService>,
    pub events: Arc<RecordingEvents>,
    pub auth: ExtendedAuthenticationManager,
    pub providers: ProviderManager,
    pub admin: SubjectAdministrator,
}

impl TestEnv {
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("aac_auth=debug,aac_provider=debug")
            .try_init();

        let users = Arc::new(InMemoryUserService::new());
        let sessions = Arc::new(InMemorySessionManager::new());
        let events = Arc::new(RecordingEvents::default());
        let store = Arc::new(InMemoryProviderService::new());

        let authority = Arc::new(InternalAuthority::new(
            Arc::clone(&users) as Arc<dyn UserEntityService>,
            LockoutConfig {
                max_failures: 3,
                lockout_seconds: 900,
            },
        ));
        let registry = Arc::new(AuthorityRegistry::new());
        registry
            .register_authority(Arc::clone(&authority) as Arc<dyn IdentityProviderAuthority>);

        let auth = ExtendedAuthenticationManager::new(
            Arc::clone(&registry),
            Arc::clone(&users) as Arc<dyn UserEntityService>,
            Arc::clone(&users) as Arc<dyn SubjectService>,
            Arc::clone(&sessions) as Arc<dyn SessionManager>,
            Arc::clone(&events) as Arc<dyn AuthenticationEventPublisher>,
        );
        let providers = ProviderManager::new(
            Arc::clone(&registry),
            Arc::clone(&store) as Arc<dyn ProviderService>,
            Arc::clone(&sessions) as Arc<dyn SessionManager>,
        );
        let admin = SubjectAdministrator::new(
            Arc::clone(&registry),
            Arc::clone(&users) as Arc<dyn UserEntityService>,
            Arc::clone(&sessions) as Arc<dyn SessionManager>,
        );

        Self {
            users,
            sessions,
            registry,
            authority,
            store,
            events,
            auth,
            providers,
            admin,
        }
    }

    /// Adds, registers, and returns a live internal password provider.
    pub async fn install_provider(
        &self,
        provider_id: &str,
    ) -> anyhow::Result<Arc<InternalPasswordProvider>> {
        let entity = ProviderEntity::new(provider_id, AuthorityKind::Internal, REALM, provider_id);
        self.providers.add_provider(REALM, entity).await?;
        self.providers.register_provider(REALM, provider_id).await?;
        self.authority
            .get_internal(provider_id)
            .ok_or_else(|| anyhow::anyhow!("provider {provider_id} not live"))
    }

    /// Builds a provider-targeted username/password request.
    pub fn password_request(
        &self,
        provider_id: &str,
        username: &str,
        password: &str,
    ) -> WrappedAuthenticationRequest {
        WrappedAuthenticationRequest::for_provider(
            REALM,
            AuthorityKind::Internal,
            provider_id,
            AuthenticationRequest::username_password(username, password),
        )
    }

    /// Authenticates without an existing session context.
    pub async fn login(
        &self,
        provider_id: &str,
        username: &str,
        password: &str,
    ) -> Result<UserAuthentication, AuthenticationError> {
        let mut request = self.password_request(provider_id, username, password);
        self.auth.authenticate(None, &mut request).await
    }

    /// Authenticates within an existing session context.
    pub async fn login_with_context(
        &self,
        context: &UserAuthentication,
        provider_id: &str,
        username: &str,
        password: &str,
    ) -> Result<UserAuthentication, AuthenticationError> {
        let mut request = self.password_request(provider_id, username, password);
        self.auth.authenticate(Some(context), &mut request).await
    }
}
