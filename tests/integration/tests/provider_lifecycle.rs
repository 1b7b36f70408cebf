//! Provider lifecycle scenarios across the live stack.

use aac_identity::AuthenticationError;
use aac_provider::{ProviderService, RegistrationError};
use aac_session::SessionManager;

use crate::common::TestEnv;

/// Unregistering a live provider removes it from lookups and terminates
/// every session bound to it.
#[tokio::test]
async fn test_unregister_removes_provider_and_sessions() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let provider = env.install_provider("internal-pwd").await?;
    provider.create_account("alice", "hunter2!", None, false)?;

    let auth = env.login("internal-pwd", "alice", "hunter2!").await?;
    assert!(env.registry.find_provider("internal-pwd").is_some());

    let destroyed = env
        .providers
        .unregister_provider("acme", "internal-pwd")
        .await?;

    assert_eq!(destroyed, 1);
    assert!(env.registry.find_provider("internal-pwd").is_none());
    assert!(env
        .sessions
        .list_provider_sessions("internal-pwd")
        .await?
        .is_empty());
    assert!(env.sessions.get_session(auth.session_id).await?.is_none());
    Ok(())
}

/// A provider-targeted request naming a just-unregistered provider fails
/// fast with no session and no success event.
#[tokio::test]
async fn test_login_after_unregister_fails_fast() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let provider = env.install_provider("internal-pwd").await?;
    provider.create_account("alice", "hunter2!", None, false)?;
    env.providers
        .unregister_provider("acme", "internal-pwd")
        .await?;

    let err = env
        .login("internal-pwd", "alice", "hunter2!")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthenticationError::ProviderNotFound(_)));
    assert_eq!(env.events.success_count(), 0);
    assert!(env.sessions.is_empty());
    Ok(())
}

/// Deleting a live provider is rejected and the stored entity is
/// untouched.
#[tokio::test]
async fn test_delete_active_provider_is_rejected() -> anyhow::Result<()> {
    let env = TestEnv::new();
    env.install_provider("internal-pwd").await?;

    let err = env
        .providers
        .delete_provider("acme", "internal-pwd")
        .await
        .unwrap_err();

    assert!(matches!(err, RegistrationError::ActiveDelete));
    assert_eq!(err.to_string(), "active providers can not be deleted");
    let stored = env.store.get_provider("internal-pwd").await?;
    assert!(stored.enabled);
    Ok(())
}

/// The re-register cycle replaces the live provider, dropping provider
/// state such as account stores built at registration time.
#[tokio::test]
async fn test_reregister_builds_a_fresh_provider() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let provider = env.install_provider("internal-pwd").await?;
    provider.create_account("alice", "hunter2!", None, false)?;

    env.providers
        .register_provider("acme", "internal-pwd")
        .await?;

    // The account lived in the replaced instance.
    let err = env
        .login("internal-pwd", "alice", "hunter2!")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthenticationError::BadCredentials));
    Ok(())
}
