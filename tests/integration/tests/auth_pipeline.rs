//! End-to-end authentication pipeline scenarios.

use aac_identity::{AuthenticationError, IdentityProvider};
use aac_model::GrantedAuthority;
use aac_session::SessionManager;
use aac_storage::{SubjectService, UserEntityService};

use crate::common::{TestEnv, REALM};

/// Correct credentials for an existing username produce a session bound to
/// the existing subject, one login record, and one success event.
#[tokio::test]
async fn test_login_binds_existing_subject() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let provider = env.install_provider("internal-pwd").await?;
    provider.create_account("alice", "hunter2!", None, false)?;
    let existing = env.users.create_user("acme", "alice").await?;

    let auth = env.login("internal-pwd", "alice", "hunter2!").await?;

    assert_eq!(auth.subject_id, existing.subject_id);
    let subject = env.users.get_user("acme", auth.subject_id).await?;
    assert_eq!(subject.login_count, 1);
    assert_eq!(env.events.success_count(), 1);
    assert!(env.events.failure_codes().is_empty());

    let session = env
        .sessions
        .get_session(auth.session_id)
        .await?
        .expect("session registered");
    assert!(session.has_provider("internal-pwd"));
    Ok(())
}

/// Every successful authentication grants at least the base user authority.
#[tokio::test]
async fn test_user_authority_is_always_granted() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let provider = env.install_provider("internal-pwd").await?;
    provider.create_account("bob", "s3cret!", None, false)?;

    let auth = env.login("internal-pwd", "bob", "s3cret!").await?;
    assert!(auth.has_authority(&GrantedAuthority::User));
    Ok(())
}

/// An unverified principal email never links to another provider's subject.
#[tokio::test]
async fn test_unverified_email_never_links() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let staff = env.install_provider("staff-pwd").await?;
    let partner = env.install_provider("partner-pwd").await?;

    staff.create_account("carol", "hunter2!", Some("carol@example.com"), true)?;
    partner.create_account("carol-ext", "s3cret!", Some("carol@example.com"), false)?;

    let original = env.login("staff-pwd", "carol", "hunter2!").await?;
    let other = env.login("partner-pwd", "carol-ext", "s3cret!").await?;

    assert_ne!(other.subject_id, original.subject_id);
    Ok(())
}

/// A verified principal email links the login to the existing subject.
#[tokio::test]
async fn test_verified_email_links_across_providers() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let staff = env.install_provider("staff-pwd").await?;
    let partner = env.install_provider("partner-pwd").await?;

    staff.create_account("dave", "hunter2!", Some("dave@example.com"), true)?;
    partner.create_account("dave-ext", "s3cret!", Some("dave@example.com"), true)?;

    let original = env.login("staff-pwd", "dave", "hunter2!").await?;
    let linked = env.login("partner-pwd", "dave-ext", "s3cret!").await?;

    assert_eq!(linked.subject_id, original.subject_id);
    assert_eq!(linked.details.identities.len(), 2);
    Ok(())
}

/// Merge law: a second login for the same subject and realm unions the
/// authorities into the same session; a different subject replaces it.
#[tokio::test]
async fn test_session_merge_law() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let staff = env.install_provider("staff-pwd").await?;
    let partner = env.install_provider("partner-pwd").await?;
    staff.create_account("erin", "hunter2!", None, false)?;
    partner.create_account("erin", "0ther-pw!", None, false)?;
    partner.create_account("frank", "fr4nk-pw!", None, false)?;

    let ctx = env.login("staff-pwd", "erin", "hunter2!").await?;
    env.users
        .add_authority(ctx.subject_id, GrantedAuthority::realm_role("acme", "dev"))
        .await?;

    let merged = env
        .login_with_context(&ctx, "partner-pwd", "erin", "0ther-pw!")
        .await?;
    assert_eq!(merged.session_id, ctx.session_id);
    assert_eq!(merged.tokens().len(), 2);
    assert!(merged.has_authority(&GrantedAuthority::User));
    assert!(merged.has_authority(&GrantedAuthority::realm_role("acme", "dev")));

    let replaced = env
        .login_with_context(&merged, "partner-pwd", "frank", "fr4nk-pw!")
        .await?;
    assert_ne!(replaced.session_id, merged.session_id);
    assert_eq!(replaced.tokens().len(), 1);
    assert!(!replaced.has_authority(&GrantedAuthority::realm_role("acme", "dev")));
    assert!(env.sessions.get_session(merged.session_id).await?.is_none());
    Ok(())
}

/// No recoverable credential material survives a completed authentication:
/// not in the request wrapper, the provider tokens, or the identities.
#[tokio::test]
async fn test_credential_erasure_round_trip() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let provider = env.install_provider("internal-pwd").await?;
    provider.create_account("grace", "hunter2!", None, false)?;

    let mut request = env.password_request("internal-pwd", "grace", "hunter2!");
    let auth = env.auth.authenticate(None, &mut request).await?;

    assert!(request.is_erased());
    assert!(auth.is_fully_erased());
    assert!(auth.details.identities.iter().all(|i| !i.has_credentials()));
    Ok(())
}

/// Logging in twice through the same provider keeps a single identity
/// record per (realm, authority, provider) key.
#[tokio::test]
async fn test_identity_conversion_is_idempotent() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let provider = env.install_provider("internal-pwd").await?;
    provider.create_account("heidi", "hunter2!", None, false)?;

    let first = env.login("internal-pwd", "heidi", "hunter2!").await?;
    let second = env.login("internal-pwd", "heidi", "hunter2!").await?;

    assert_eq!(first.subject_id, second.subject_id);
    let listing = provider
        .list_identities(second.subject_id, false)
        .await?
        .into_identities();
    assert_eq!(listing.len(), 1);
    Ok(())
}

/// Failed attempts publish a failure event and leave no session behind.
#[tokio::test]
async fn test_failed_login_leaves_no_trace() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let provider = env.install_provider("internal-pwd").await?;
    provider.create_account("ivan", "hunter2!", None, false)?;

    let err = env
        .login("internal-pwd", "ivan", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthenticationError::BadCredentials));
    assert_eq!(env.events.failure_codes(), vec!["bad_credentials"]);
    assert_eq!(env.events.success_count(), 0);
    assert!(env.sessions.is_empty());
    Ok(())
}

/// Administrative subject deletion removes the subject record, its
/// provider links, and every live session in one cascade.
#[tokio::test]
async fn test_subject_deletion_cascades() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let provider = env.install_provider("internal-pwd").await?;
    provider.create_account("kim", "hunter2!", None, false)?;

    let auth = env.login("internal-pwd", "kim", "hunter2!").await?;
    let destroyed = env.admin.delete_subject(REALM, auth.subject_id).await?;

    assert_eq!(destroyed, 1);
    assert!(env.users.get_subject(auth.subject_id).await.is_err());
    assert!(env
        .sessions
        .list_subject_sessions(auth.subject_id)
        .await?
        .is_empty());

    // The provider account survives unlinked, so the next login
    // originates a brand-new subject.
    let fresh = env.login("internal-pwd", "kim", "hunter2!").await?;
    assert_ne!(fresh.subject_id, auth.subject_id);
    Ok(())
}

/// Repeated failures trip the lockout and are reported distinctly from a
/// plain credential failure.
#[tokio::test]
async fn test_lockout_is_distinct_from_bad_credentials() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let provider = env.install_provider("internal-pwd").await?;
    provider.create_account("judy", "hunter2!", None, false)?;

    for _ in 0..3 {
        let _ = env.login("internal-pwd", "judy", "wrong").await;
    }
    let err = env
        .login("internal-pwd", "judy", "hunter2!")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthenticationError::Locked { until: Some(_) }));
    Ok(())
}
