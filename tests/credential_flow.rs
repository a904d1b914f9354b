//! Credential validation flow tests.
//!
//! Drives the validator end to end against an in-memory gateway and checks
//! the observable behaviour for each login outcome.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use common::{account_with_password, fast_hasher, validator, CountingHasher, InMemoryGateway};
use legend_auth::{
    Credential, CredentialValidator, ErrorCode, LockoutPolicy, RequestContext, TokenIssuer,
    TokenKind,
};

const PASSWORD: &str = "Password123";

struct Fixture {
    gateway: Arc<InMemoryGateway>,
    hasher: Arc<CountingHasher<legend_auth::ScryptHasher>>,
    validator: CredentialValidator,
}

fn fixture(last_failure_minutes_ago: Option<i64>) -> Fixture {
    let hasher = Arc::new(CountingHasher::new(fast_hasher()));
    let last_failure =
        last_failure_minutes_ago.map(|m| Utc::now() - chrono::Duration::minutes(m));
    let account = account_with_password(1, "player1", PASSWORD, &fast_hasher(), last_failure);
    let gateway = Arc::new(InMemoryGateway::with_account(account));
    let validator = validator(gateway.clone(), hasher.clone());
    Fixture {
        gateway,
        hasher,
        validator,
    }
}

#[tokio::test]
async fn test_unknown_login_id_gets_bad_request_and_no_token() {
    let f = fixture(None);

    let err = f
        .validator
        .authenticate(&RequestContext::new(), &Credential::new("nobody", PASSWORD))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::E0001);
    assert!(f.gateway.inserted().is_empty());
    assert_eq!(f.hasher.calls(), 0);
}

#[tokio::test]
async fn test_correct_password_issues_token_once() {
    let f = fixture(None);

    let tokens = f
        .validator
        .authenticate(&RequestContext::new(), &Credential::new("player1", PASSWORD))
        .await
        .unwrap();

    assert!(!tokens.access_token.is_empty());
    let inserted = f.gateway.inserted();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].account_id, 1);
    assert_eq!(inserted[0].token, tokens.access_token);
    assert_eq!(inserted[0].refresh_token, tokens.refresh_token);
    assert!(f.gateway.failures_recorded().is_empty());
}

#[tokio::test]
async fn test_wrong_password_records_failure() {
    let f = fixture(None);

    let err = f
        .validator
        .authenticate(&RequestContext::new(), &Credential::new("player1", "Password124"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::E0001);
    assert_eq!(f.gateway.failures_recorded(), vec![1]);
    assert!(f.gateway.inserted().is_empty());

    let stored = f.gateway.account(1).unwrap();
    assert_eq!(stored.failure_count, 1);
    assert!(stored.last_failure_at.is_some());
}

#[tokio::test]
async fn test_wrong_password_then_locked() {
    let f = fixture(None);
    let ctx = RequestContext::new();

    f.validator
        .authenticate(&ctx, &Credential::new("player1", "Password124"))
        .await
        .unwrap_err();
    let calls_after_failure = f.hasher.calls();

    // Even the right password is refused inside the window.
    let err = f
        .validator
        .authenticate(&ctx, &Credential::new("player1", PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::E1001);
    assert_eq!(f.hasher.calls(), calls_after_failure);
}

#[tokio::test]
async fn test_recent_failure_locks_without_hashing() {
    let f = fixture(Some(1));

    let err = f
        .validator
        .authenticate(&RequestContext::new(), &Credential::new("player1", PASSWORD))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::E1001);
    assert_eq!(f.hasher.calls(), 0);
    assert!(f.gateway.inserted().is_empty());
}

#[tokio::test]
async fn test_old_failure_no_longer_locks() {
    let f = fixture(Some(11));

    let tokens = f
        .validator
        .authenticate(&RequestContext::new(), &Credential::new("player1", PASSWORD))
        .await
        .unwrap();
    assert!(!tokens.access_token.is_empty());
}

#[tokio::test]
async fn test_weak_password_never_reaches_storage() {
    let f = fixture(None);

    for weak in ["weak", "PASSWORD123", "password123", "PasswordABC"] {
        let err = f
            .validator
            .authenticate(&RequestContext::new(), &Credential::new("player1", weak))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::E0001);
    }
    assert_eq!(f.gateway.lookups(), 0);
    assert_eq!(f.hasher.calls(), 0);
}

#[tokio::test]
async fn test_lookup_error_is_indistinguishable_from_unknown_id() {
    let f = fixture(None);
    f.gateway.set_fail_lookup(true);

    let err = f
        .validator
        .authenticate(&RequestContext::new(), &Credential::new("player1", PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::E0001);
}

#[tokio::test]
async fn test_insert_failure_withholds_token() {
    let f = fixture(None);
    f.gateway.set_fail_insert(true);

    let err = f
        .validator
        .authenticate(&RequestContext::new(), &Credential::new("player1", PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::E0001);
    assert!(f.gateway.inserted().is_empty());
}

#[tokio::test]
async fn test_two_step_login_updates_snapshot() {
    let f = fixture(None);
    let ctx = RequestContext::new();
    let credential = Credential::new("player1", "Password999");

    let mut snapshot = f.validator.validate_login(&ctx, &credential).await.unwrap();
    assert_eq!(snapshot.failure_count, 0);

    let err = f
        .validator
        .login(&ctx, &credential, &mut snapshot)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::E0001);
    assert_eq!(snapshot.failure_count, 1);
}

#[tokio::test]
async fn test_issued_token_lifetimes() {
    let issuer = Arc::new(
        TokenIssuer::new(common::TEST_SECRET, "issuer", "audience")
            .with_lifetimes(Duration::from_secs(120), Duration::from_secs(7200)),
    );
    let hasher = Arc::new(CountingHasher::new(fast_hasher()));
    let account = account_with_password(5, "player5", PASSWORD, &fast_hasher(), None);
    let gateway = Arc::new(InMemoryGateway::with_account(account));
    let validator = CredentialValidator::new(gateway, hasher, issuer.clone(), LockoutPolicy::default());

    let tokens = validator
        .authenticate(&RequestContext::new(), &Credential::new("player5", PASSWORD))
        .await
        .unwrap();

    let access = issuer.verify(&tokens.access_token, TokenKind::Access).unwrap();
    assert_eq!(access.exp - access.iat, 120);
    assert_eq!(access.jti, "5");
    assert_eq!(access.sub, "5");

    let refresh = issuer.verify(&tokens.refresh_token, TokenKind::Refresh).unwrap();
    assert_eq!(refresh.exp - refresh.iat, 7200);
}

#[tokio::test]
async fn test_concurrent_logins_share_one_validator() {
    let f = fixture(None);
    let validator = Arc::new(f.validator);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let validator = validator.clone();
        handles.push(tokio::spawn(async move {
            validator
                .authenticate(&RequestContext::new(), &Credential::new("player1", PASSWORD))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(f.gateway.inserted().len(), 8);
}
