//! Shared helpers for integration tests.
//!
//! Provides an in-memory persistence gateway that counts calls, a hasher that
//! counts digests, and a fast scrypt configuration.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use legend_auth::{
    Account, AuthError, CredentialValidator, LockoutPolicy, PasswordHasher, PersistenceGateway,
    Result, ScryptHasher, TokenIssuer,
};

/// Signing secret used across tests.
pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";

/// scrypt with a tiny cost so tests stay fast.
pub fn fast_hasher() -> ScryptHasher {
    ScryptHasher::with_cost("legend_score_salt_test", 4, 8, 1).expect("valid scrypt params")
}

/// Token issuer with default lifetimes.
pub fn test_issuer() -> TokenIssuer {
    TokenIssuer::new(TEST_SECRET, "issuer", "audience")
}

/// Build an account snapshot whose digest comes from `hasher`.
pub fn account_with_password(
    id: i64,
    login_id: &str,
    password: &str,
    hasher: &dyn PasswordHasher,
    last_failure_at: Option<DateTime<Utc>>,
) -> Account {
    let now = Utc::now();
    Account {
        id,
        login_id: login_id.to_string(),
        name: login_id.to_string(),
        password: hasher.digest(password).expect("digest"),
        must_change_password: false,
        failure_count: 0,
        last_failure_at,
        created_at: now,
        updated_at: now,
    }
}

/// A token insert observed by [`InMemoryGateway`].
#[derive(Debug, Clone)]
pub struct InsertedToken {
    pub account_id: i64,
    pub token: String,
    pub refresh_token: String,
}

/// In-memory gateway that records every call.
#[derive(Default)]
pub struct InMemoryGateway {
    accounts: Mutex<Vec<Account>>,
    inserted: Mutex<Vec<InsertedToken>>,
    lookups: AtomicUsize,
    failures_recorded: Mutex<Vec<i64>>,
    fail_lookup: AtomicBool,
    fail_insert: AtomicBool,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(account: Account) -> Self {
        let gateway = Self::default();
        gateway.add_account(account);
        gateway
    }

    pub fn add_account(&self, account: Account) {
        self.accounts.lock().unwrap().push(account);
    }

    pub fn account(&self, id: i64) -> Option<Account> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    pub fn set_fail_lookup(&self, fail: bool) {
        self.fail_lookup.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_insert(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn failures_recorded(&self) -> Vec<i64> {
        self.failures_recorded.lock().unwrap().clone()
    }

    pub fn inserted(&self) -> Vec<InsertedToken> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn find_account_by_login_id(&self, login_id: &str) -> Result<Option<Account>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(AuthError::Database("lookup failed".to_string()));
        }
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.login_id == login_id)
            .cloned())
    }

    async fn record_failed_attempt(&self, account_id: i64) -> Result<()> {
        self.failures_recorded.lock().unwrap().push(account_id);
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .iter_mut()
            .find(|a| a.id == account_id)
            .ok_or_else(|| AuthError::Database(format!("account {account_id} not found")))?;
        account.failure_count += 1;
        account.last_failure_at = Some(Utc::now());
        Ok(())
    }

    async fn insert_issued_token(
        &self,
        account_id: i64,
        token: &str,
        refresh_token: &str,
    ) -> Result<()> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(AuthError::Database("insert failed".to_string()));
        }
        self.inserted.lock().unwrap().push(InsertedToken {
            account_id,
            token: token.to_string(),
            refresh_token: refresh_token.to_string(),
        });
        Ok(())
    }
}

/// Wraps a hasher and counts `digest` calls.
pub struct CountingHasher<H> {
    inner: H,
    calls: AtomicUsize,
}

impl<H: PasswordHasher> CountingHasher<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<H: PasswordHasher> PasswordHasher for CountingHasher<H> {
    fn digest(&self, plain: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.digest(plain)
    }
}

/// Validator over the given gateway and hasher with the default lockout.
pub fn validator(
    gateway: Arc<InMemoryGateway>,
    hasher: Arc<CountingHasher<ScryptHasher>>,
) -> CredentialValidator {
    CredentialValidator::new(
        gateway,
        hasher,
        Arc::new(test_issuer()),
        LockoutPolicy::default(),
    )
}
