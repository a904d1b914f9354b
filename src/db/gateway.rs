//! Storage capabilities consumed by the credential core.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::account::{Account, AccountRepository, NewAccount};
use super::user_token::UserTokenRepository;
use crate::Result;

/// Storage operations the credential validator depends on.
///
/// Implementations must make `record_failed_attempt` atomic with respect to
/// concurrent callers.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Look up an account by its login id.
    async fn find_account_by_login_id(&self, login_id: &str) -> Result<Option<Account>>;

    /// Increment the failure counter and stamp the failure time.
    async fn record_failed_attempt(&self, account_id: i64) -> Result<()>;

    /// Persist the token pair issued on a successful login.
    async fn insert_issued_token(
        &self,
        account_id: i64,
        token: &str,
        refresh_token: &str,
    ) -> Result<()>;
}

/// Account creation and lookup used by registration and the user API.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Whether a login id is already registered.
    async fn login_id_exists(&self, login_id: &str) -> Result<bool>;

    /// Store a new account.
    async fn create_account(&self, new_account: &NewAccount) -> Result<Account>;

    /// Look up an account by ID.
    async fn get_account(&self, id: i64) -> Result<Option<Account>>;

    /// All accounts ordered by ID.
    async fn list_accounts(&self) -> Result<Vec<Account>>;
}

/// SQLite implementation of both storage traits.
#[derive(Clone, Debug)]
pub struct SqliteGateway {
    pool: SqlitePool,
}

impl SqliteGateway {
    /// Create a gateway over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersistenceGateway for SqliteGateway {
    async fn find_account_by_login_id(&self, login_id: &str) -> Result<Option<Account>> {
        AccountRepository::new(&self.pool)
            .get_by_login_id(login_id)
            .await
    }

    async fn record_failed_attempt(&self, account_id: i64) -> Result<()> {
        debug!(account_id, "recording failed login attempt");
        AccountRepository::new(&self.pool)
            .record_failure(account_id, Utc::now())
            .await
    }

    async fn insert_issued_token(
        &self,
        account_id: i64,
        token: &str,
        refresh_token: &str,
    ) -> Result<()> {
        UserTokenRepository::new(&self.pool)
            .create(account_id, token, refresh_token)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AccountDirectory for SqliteGateway {
    async fn login_id_exists(&self, login_id: &str) -> Result<bool> {
        AccountRepository::new(&self.pool)
            .login_id_exists(login_id)
            .await
    }

    async fn create_account(&self, new_account: &NewAccount) -> Result<Account> {
        AccountRepository::new(&self.pool).create(new_account).await
    }

    async fn get_account(&self, id: i64) -> Result<Option<Account>> {
        AccountRepository::new(&self.pool).get_by_id(id).await
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        AccountRepository::new(&self.pool).list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::UserTokenRepository;
    use crate::Database;

    #[tokio::test]
    async fn test_gateway_roundtrip() {
        let db = Database::open_in_memory().await.unwrap();
        let gateway = SqliteGateway::new(db.pool().clone());

        assert!(!gateway.login_id_exists("alice").await.unwrap());
        let account = gateway
            .create_account(&NewAccount::new("alice", "Alice", "digest"))
            .await
            .unwrap();
        assert!(gateway.login_id_exists("alice").await.unwrap());

        let found = gateway
            .find_account_by_login_id("alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, account.id);
        assert_eq!(gateway.get_account(account.id).await.unwrap(), Some(found.clone()));
        assert_eq!(gateway.list_accounts().await.unwrap(), vec![found]);

        gateway.record_failed_attempt(account.id).await.unwrap();
        let after = gateway.get_account(account.id).await.unwrap().unwrap();
        assert_eq!(after.failure_count, 1);
        assert!(after.last_failure_at.is_some());

        gateway
            .insert_issued_token(account.id, "access", "refresh")
            .await
            .unwrap();
        let records = UserTokenRepository::new(db.pool())
            .list_by_user(account.id)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_failures_are_not_lost() {
        let db = Database::open_in_memory().await.unwrap();
        let gateway = SqliteGateway::new(db.pool().clone());
        let account = gateway
            .create_account(&NewAccount::new("bob", "Bob", "digest"))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let gateway = gateway.clone();
            handles.push(tokio::spawn(async move {
                gateway.record_failed_attempt(account.id).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let after = gateway.get_account(account.id).await.unwrap().unwrap();
        assert_eq!(after.failure_count, 10);
    }
}
