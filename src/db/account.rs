//! Account model and repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{AuthError, Result};

/// A stored user account.
#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Account {
    /// Account ID.
    pub id: i64,
    /// Unique login id.
    pub login_id: String,
    /// Display name.
    pub name: String,
    /// Base64 scrypt digest of the password.
    pub password: String,
    /// Whether the user must change their password on next login.
    pub must_change_password: bool,
    /// Number of failed login attempts.
    pub failure_count: i64,
    /// Time of the most recent failed attempt.
    pub last_failure_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("login_id", &self.login_id)
            .field("name", &self.name)
            .field("must_change_password", &self.must_change_password)
            .field("failure_count", &self.failure_count)
            .field("last_failure_at", &self.last_failure_at)
            .finish_non_exhaustive()
    }
}

/// Data required to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Unique login id.
    pub login_id: String,
    /// Display name.
    pub name: String,
    /// Password digest (already hashed).
    pub password: String,
    /// Force a password change on next login.
    pub must_change_password: bool,
}

impl NewAccount {
    /// Create a new account that must change its password on first login.
    pub fn new(
        login_id: impl Into<String>,
        name: impl Into<String>,
        password_digest: impl Into<String>,
    ) -> Self {
        Self {
            login_id: login_id.into(),
            name: name.into(),
            password: password_digest.into(),
            must_change_password: true,
        }
    }
}

const ACCOUNT_COLUMNS: &str = "id, login_id, name, password, must_change_password, failure_count,
                               last_failure_at, created_at, updated_at";

/// Repository for account operations.
pub struct AccountRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new AccountRepository with the given pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new account and return it with its assigned ID.
    pub async fn create(&self, new_account: &NewAccount) -> Result<Account> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (login_id, name, password, must_change_password, failure_count,
                                created_at, updated_at)
             VALUES (?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(&new_account.login_id)
        .bind(&new_account.name)
        .bind(&new_account.password)
        .bind(new_account.must_change_password)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AuthError::LoginIdTaken(new_account.login_id.clone())
            }
            other => AuthError::Database(other.to_string()),
        })?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AuthError::Database(format!("account {id} vanished after insert")))
    }

    /// Get an account by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = ?");
        let result = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get an account by login id (exact match).
    pub async fn get_by_login_id(&self, login_id: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE login_id = ?");
        let result = sqlx::query_as::<_, Account>(&sql)
            .bind(login_id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Check whether a login id is already registered.
    pub async fn login_id_exists(&self, login_id: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE login_id = ?)")
            .bind(login_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(exists)
    }

    /// Increment the failure counter and stamp the failure time.
    ///
    /// The increment happens in a single statement so concurrent failures
    /// are never lost.
    pub async fn record_failure(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users
             SET failure_count = failure_count + 1, last_failure_at = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(at)
        .bind(at)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::Database(format!("account {id} not found")));
        }
        Ok(())
    }

    /// List all accounts ordered by ID.
    pub async fn list(&self) -> Result<Vec<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users ORDER BY id");
        let accounts = sqlx::query_as::<_, Account>(&sql)
            .fetch_all(self.pool)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(accounts)
    }
}
