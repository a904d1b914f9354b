//! Issued token repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{AuthError, Result};

/// Tokens written once per successful login.
#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct IssuedTokenRecord {
    /// Record ID.
    pub id: i64,
    /// Account the tokens were issued to.
    pub user_id: i64,
    /// Access token.
    pub token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Issue timestamp.
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedTokenRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedTokenRecord")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Repository for issued token records.
pub struct UserTokenRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserTokenRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a token pair for an account.
    pub async fn create(&self, user_id: i64, token: &str, refresh_token: &str) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO user_tokens (user_id, token, refresh_token, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(token)
        .bind(refresh_token)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    /// List token records for an account, newest first.
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<IssuedTokenRecord>> {
        let records = sqlx::query_as::<_, IssuedTokenRecord>(
            "SELECT id, user_id, token, refresh_token, created_at
             FROM user_tokens WHERE user_id = ? ORDER BY id DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(records)
    }
}
