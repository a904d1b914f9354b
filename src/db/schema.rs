//! Database schema and migrations for legend-auth.

/// Database migrations.
///
/// Each migration is a SQL script executed in order. The `schema_version`
/// table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    login_id              TEXT NOT NULL UNIQUE,
    name                  TEXT NOT NULL,
    password              TEXT NOT NULL,           -- base64 scrypt digest
    must_change_password  INTEGER NOT NULL DEFAULT 1,
    failure_count         INTEGER NOT NULL DEFAULT 0 CHECK (failure_count >= 0),
    last_failure_at       TEXT,
    created_at            TEXT NOT NULL,
    updated_at            TEXT NOT NULL
);
"#,
    // v2: tokens issued on successful login
    r#"
CREATE TABLE user_tokens (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id        INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token          TEXT NOT NULL,
    refresh_token  TEXT NOT NULL,
    created_at     TEXT NOT NULL
);

CREATE INDEX idx_user_tokens_user_id ON user_tokens(user_id);
"#,
];
