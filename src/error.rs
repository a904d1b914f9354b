//! Error types for legend-auth.

use std::fmt;

use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Externally visible error codes.
///
/// Every failure that leaves the service carries exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorCode {
    /// Unauthenticated (missing or invalid bearer token).
    E0000,
    /// Bad request: malformed input, unknown login id or wrong password.
    E0001,
    /// Account is locked.
    E1001,
    /// Login id is already in use.
    E2001,
    /// Password does not meet the composition rules.
    E2002,
    /// Internal error.
    #[default]
    E9000,
}

impl ErrorCode {
    /// Wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0000 => "E0000",
            ErrorCode::E0001 => "E0001",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E9000 => "E9000",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::E0000 => StatusCode::UNAUTHORIZED,
            ErrorCode::E0001 => StatusCode::BAD_REQUEST,
            ErrorCode::E1001 => StatusCode::UNAUTHORIZED,
            ErrorCode::E2001 => StatusCode::BAD_REQUEST,
            ErrorCode::E2002 => StatusCode::BAD_REQUEST,
            ErrorCode::E9000 => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Common error type for legend-auth.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No valid bearer token was presented.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Malformed input or a credential that does not resolve to an account.
    ///
    /// Unknown login ids and wrong passwords both end up here so that callers
    /// cannot tell them apart.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Account is inside its lockout window.
    #[error("account locked")]
    Locked,

    /// Login id is already registered.
    #[error("login id already used: {0}")]
    LoginIdTaken(String),

    /// Password does not meet the composition rules.
    #[error("password does not meet requirements")]
    WeakPassword,

    /// Password hashing or token signing failed.
    #[error("internal error: {0}")]
    Internal(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(String),

    /// The request deadline elapsed while waiting on storage.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// The single error code this failure is reported as.
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthError::Unauthenticated(_) => ErrorCode::E0000,
            AuthError::InvalidRequest(_) => ErrorCode::E0001,
            AuthError::Locked => ErrorCode::E1001,
            AuthError::LoginIdTaken(_) => ErrorCode::E2001,
            AuthError::WeakPassword => ErrorCode::E2002,
            AuthError::Internal(_)
            | AuthError::Database(_)
            | AuthError::DeadlineExceeded
            | AuthError::Io(_)
            | AuthError::Config(_) => ErrorCode::E9000,
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::Database(e.to_string())
    }
}

/// Result type alias for legend-auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;
