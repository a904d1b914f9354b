//! API error handling.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{AuthError, ErrorCode};

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub result: bool,
    /// Error code.
    pub code: ErrorCode,
}

/// API error type.
///
/// Only the code reaches the client; the message is for logs.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create an unauthenticated error (`E0000`).
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::E0000, message)
    }

    /// Create a bad request error (`E0001`).
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::E0001, message)
    }

    /// Create an internal server error (`E9000`).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::E9000, message)
    }

    /// The error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Convert validator errors into a bad request.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        tracing::debug!("request validation failed for fields: {:?}", fields);
        Self::bad_request(format!("validation failed: {}", fields.join(", ")))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            result: false,
            code: self.code,
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let code = err.code();
        if code == ErrorCode::E9000 {
            tracing::error!("Internal error: {}", err);
        }
        ApiError::new(code, err.to_string())
    }
}
