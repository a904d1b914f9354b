//! Authentication handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, Json};

use crate::auth::{Credential, CredentialValidator, Registrar, RequestContext};
use crate::config::Config;
use crate::db::SqliteGateway;
use crate::web::dto::{LoginRequest, LoginResponse, ValidatedJson};
use crate::web::error::ApiError;
use crate::{Database, Result};

/// Application state shared across handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Login orchestration.
    pub validator: CredentialValidator,
    /// Account creation and lookup.
    pub registrar: Registrar,
    /// Deadline applied to storage calls of one request.
    pub request_timeout: Duration,
}

impl AppState {
    /// Create a new application state.
    pub fn new(validator: CredentialValidator, registrar: Registrar, request_timeout: Duration) -> Self {
        Self {
            validator,
            registrar,
            request_timeout,
        }
    }

    /// Wire the SQLite gateway, scrypt hasher and token issuer from config.
    pub fn from_config(db: &Database, config: &Config) -> Result<Self> {
        let gateway = Arc::new(SqliteGateway::new(db.pool().clone()));
        let validator = CredentialValidator::from_config(gateway.clone(), &config.auth)?;
        let registrar = Registrar::new(gateway, validator.hasher().clone());
        Ok(Self::new(validator, registrar, config.server.request_timeout()))
    }

    /// A fresh per-request context.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::with_timeout(self.request_timeout)
    }
}

/// POST /api/v1/login - Log in and receive an access token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> std::result::Result<Json<LoginResponse>, ApiError> {
    tracing::debug!("Start login");
    let credential = Credential::from(req);
    let ctx = state.request_context();

    let tokens = state.validator.authenticate(&ctx, &credential).await?;

    tracing::debug!("End login");
    Ok(Json(LoginResponse::success(tokens.access_token)))
}
