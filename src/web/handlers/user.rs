//! User handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use super::AppState;
use crate::auth::RegistrationRequest;
use crate::web::dto::{
    CreateUserRequest, CreateUserResponse, GetUserResponse, GetUsersResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// POST /api/v1/user - Create an account.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<Json<CreateUserResponse>, ApiError> {
    tracing::debug!("Start create_user");
    let request = RegistrationRequest::from(req);
    let ctx = state.request_context();

    state.registrar.validate_create_user(&ctx, &request).await?;
    state.registrar.create_user(&ctx, &request).await?;

    tracing::debug!("End create_user");
    Ok(Json(CreateUserResponse::success()))
}

/// GET /api/v1/user - List all accounts.
pub async fn get_users(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
) -> Result<Json<GetUsersResponse>, ApiError> {
    tracing::debug!(requested_by = auth_user.account_id, "Start get_users");
    let ctx = state.request_context();
    let accounts = state.registrar.get_users(&ctx).await?;
    Ok(Json(GetUsersResponse::success(accounts)))
}

/// GET /api/v1/user/:user_id - Look up an account.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<GetUserResponse>, ApiError> {
    let user_id: i64 = user_id
        .parse()
        .map_err(|_| ApiError::bad_request(format!("invalid user id: {user_id}")))?;
    tracing::debug!(requested_by = auth_user.account_id, user_id, "Start get_user");

    let ctx = state.request_context();
    let account = state
        .registrar
        .get_user(&ctx, user_id)
        .await?
        .ok_or_else(|| ApiError::bad_request(format!("user {user_id} not found")))?;

    Ok(Json(GetUserResponse::success(account)))
}
