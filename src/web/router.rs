//! Router configuration for Web API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{create_user, get_user, get_users, login, AppState};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};

/// Create the main API router.
///
/// All routes live under `/api/v1`. `GET /user` and `GET /user/:user_id`
/// require a bearer access token.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let jwt_state = Arc::new(JwtState::new(app_state.validator.issuer().clone()));

    let v1_routes = Router::new()
        .route("/login", post(login))
        .route("/user", get(get_users).post(create_user))
        .route("/user/:user_id", get(get_user));

    Router::new()
        .nest("/api/v1", v1_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
