//! Bearer token authentication middleware.

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{Claims, TokenIssuer, TokenKind};
use crate::web::error::ApiError;

/// Token verification state shared with the extractor.
#[derive(Clone, Debug)]
pub struct JwtState {
    /// Issuer used to verify access tokens.
    pub issuer: Arc<TokenIssuer>,
}

impl JwtState {
    /// Create a new JWT state around an issuer.
    pub fn new(issuer: Arc<TokenIssuer>) -> Self {
        Self { issuer }
    }
}

/// Extractor for authenticated accounts.
///
/// Requires `Authorization: Bearer <access token>`. A missing header, another
/// scheme, a bad signature, an expired token or a non-numeric `jti` are all
/// rejected with `E0000`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Account id taken from the token's `jti`.
    pub account_id: i64,
    /// Verified claims.
    pub claims: Claims,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::unauthenticated("Missing authorization"))?;

        let jwt_state = parts
            .extensions
            .get::<Arc<JwtState>>()
            .ok_or_else(|| ApiError::internal("JWT state not configured"))?;

        let claims = jwt_state
            .issuer
            .verify(token, TokenKind::Access)
            .map_err(|e| ApiError::unauthenticated(e.to_string()))?;

        let account_id = claims.account_id().ok_or_else(|| {
            tracing::debug!("token jti is not an account id: {:?}", claims.jti);
            ApiError::unauthenticated("Invalid token subject")
        })?;

        Ok(AuthUser { account_id, claims })
    }
}

/// Middleware function to inject JWT state into request extensions.
pub async fn jwt_auth(jwt_state: Arc<JwtState>, mut request: Request<Body>, next: Next) -> Response {
    request.extensions_mut().insert(jwt_state);
    next.run(request).await
}
