//! Request DTOs for Web API.

use std::fmt;

use serde::Deserialize;
use validator::Validate;

use crate::auth::{Credential, RegistrationRequest};

/// Login request.
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    /// Login id.
    #[validate(length(min = 1, max = 64))]
    pub login_id: String,
    /// Password.
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("login_id", &self.login_id)
            .finish_non_exhaustive()
    }
}

impl From<LoginRequest> for Credential {
    fn from(req: LoginRequest) -> Self {
        Credential::new(req.login_id, req.password)
    }
}

/// Account creation request.
///
/// The password is checked by the registrar so that a weak password is
/// reported as `E2002` rather than a generic bad request.
#[derive(Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Desired login id.
    #[validate(length(min = 1, max = 64))]
    pub login_id: String,
    /// Display name.
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    /// Password.
    pub password: String,
}

impl fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("login_id", &self.login_id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl From<CreateUserRequest> for RegistrationRequest {
    fn from(req: CreateUserRequest) -> Self {
        RegistrationRequest::new(req.login_id, req.name, req.password)
    }
}
