//! Credential validation and token issuance.
//!
//! This module provides the password policy, password hashing, the lockout
//! policy, token issuance, login orchestration and account registration.

mod credential;
mod lockout;
mod password;
mod policy;
mod registration;
mod token;

pub use credential::{Credential, CredentialValidator, IssuedTokens, RequestContext};
pub use lockout::{LockoutPolicy, DEFAULT_LOCKOUT_WINDOW_SECS};
pub use password::{
    PasswordHasher, ScryptHasher, DEFAULT_LOG_N, DEFAULT_P, DEFAULT_R, KEY_LENGTH,
};
pub use policy::{is_acceptable_password, validate_password, PolicyViolation, MIN_PASSWORD_LENGTH};
pub use registration::{Registrar, RegistrationRequest};
pub use token::{
    Claims, TokenIssuer, TokenKind, DEFAULT_ACCESS_TOKEN_LIFETIME_SECS,
    DEFAULT_REFRESH_TOKEN_LIFETIME_SECS,
};
