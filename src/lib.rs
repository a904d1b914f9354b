//! legend-auth - credential validation and token issuance for Legend Score.
//!
//! Decides whether a login attempt is accepted, enforces the account lockout
//! window, verifies scrypt password digests and issues JWT access and refresh
//! tokens. Exposed over a small JSON API.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{
    is_acceptable_password, validate_password, Claims, Credential, CredentialValidator,
    IssuedTokens, LockoutPolicy, PasswordHasher, PolicyViolation, Registrar, RegistrationRequest,
    RequestContext, ScryptHasher, TokenIssuer, TokenKind,
};
pub use config::Config;
pub use db::{
    Account, AccountDirectory, Database, NewAccount, PersistenceGateway, SqliteGateway,
};
pub use error::{AuthError, ErrorCode, Result};
