//! Configuration module for legend-auth.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{AuthError, Result};

/// Upper bound for token lifetimes and the lockout window (one year).
pub const MAX_DURATION_SECS: u64 = 366 * 24 * 60 * 60;

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Deadline applied to storage calls made while serving one request.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    1323
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    /// Request deadline as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/legend_auth.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty means console only.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/legend_auth.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Credential and token configuration.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign tokens (required).
    #[serde(default)]
    pub jwt_secret: String,
    /// Application-wide salt for the password KDF (required).
    #[serde(default)]
    pub kdf_salt: String,
    /// `iss` claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// `aud` claim.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Sliding lockout window after a failed attempt, in seconds.
    #[serde(default = "default_lockout_window")]
    pub lockout_window_secs: u64,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_expiry")]
    pub access_token_expiry_secs: u64,
    /// Refresh token lifetime in seconds.
    #[serde(default = "default_refresh_expiry")]
    pub refresh_token_expiry_secs: u64,
}

fn default_issuer() -> String {
    "legend_score".to_string()
}

fn default_audience() -> String {
    "legend_score".to_string()
}

fn default_lockout_window() -> u64 {
    600 // 10 minutes
}

fn default_access_expiry() -> u64 {
    600 // 10 minutes
}

fn default_refresh_expiry() -> u64 {
    24 * 60 * 60 // 24 hours
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            kdf_salt: String::new(),
            issuer: default_issuer(),
            audience: default_audience(),
            lockout_window_secs: default_lockout_window(),
            access_token_expiry_secs: default_access_expiry(),
            refresh_token_expiry_secs: default_refresh_expiry(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("kdf_salt", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("lockout_window_secs", &self.lockout_window_secs)
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("refresh_token_expiry_secs", &self.refresh_token_expiry_secs)
            .finish()
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Credential and token configuration.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(AuthError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| AuthError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `LEGEND_JWT_SECRET`: token signing secret
    /// - `LEGEND_KDF_SALT`: password KDF salt
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("LEGEND_JWT_SECRET") {
            if !secret.is_empty() {
                self.auth.jwt_secret = secret;
            }
        }
        if let Ok(salt) = std::env::var("LEGEND_KDF_SALT") {
            if !salt.is_empty() {
                self.auth.kdf_salt = salt;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// The signing secret and KDF salt must be set, and every window or
    /// lifetime must be non-zero.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(AuthError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via LEGEND_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.auth.kdf_salt.is_empty() {
            return Err(AuthError::Config(
                "kdf_salt is not set. \
                 Set it in config.toml or via LEGEND_KDF_SALT environment variable."
                    .to_string(),
            ));
        }
        if self.auth.lockout_window_secs == 0 {
            return Err(AuthError::Config(
                "lockout_window_secs must be greater than zero".to_string(),
            ));
        }
        if self.auth.access_token_expiry_secs == 0 || self.auth.refresh_token_expiry_secs == 0 {
            return Err(AuthError::Config(
                "token lifetimes must be greater than zero".to_string(),
            ));
        }
        let too_long = [
            ("lockout_window_secs", self.auth.lockout_window_secs),
            ("access_token_expiry_secs", self.auth.access_token_expiry_secs),
            ("refresh_token_expiry_secs", self.auth.refresh_token_expiry_secs),
        ]
        .into_iter()
        .find(|(_, secs)| *secs > MAX_DURATION_SECS);
        if let Some((name, secs)) = too_long {
            return Err(AuthError::Config(format!(
                "{name} = {secs} exceeds the maximum of {MAX_DURATION_SECS} seconds"
            )));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(AuthError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
