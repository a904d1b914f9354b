//! Access and refresh token issuance.
//!
//! Tokens are HS256 JWTs signed with one process-wide secret. Both kinds carry
//! the same claim set and differ only in lifetime.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::AuthConfig;
use crate::{AuthError, Result};

/// Default access token lifetime (10 minutes).
pub const DEFAULT_ACCESS_TOKEN_LIFETIME_SECS: u64 = 10 * 60;

/// Default refresh token lifetime (24 hours).
pub const DEFAULT_REFRESH_TOKEN_LIFETIME_SECS: u64 = 24 * 60 * 60;

/// Which token is being minted or checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived bearer token.
    Access,
    /// Longer-lived token stored alongside the access token.
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT claim set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer.
    pub iss: String,
    /// Subject.
    pub sub: String,
    /// Audience.
    pub aud: Vec<String>,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Not before (unix seconds).
    pub nbf: i64,
    /// Expiration (unix seconds).
    pub exp: i64,
    /// Account id as a decimal string.
    pub jti: String,
}

impl Claims {
    /// Parse the account id carried in `jti`.
    pub fn account_id(&self) -> Option<i64> {
        self.jti.parse().ok()
    }
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Builds, signs and verifies tokens.
pub struct TokenIssuer {
    keys: Option<SigningKeys>,
    issuer: String,
    audience: String,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_lifetime", &self.access_lifetime)
            .field("refresh_lifetime", &self.refresh_lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Create an issuer with the default lifetimes.
    ///
    /// An empty secret is accepted here but every `issue` call will fail.
    pub fn new(secret: &str, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        let keys = (!secret.is_empty()).then(|| SigningKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        });
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
            access_lifetime: Duration::from_secs(DEFAULT_ACCESS_TOKEN_LIFETIME_SECS),
            refresh_lifetime: Duration::from_secs(DEFAULT_REFRESH_TOKEN_LIFETIME_SECS),
        }
    }

    /// Override the token lifetimes.
    pub fn with_lifetimes(mut self, access: Duration, refresh: Duration) -> Self {
        self.access_lifetime = access;
        self.refresh_lifetime = refresh;
        self
    }

    /// Create an issuer from the `[auth]` configuration section.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, &config.issuer, &config.audience).with_lifetimes(
            Duration::from_secs(config.access_token_expiry_secs),
            Duration::from_secs(config.refresh_token_expiry_secs),
        )
    }

    /// Lifetime of the given token kind.
    pub fn lifetime(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_lifetime,
            TokenKind::Refresh => self.refresh_lifetime,
        }
    }

    /// Issue a token for `subject_id` valid from now.
    pub fn issue(&self, subject_id: i64, kind: TokenKind) -> Result<String> {
        self.issue_at(subject_id, kind, Utc::now())
    }

    /// Issue a token for `subject_id` with `iat = nbf = now`.
    pub fn issue_at(&self, subject_id: i64, kind: TokenKind, now: DateTime<Utc>) -> Result<String> {
        let keys = self.keys.as_ref().ok_or_else(|| {
            error!("token signing secret is not configured");
            AuthError::Internal("token signing secret is not configured".to_string())
        })?;

        let lifetime = chrono::Duration::from_std(self.lifetime(kind))
            .map_err(|e| AuthError::Internal(format!("token lifetime out of range: {e}")))?;
        let exp = now.checked_add_signed(lifetime).ok_or_else(|| {
            error!("{} token expiry overflows the calendar", kind);
            AuthError::Internal(format!("{kind} token lifetime out of range"))
        })?;
        let iat = now.timestamp();
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: subject_id.to_string(),
            aud: vec![self.audience.clone()],
            iat,
            nbf: iat,
            exp: exp.timestamp(),
            jti: subject_id.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).map_err(|e| {
            error!("Failed to encode {} token: {}", kind, e);
            AuthError::Internal(format!("failed to sign {kind} token"))
        })
    }

    /// Verify a token's signature, issuer, audience and validity window.
    ///
    /// A token whose lifetime exceeds that of `kind` is rejected, so a refresh
    /// token is never accepted where an access token is expected.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims> {
        let keys = self
            .keys
            .as_ref()
            .ok_or_else(|| AuthError::Unauthenticated("signing secret missing".to_string()))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_nbf = true;

        let data = decode::<Claims>(token, &keys.decoding, &validation).map_err(|e| {
            debug!("JWT validation failed: {}", e);
            AuthError::Unauthenticated("invalid or expired token".to_string())
        })?;

        let max_lifetime = i64::try_from(self.lifetime(kind).as_secs()).unwrap_or(i64::MAX);
        if data.claims.exp - data.claims.iat > max_lifetime {
            debug!("token lifetime exceeds {} lifetime", kind);
            return Err(AuthError::Unauthenticated(format!(
                "token is not valid as {kind} token"
            )));
        }
        Ok(data.claims)
    }
}
