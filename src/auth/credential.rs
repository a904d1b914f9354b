//! Login orchestration.
//!
//! [`CredentialValidator`] gates a login attempt on the password policy, the
//! account lookup and the lockout window, then verifies the digest, mints an
//! access/refresh token pair and records it.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

use super::lockout::LockoutPolicy;
use super::password::{PasswordHasher, ScryptHasher};
use super::policy::validate_password;
use super::token::{TokenIssuer, TokenKind};
use crate::config::AuthConfig;
use crate::db::{Account, PersistenceGateway};
use crate::{AuthError, Result};

/// Login id and plaintext password taken from a request.
///
/// Never persisted. The `Debug` output redacts the password.
#[derive(Clone)]
pub struct Credential {
    /// Login id.
    pub login_id: String,
    /// Plaintext password.
    pub password: String,
}

impl Credential {
    /// Create a credential.
    pub fn new(login_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login_id: login_id.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("login_id", &self.login_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Per-request deadline applied to every storage call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context without a deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context with an absolute deadline.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Run a storage future, failing with `DeadlineExceeded` once the
    /// deadline passes.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.deadline {
            Some(deadline) => timeout_at(deadline, fut)
                .await
                .map_err(|_| AuthError::DeadlineExceeded)?,
            None => fut.await,
        }
    }
}

/// Tokens minted by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    /// Access token returned to the client.
    pub access_token: String,
    /// Refresh token, persisted alongside the access token.
    pub refresh_token: String,
}

impl fmt::Debug for IssuedTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedTokens").finish_non_exhaustive()
    }
}

/// Keep internal failures as they are and fold anything else into one.
fn internal(e: AuthError) -> AuthError {
    match e {
        AuthError::Internal(_) => e,
        other => AuthError::Internal(other.to_string()),
    }
}

/// Decides whether a login attempt succeeds and issues tokens.
///
/// Holds no mutable state; one instance is shared by all requests.
#[derive(Clone)]
pub struct CredentialValidator {
    gateway: Arc<dyn PersistenceGateway>,
    hasher: Arc<dyn PasswordHasher>,
    issuer: Arc<TokenIssuer>,
    lockout: LockoutPolicy,
}

impl CredentialValidator {
    /// Assemble a validator from its collaborators.
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        hasher: Arc<dyn PasswordHasher>,
        issuer: Arc<TokenIssuer>,
        lockout: LockoutPolicy,
    ) -> Self {
        Self {
            gateway,
            hasher,
            issuer,
            lockout,
        }
    }

    /// Build a validator with the scrypt hasher and settings from `[auth]`.
    pub fn from_config(gateway: Arc<dyn PersistenceGateway>, config: &AuthConfig) -> Result<Self> {
        let hasher = ScryptHasher::new(config.kdf_salt.as_bytes())?;
        Ok(Self::new(
            gateway,
            Arc::new(hasher),
            Arc::new(TokenIssuer::from_config(config)),
            LockoutPolicy::new(Duration::from_secs(config.lockout_window_secs)),
        ))
    }

    /// The token issuer, shared with the bearer-auth middleware.
    pub fn issuer(&self) -> &Arc<TokenIssuer> {
        &self.issuer
    }

    /// The password hasher, shared with registration.
    pub fn hasher(&self) -> &Arc<dyn PasswordHasher> {
        &self.hasher
    }

    /// Gate a login attempt and return the account snapshot.
    ///
    /// Fails with `InvalidRequest` when the password breaks the composition
    /// rules (without touching storage), when the login id is unknown, or
    /// when the lookup itself fails. Fails with `Locked` inside the lockout
    /// window; the digest is not checked in that case.
    pub async fn validate_login(&self, ctx: &RequestContext, credential: &Credential) -> Result<Account> {
        let login_id = credential.login_id.as_str();
        debug!(login_id, "login validation started");

        if let Err(violation) = validate_password(&credential.password) {
            warn!(login_id, "login rejected by password policy: {}", violation);
            return Err(AuthError::InvalidRequest(violation.to_string()));
        }
        debug!(login_id, "password policy checked");

        let account = match ctx
            .run(self.gateway.find_account_by_login_id(login_id))
            .await
        {
            Ok(Some(account)) => account,
            Ok(None) => {
                warn!(login_id, "login rejected: unknown login id");
                return Err(AuthError::InvalidRequest("invalid credentials".to_string()));
            }
            Err(e) => {
                error!(login_id, "account lookup failed: {}", e);
                return Err(AuthError::InvalidRequest("invalid credentials".to_string()));
            }
        };
        debug!(login_id, account_id = account.id, "account fetched");

        if self.lockout.is_locked(account.last_failure_at, Utc::now()) {
            warn!(login_id, account_id = account.id, "login rejected: account locked");
            return Err(AuthError::Locked);
        }
        debug!(login_id, account_id = account.id, "lockout checked");

        Ok(account)
    }

    /// Verify the password against `account` and issue tokens.
    ///
    /// On mismatch the snapshot's failure counter is bumped and the gateway
    /// is asked to record the failure; the caller sees `InvalidRequest` even
    /// if recording fails. Hashing or signing failures are `Internal`. A
    /// failure to persist the tokens is `InvalidRequest` and no token is
    /// returned.
    pub async fn login(
        &self,
        ctx: &RequestContext,
        credential: &Credential,
        account: &mut Account,
    ) -> Result<IssuedTokens> {
        let login_id = credential.login_id.as_str();

        let matches = self
            .hasher
            .verify(&credential.password, &account.password)
            .map_err(|e| {
                error!(login_id, "password verification failed: {}", e);
                internal(e)
            })?;

        if !matches {
            account.failure_count += 1;
            account.last_failure_at = Some(Utc::now());
            warn!(
                login_id,
                account_id = account.id,
                failure_count = account.failure_count,
                "login rejected: wrong password"
            );
            if let Err(e) = ctx.run(self.gateway.record_failed_attempt(account.id)).await {
                error!(login_id, account_id = account.id, "failed to record login failure: {}", e);
            }
            return Err(AuthError::InvalidRequest("invalid credentials".to_string()));
        }
        debug!(login_id, account_id = account.id, "digest verified");

        let access_token = self
            .issuer
            .issue(account.id, TokenKind::Access)
            .map_err(internal)?;
        let refresh_token = self
            .issuer
            .issue(account.id, TokenKind::Refresh)
            .map_err(internal)?;
        debug!(login_id, account_id = account.id, "tokens issued");

        if let Err(e) = ctx
            .run(
                self.gateway
                    .insert_issued_token(account.id, &access_token, &refresh_token),
            )
            .await
        {
            error!(login_id, account_id = account.id, "failed to persist issued tokens: {}", e);
            return Err(AuthError::InvalidRequest("failed to store token".to_string()));
        }
        debug!(login_id, account_id = account.id, "tokens persisted");

        info!(login_id, account_id = account.id, "login succeeded");
        Ok(IssuedTokens {
            access_token,
            refresh_token,
        })
    }

    /// Run [`validate_login`](Self::validate_login) followed by
    /// [`login`](Self::login).
    pub async fn authenticate(&self, ctx: &RequestContext, credential: &Credential) -> Result<IssuedTokens> {
        let mut account = self.validate_login(ctx, credential).await?;
        self.login(ctx, credential, &mut account).await
    }
}

impl fmt::Debug for CredentialValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialValidator")
            .field("issuer", &self.issuer)
            .field("lockout", &self.lockout)
            .finish_non_exhaustive()
    }
}
