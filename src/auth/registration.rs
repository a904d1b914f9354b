//! Account registration for legend-auth.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};

use super::credential::RequestContext;
use super::password::PasswordHasher;
use super::policy::validate_password;
use crate::db::{Account, AccountDirectory, NewAccount};
use crate::{AuthError, Result};

/// Registration request data.
#[derive(Clone)]
pub struct RegistrationRequest {
    /// Desired login id.
    pub login_id: String,
    /// Display name.
    pub name: String,
    /// Plaintext password.
    pub password: String,
}

impl RegistrationRequest {
    /// Create a new registration request.
    pub fn new(
        login_id: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            login_id: login_id.into(),
            name: name.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("login_id", &self.login_id)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Creates accounts using the shared password policy and hasher.
#[derive(Clone)]
pub struct Registrar {
    directory: Arc<dyn AccountDirectory>,
    hasher: Arc<dyn PasswordHasher>,
}

impl fmt::Debug for Registrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registrar").finish_non_exhaustive()
    }
}

impl Registrar {
    /// Create a registrar.
    pub fn new(directory: Arc<dyn AccountDirectory>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { directory, hasher }
    }

    /// Check that a registration can proceed.
    ///
    /// 1. Empty login id or name is `InvalidRequest`
    /// 2. A login id already in use is `LoginIdTaken`
    /// 3. A password failing the composition rules is `WeakPassword`
    ///
    /// Storage errors surface unchanged and map to `E9000`.
    pub async fn validate_create_user(
        &self,
        ctx: &RequestContext,
        request: &RegistrationRequest,
    ) -> Result<()> {
        let login_id = request.login_id.as_str();

        if login_id.trim().is_empty() || request.name.trim().is_empty() {
            return Err(AuthError::InvalidRequest(
                "login_id and name are required".to_string(),
            ));
        }

        let exists = ctx
            .run(self.directory.login_id_exists(login_id))
            .await
            .map_err(|e| {
                error!(login_id, "login id lookup failed: {}", e);
                e
            })?;
        if exists {
            warn!(login_id, "registration rejected: login id already used");
            return Err(AuthError::LoginIdTaken(login_id.to_string()));
        }

        if let Err(violation) = validate_password(&request.password) {
            warn!(login_id, "registration rejected: {}", violation);
            return Err(AuthError::WeakPassword);
        }

        Ok(())
    }

    /// Hash the password and store the account.
    ///
    /// New accounts start with no failures and must change their password
    /// on first login. Call [`validate_create_user`](Self::validate_create_user)
    /// first.
    pub async fn create_user(
        &self,
        ctx: &RequestContext,
        request: &RegistrationRequest,
    ) -> Result<Account> {
        let login_id = request.login_id.as_str();
        let digest = self.hasher.digest(&request.password).map_err(|e| {
            error!(login_id, "password hashing failed: {}", e);
            e
        })?;

        let new_account = NewAccount::new(login_id, &request.name, digest);
        let account = ctx
            .run(self.directory.create_account(&new_account))
            .await
            .map_err(|e| {
                error!(login_id, "failed to create account: {}", e);
                e
            })?;

        info!(login_id, account_id = account.id, "account created");
        Ok(account)
    }

    /// Validate then create in one call.
    pub async fn register(
        &self,
        ctx: &RequestContext,
        request: &RegistrationRequest,
    ) -> Result<Account> {
        self.validate_create_user(ctx, request).await?;
        self.create_user(ctx, request).await
    }

    /// Look up an account by ID.
    pub async fn get_user(&self, ctx: &RequestContext, id: i64) -> Result<Option<Account>> {
        ctx.run(self.directory.get_account(id)).await
    }

    /// List every account.
    pub async fn get_users(&self, ctx: &RequestContext) -> Result<Vec<Account>> {
        ctx.run(self.directory.list_accounts()).await.map_err(|e| {
            error!("failed to list accounts: {}", e);
            e
        })
    }
}
