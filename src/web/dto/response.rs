//! Response DTOs for Web API.

use serde::Serialize;

use crate::db::Account;

/// Login response.
#[derive(Serialize)]
pub struct LoginResponse {
    /// Whether the login succeeded.
    pub result: bool,
    /// Access token (JWT).
    pub token: String,
    /// Error code, empty on success.
    pub code: String,
}

impl LoginResponse {
    /// Successful login carrying the access token.
    pub fn success(token: String) -> Self {
        Self {
            result: true,
            token,
            code: String::new(),
        }
    }
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("result", &self.result)
            .field("code", &self.code)
            .finish_non_exhaustive()
    }
}

/// Account creation response.
#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    /// Whether the account was created.
    pub result: bool,
    /// Error code, empty on success.
    pub code: String,
}

impl CreateUserResponse {
    /// Successful creation.
    pub fn success() -> Self {
        Self {
            result: true,
            code: String::new(),
        }
    }
}

/// Public view of an account. The password digest is never included.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// Account ID.
    pub id: i64,
    /// Login id.
    pub login_id: String,
    /// Display name.
    pub name: String,
    /// Whether a password change is pending.
    pub must_change_password: bool,
}

impl From<Account> for UserResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            login_id: account.login_id,
            name: account.name,
            must_change_password: account.must_change_password,
        }
    }
}

/// Account lookup response.
#[derive(Debug, Serialize)]
pub struct GetUserResponse {
    /// Whether the lookup succeeded.
    pub result: bool,
    /// Error code, empty on success.
    pub code: String,
    /// Account details.
    pub user: UserResponse,
}

impl GetUserResponse {
    /// Successful lookup.
    pub fn success(account: Account) -> Self {
        Self {
            result: true,
            code: String::new(),
            user: account.into(),
        }
    }
}

/// Account listing response.
#[derive(Debug, Serialize)]
pub struct GetUsersResponse {
    /// Whether the listing succeeded.
    pub result: bool,
    /// Error code, empty on success.
    pub code: String,
    /// Accounts ordered by ID.
    pub users: Vec<UserResponse>,
}

impl GetUsersResponse {
    /// Successful listing.
    pub fn success(accounts: Vec<Account>) -> Self {
        Self {
            result: true,
            code: String::new(),
            users: accounts.into_iter().map(UserResponse::from).collect(),
        }
    }
}
