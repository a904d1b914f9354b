//! Password composition rules.
//!
//! One predicate is shared by login gating and account creation so the two
//! can never disagree about what an acceptable password looks like.

use thiserror::Error;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Reasons a password is rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyViolation {
    /// Password is too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    /// No ASCII lowercase letter.
    #[error("password must contain a lowercase letter")]
    MissingLowercase,

    /// No ASCII uppercase letter.
    #[error("password must contain an uppercase letter")]
    MissingUppercase,

    /// No ASCII digit.
    #[error("password must contain a digit")]
    MissingDigit,
}

/// Check a password against the composition rules.
///
/// Accepted iff it is at least [`MIN_PASSWORD_LENGTH`] characters long and
/// contains at least one ASCII lowercase letter, one ASCII uppercase letter
/// and one ASCII digit. The first failing rule is reported.
///
/// # Examples
///
/// ```
/// use legend_auth::auth::validate_password;
///
/// assert!(validate_password("Password123").is_ok());
/// assert!(validate_password("password123").is_err());
/// ```
pub fn validate_password(password: &str) -> Result<(), PolicyViolation> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PolicyViolation::TooShort);
    }
    if !password.bytes().any(|b| b.is_ascii_lowercase()) {
        return Err(PolicyViolation::MissingLowercase);
    }
    if !password.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(PolicyViolation::MissingUppercase);
    }
    if !password.bytes().any(|b| b.is_ascii_digit()) {
        return Err(PolicyViolation::MissingDigit);
    }
    Ok(())
}

/// Boolean form of [`validate_password`].
pub fn is_acceptable_password(password: &str) -> bool {
    validate_password(password).is_ok()
}
