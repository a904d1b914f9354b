//! Password hashing for legend-auth.
//!
//! Passwords are stretched with scrypt using one application-wide salt and
//! stored as the standard base64 encoding of the derived key.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use scrypt::Params;
use tracing::error;

use crate::{AuthError, Result};

/// Default scrypt cost: N = 2^15.
pub const DEFAULT_LOG_N: u8 = 15;

/// Default scrypt block size.
pub const DEFAULT_R: u32 = 8;

/// Default scrypt parallelism.
pub const DEFAULT_P: u32 = 1;

/// Derived key length in bytes.
pub const KEY_LENGTH: usize = 32;

/// Derives and checks password digests.
///
/// Implementations must be deterministic: the same plaintext always yields
/// the same digest for a given instance.
pub trait PasswordHasher: Send + Sync {
    /// Derive the stored digest for a plaintext password.
    fn digest(&self, plain: &str) -> Result<String>;

    /// Check a plaintext password against a stored digest.
    ///
    /// Returns `Ok(false)` on mismatch. Errors are reserved for KDF failures.
    fn verify(&self, plain: &str, stored: &str) -> Result<bool> {
        let candidate = self.digest(plain)?;
        Ok(constant_time_eq(candidate.as_bytes(), stored.as_bytes()))
    }
}

/// scrypt-backed [`PasswordHasher`].
#[derive(Clone)]
pub struct ScryptHasher {
    salt: Vec<u8>,
    params: Params,
}

impl ScryptHasher {
    /// Create a hasher with the default cost parameters.
    pub fn new(salt: impl Into<Vec<u8>>) -> Result<Self> {
        Self::with_cost(salt, DEFAULT_LOG_N, DEFAULT_R, DEFAULT_P)
    }

    /// Create a hasher with explicit cost parameters.
    pub fn with_cost(salt: impl Into<Vec<u8>>, log_n: u8, r: u32, p: u32) -> Result<Self> {
        let params = Params::new(log_n, r, p, KEY_LENGTH)
            .map_err(|e| AuthError::Config(format!("invalid scrypt parameters: {e}")))?;
        Ok(Self {
            salt: salt.into(),
            params,
        })
    }
}

impl std::fmt::Debug for ScryptHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScryptHasher")
            .field("log_n", &self.params.log_n())
            .field("r", &self.params.r())
            .field("p", &self.params.p())
            .finish_non_exhaustive()
    }
}

impl PasswordHasher for ScryptHasher {
    fn digest(&self, plain: &str) -> Result<String> {
        let mut key = [0u8; KEY_LENGTH];
        scrypt::scrypt(plain.as_bytes(), &self.salt, &self.params, &mut key).map_err(|e| {
            error!("scrypt derivation failed: {}", e);
            AuthError::Internal(format!("password hashing failed: {e}"))
        })?;
        Ok(STANDARD.encode(key))
    }
}

/// Compare two byte strings without short-circuiting on the first difference.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher(salt: &str) -> ScryptHasher {
        ScryptHasher::with_cost(salt, 4, 8, 1).unwrap()
    }

    #[test]
    fn test_digest_is_deterministic() {
        let hasher = fast_hasher("legend_score_salt_dev");
        let a = hasher.digest("Password123").unwrap();
        let b = hasher.digest("Password123").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_is_base64_of_32_bytes() {
        let digest = fast_hasher("salt").digest("Password123").unwrap();
        let raw = STANDARD.decode(&digest).unwrap();
        assert_eq!(raw.len(), KEY_LENGTH);
        assert_eq!(digest.len(), 44);
        assert!(digest.ends_with('='));
    }

    #[test]
    fn test_distinct_passwords_distinct_digests() {
        let hasher = fast_hasher("salt");
        assert_ne!(
            hasher.digest("Password123").unwrap(),
            hasher.digest("Password124").unwrap()
        );
    }

    #[test]
    fn test_salt_changes_digest() {
        assert_ne!(
            fast_hasher("salt-a").digest("Password123").unwrap(),
            fast_hasher("salt-b").digest("Password123").unwrap()
        );
    }

    #[test]
    fn test_verify() {
        let hasher = fast_hasher("salt");
        let stored = hasher.digest("Password123").unwrap();
        assert!(hasher.verify("Password123", &stored).unwrap());
        assert!(!hasher.verify("Password12", &stored).unwrap());
        assert!(!hasher.verify("Password123", "").unwrap());
    }

    #[test]
    fn test_default_cost_parameters() {
        let hasher = ScryptHasher::new("legend_score_salt_dev").unwrap();
        assert_eq!(hasher.params.log_n(), DEFAULT_LOG_N);
        assert_eq!(hasher.params.r(), DEFAULT_R);
        assert_eq!(hasher.params.p(), DEFAULT_P);

        let digest = hasher.digest("Password123").unwrap();
        assert_eq!(STANDARD.decode(&digest).unwrap().len(), KEY_LENGTH);
    }

    #[test]
    fn test_invalid_cost_is_config_error() {
        let result = ScryptHasher::with_cost("salt", 15, 0, 1);
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[test]
    fn test_debug_hides_salt() {
        let debug = format!("{:?}", fast_hasher("very-secret-salt"));
        assert!(!debug.contains("very-secret-salt"));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }
}
