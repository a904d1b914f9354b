//! Account lockout policy.
//!
//! Lock state is derived from the most recent failed attempt; there is no
//! stored flag and no explicit unlock. Every new failure slides the window.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Default lockout window (10 minutes).
pub const DEFAULT_LOCKOUT_WINDOW_SECS: u64 = 10 * 60;

/// Decides whether an account is currently locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    window: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_LOCKOUT_WINDOW_SECS))
    }
}

impl LockoutPolicy {
    /// Create a policy with the given window.
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// The configured window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// True iff `last_failure` exists and lies strictly after `now - window`.
    pub fn is_locked(&self, last_failure: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(last_failure) = last_failure else {
            return false;
        };
        // A window too large for chrono locks every recorded failure.
        match chrono::Duration::from_std(self.window)
            .ok()
            .and_then(|w| now.checked_sub_signed(w))
        {
            Some(threshold) => last_failure > threshold,
            None => true,
        }
    }
}
