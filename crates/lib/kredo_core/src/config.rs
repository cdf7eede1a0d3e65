//! Tunable policy for the core components.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// One-time-code policy.
#[derive(Clone, Debug)]
pub struct OtpConfig {
    /// Lifetime of a challenge.
    pub ttl_seconds: u32,
    /// Verify attempts allowed before the challenge locks.
    pub max_attempts: u32,
    /// How long a locked challenge rejects verification.
    pub lockout_minutes: u32,
    /// Number of digits in a generated code.
    pub code_length: u32,
    /// bcrypt cost used when hashing codes.
    pub hash_cost: u32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 120,
            max_attempts: 5,
            lockout_minutes: 5,
            code_length: 6,
            hash_cost: 10,
        }
    }
}

/// Access token policy.
#[derive(Clone, Debug)]
pub struct TokenConfig {
    pub ttl_seconds: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self { ttl_seconds: 900 }
    }
}

/// Challenge-endpoint throttle.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// Requests allowed per key per window.
    pub capacity: u32,
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            window_seconds: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

/// CRM collaborator limits.
#[derive(Clone, Debug)]
pub struct CrmConfig {
    /// Upper bound on the customer-flag lookup made while scoring.
    pub flags_timeout_ms: u64,
    /// Upper bound on a single background push.
    pub push_timeout_ms: u64,
    /// Pending pushes held before new ones are dropped.
    pub queue_capacity: usize,
    /// Pushes in flight at once.
    pub max_concurrent_pushes: usize,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            flags_timeout_ms: 2_000,
            push_timeout_ms: 5_000,
            queue_capacity: 256,
            max_concurrent_pushes: 8,
        }
    }
}

impl CrmConfig {
    pub fn flags_timeout(&self) -> Duration {
        Duration::from_millis(self.flags_timeout_ms)
    }

    pub fn push_timeout(&self) -> Duration {
        Duration::from_millis(self.push_timeout_ms)
    }
}

/// All core settings.
#[derive(Clone, Debug, Default)]
pub struct CoreConfig {
    pub otp: OtpConfig,
    pub token: TokenConfig,
    pub rate_limit: RateLimitConfig,
    pub crm: CrmConfig,
}

impl CoreConfig {
    /// Reads overrides from environment variables, keeping defaults for anything unset.
    ///
    /// | Variable                     | Default |
    /// |------------------------------|---------|
    /// | `KREDO_OTP_TTL_SECONDS`      | `120`   |
    /// | `KREDO_OTP_MAX_ATTEMPTS`     | `5`     |
    /// | `KREDO_OTP_LOCKOUT_MINUTES`  | `5`     |
    /// | `KREDO_OTP_CODE_LENGTH`      | `6`     |
    /// | `KREDO_TOKEN_TTL_SECONDS`    | `900`   |
    /// | `KREDO_RATE_LIMIT_CAPACITY`  | `10`    |
    /// | `KREDO_CRM_FLAGS_TIMEOUT_MS` | `2000`  |
    /// | `KREDO_CRM_PUSH_TIMEOUT_MS`  | `5000`  |
    pub fn from_env() -> Self {
        let mut config = Self::default();
        override_from_env("KREDO_OTP_TTL_SECONDS", &mut config.otp.ttl_seconds);
        override_from_env("KREDO_OTP_MAX_ATTEMPTS", &mut config.otp.max_attempts);
        override_from_env("KREDO_OTP_LOCKOUT_MINUTES", &mut config.otp.lockout_minutes);
        override_from_env("KREDO_OTP_CODE_LENGTH", &mut config.otp.code_length);
        override_from_env("KREDO_TOKEN_TTL_SECONDS", &mut config.token.ttl_seconds);
        override_from_env("KREDO_RATE_LIMIT_CAPACITY", &mut config.rate_limit.capacity);
        override_from_env("KREDO_CRM_FLAGS_TIMEOUT_MS", &mut config.crm.flags_timeout_ms);
        override_from_env("KREDO_CRM_PUSH_TIMEOUT_MS", &mut config.crm.push_timeout_ms);
        // Codes must fit in a u32 and have at least one digit.
        config.otp.code_length = config.otp.code_length.clamp(1, 9);
        config
    }
}

fn override_from_env<T: FromStr>(name: &str, slot: &mut T) {
    let Ok(raw) = std::env::var(name) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *slot = value,
        Err(_) => warn!(variable = name, value = %raw, "ignoring unparsable setting"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_policy() {
        let config = CoreConfig::default();
        assert_eq!(config.otp.ttl_seconds, 120);
        assert_eq!(config.otp.max_attempts, 5);
        assert_eq!(config.otp.lockout_minutes, 5);
        assert_eq!(config.otp.code_length, 6);
        assert_eq!(config.token.ttl_seconds, 900);
        assert_eq!(config.rate_limit.capacity, 10);
        assert_eq!(config.rate_limit.window(), Duration::from_secs(60));
    }

    #[test]
    fn unparsable_override_keeps_default() {
        let mut slot = 7u32;
        // SAFETY: test-local variable name, no other thread reads it.
        unsafe { std::env::set_var("KREDO_TEST_BOGUS_NUMBER", "seven") };
        override_from_env("KREDO_TEST_BOGUS_NUMBER", &mut slot);
        assert_eq!(slot, 7);

        unsafe { std::env::set_var("KREDO_TEST_BOGUS_NUMBER", " 11 ") };
        override_from_env("KREDO_TEST_BOGUS_NUMBER", &mut slot);
        assert_eq!(slot, 11);
        unsafe { std::env::remove_var("KREDO_TEST_BOGUS_NUMBER") };
    }
}
