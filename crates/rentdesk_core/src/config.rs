//! Runtime configuration for store and session services.
//!
//! # Responsibility
//! - Hold per-operation simulated latency and the async call policy.
//! - Apply environment overrides with explicit validation.
//!
//! # Invariants
//! - `CallPolicy::read_attempts` is always at least 1.
//! - Configuration loading never panics; bad values surface as `ConfigError`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Environment variable scaling every latency, in percent (`0` disables latency).
pub const ENV_LATENCY_SCALE: &str = "RENTDESK_LATENCY_SCALE";
/// Environment variable overriding the per-call timeout in milliseconds.
pub const ENV_CALL_TIMEOUT_MS: &str = "RENTDESK_CALL_TIMEOUT_MS";
/// Environment variable overriding how many times reads are attempted.
pub const ENV_READ_ATTEMPTS: &str = "RENTDESK_READ_ATTEMPTS";

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_READ_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Value is not a non-negative integer.
    InvalidNumber { key: &'static str, value: String },
    /// Value parsed but is outside the accepted range.
    OutOfRange { key: &'static str, value: u64 },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer, got `{value}`")
            }
            Self::OutOfRange { key, value } => write!(f, "{key} value {value} is out of range"),
        }
    }
}

impl Error for ConfigError {}

/// Simulated network latency applied before each operation completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub list: Duration,
    pub get: Duration,
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
    pub login: Duration,
    pub logout: Duration,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            list: Duration::from_millis(500),
            get: Duration::from_millis(300),
            create: Duration::from_millis(800),
            update: Duration::from_millis(800),
            delete: Duration::from_millis(500),
            login: Duration::from_millis(1000),
            logout: Duration::from_millis(300),
        }
    }
}

impl LatencyProfile {
    /// Profile with no simulated latency, for tooling and tests.
    pub fn instant() -> Self {
        Self {
            list: Duration::ZERO,
            get: Duration::ZERO,
            create: Duration::ZERO,
            update: Duration::ZERO,
            delete: Duration::ZERO,
            login: Duration::ZERO,
            logout: Duration::ZERO,
        }
    }

    /// Returns a copy with every latency scaled by `percent / 100`.
    pub fn scaled(self, percent: u32) -> Self {
        let scale = |value: Duration| value * percent / 100;
        Self {
            list: scale(self.list),
            get: scale(self.get),
            create: scale(self.create),
            update: scale(self.update),
            delete: scale(self.delete),
            login: scale(self.login),
            logout: scale(self.logout),
        }
    }
}

/// Timeout and retry policy wrapped around every simulated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    /// Upper bound for one attempt, latency included.
    pub timeout: Duration,
    /// Attempts for idempotent reads (`list`, `get`). Writes run once.
    pub read_attempts: u32,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CALL_TIMEOUT,
            read_attempts: DEFAULT_READ_ATTEMPTS,
        }
    }
}

/// Top-level configuration for core services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoreConfig {
    pub latency: LatencyProfile,
    pub call_policy: CallPolicy,
}

impl CoreConfig {
    /// Configuration with no latency and the default call policy.
    pub fn instant() -> Self {
        Self {
            latency: LatencyProfile::instant(),
            call_policy: CallPolicy::default(),
        }
    }

    /// Builds configuration from process environment overrides.
    ///
    /// # Errors
    /// - Returns `ConfigError` when an override is not a valid number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(Self::default())
    }

    /// Applies process environment overrides on top of `base`.
    pub fn from_env_with(base: Self) -> Result<Self, ConfigError> {
        Self::from_lookup_with(base, |key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Missing keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup_with(Self::default(), lookup)
    }

    /// Applies lookup overrides on top of `base`.
    ///
    /// The latency scale multiplies the base latencies, so an instant base
    /// stays instant.
    pub fn from_lookup_with<F>(base: Self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = base;

        if let Some(percent) = parse_u64(&lookup, ENV_LATENCY_SCALE)? {
            let percent = u32::try_from(percent).map_err(|_| ConfigError::OutOfRange {
                key: ENV_LATENCY_SCALE,
                value: percent,
            })?;
            config.latency = config.latency.scaled(percent);
        }

        if let Some(timeout_ms) = parse_u64(&lookup, ENV_CALL_TIMEOUT_MS)? {
            if timeout_ms == 0 {
                return Err(ConfigError::OutOfRange {
                    key: ENV_CALL_TIMEOUT_MS,
                    value: timeout_ms,
                });
            }
            config.call_policy.timeout = Duration::from_millis(timeout_ms);
        }

        if let Some(attempts) = parse_u64(&lookup, ENV_READ_ATTEMPTS)? {
            config.call_policy.read_attempts = u32::try_from(attempts)
                .ok()
                .filter(|attempts| *attempts >= 1)
                .ok_or(ConfigError::OutOfRange {
                    key: ENV_READ_ATTEMPTS,
                    value: attempts,
                })?;
        }

        Ok(config)
    }
}

fn parse_u64<F>(lookup: &F, key: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidNumber { key, value: raw })
}
