//! Validator configuration
//!
//! Defaults suit a local archive; `from_env` lets deployments tune retrieval
//! behaviour without code changes.

use std::time::Duration;

use crate::infra::{RetryConfig, ValidationError};

/// Default per-request timeout for a single party retrieval
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Default upper bound on the number of ages in one range validation
pub const DEFAULT_MAX_RANGE_LEN: u64 = 10_000;

/// Largest range bound accepted from the environment
pub const MAX_RANGE_LEN_LIMIT: u64 = 1_000_000;

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorConfig {
    /// A party that does not answer within this window is treated as absent
    pub fetch_timeout: Duration,
    /// Maximum number of ages a single range validation may cover
    pub max_range_len: u64,
    /// Backoff policy for transport failures
    pub retry: RetryConfig,
    /// Treat transport failures that outlast the retry budget as absence
    /// instead of aborting the call
    pub transport_failure_as_absent: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_range_len: DEFAULT_MAX_RANGE_LEN,
            retry: RetryConfig::default(),
            transport_failure_as_absent: false,
        }
    }
}

impl ValidatorConfig {
    /// Load from `LEDGER_VALIDATOR_*` environment variables, falling back to
    /// defaults for unset ones.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = parse_var::<u64>(&lookup, "LEDGER_VALIDATOR_FETCH_TIMEOUT_MS")? {
            if ms == 0 {
                return Err(ValidationError::Configuration(
                    "LEDGER_VALIDATOR_FETCH_TIMEOUT_MS must be positive".into(),
                ));
            }
            config.fetch_timeout = Duration::from_millis(ms);
        }

        if let Some(max) = parse_var::<u64>(&lookup, "LEDGER_VALIDATOR_MAX_RANGE")? {
            if max == 0 || max > MAX_RANGE_LEN_LIMIT {
                return Err(ValidationError::Configuration(format!(
                    "LEDGER_VALIDATOR_MAX_RANGE must be between 1 and {MAX_RANGE_LEN_LIMIT}"
                )));
            }
            config.max_range_len = max;
        }

        if let Some(retries) = parse_var::<u32>(&lookup, "LEDGER_VALIDATOR_MAX_RETRIES")? {
            config.retry = config.retry.with_max_retries(retries);
        }

        if let Some(flag) = lookup("LEDGER_VALIDATOR_TRANSPORT_AS_ABSENT") {
            config.transport_failure_as_absent = parse_bool(&flag).ok_or_else(|| {
                ValidationError::Configuration(format!(
                    "LEDGER_VALIDATOR_TRANSPORT_AS_ABSENT: expected true/false, got {flag:?}"
                ))
            })?;
        }

        Ok(config)
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_max_range_len(mut self, max: u64) -> Self {
        self.max_range_len = max;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_transport_failure_as_absent(mut self, enabled: bool) -> Self {
        self.transport_failure_as_absent = enabled;
        self
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ValidationError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            ValidationError::Configuration(format!("{key}: invalid value {raw:?}"))
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
