//! Retry with exponential backoff and jitter for proof retrieval
//!
//! Transport failures talking to either party are retried a bounded number
//! of times before the engine gives up on the call.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries, just the initial attempt)
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries (caps exponential growth)
    pub max_delay: Duration,
    /// Multiplier for exponential backoff (e.g., 2.0 = double each time)
    pub multiplier: f64,
    /// Jitter factor (0.0-1.0); delay varies by up to this fraction either way
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: 0.5,
        }
    }
}

impl RetryConfig {
    /// Create a config for fast retries (in-process sources, tests)
    pub fn fast() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(500),
            multiplier: 2.0,
            jitter: 0.3,
        }
    }

    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::fast()
        }
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    /// Set the initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the jitter factor
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Calculate delay for a given attempt (0-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay.as_secs_f64());

        let final_delay = if self.jitter > 0.0 {
            let jitter_range = capped_delay * self.jitter;
            let mut rng = rand::thread_rng();
            let jitter_offset = rng.gen_range(-jitter_range..=jitter_range);
            (capped_delay + jitter_offset).max(0.0)
        } else {
            capped_delay
        };

        Duration::from_secs_f64(final_delay)
    }
}

/// Result of a retry operation
#[derive(Debug)]
pub struct RetryResult<T, E> {
    /// The final result (success or last error)
    pub result: Result<T, E>,
    /// Number of attempts made (1 = succeeded on first try)
    pub attempts: u32,
}

impl<T, E> RetryResult<T, E> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// A retry executor that can run operations with retry logic
#[derive(Debug, Clone)]
pub struct Retry {
    config: RetryConfig,
}

impl Retry {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run an operation, retrying only errors accepted by `should_retry`
    pub async fn run_with_predicate<F, Fut, T, E, P>(
        &self,
        context: &str,
        operation: F,
        should_retry: P,
    ) -> RetryResult<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match operation().await {
                Ok(value) => {
                    if attempts > 1 {
                        tracing::debug!(context, attempts, "Operation succeeded after retries");
                    }
                    return RetryResult {
                        result: Ok(value),
                        attempts,
                    };
                }
                Err(e) => {
                    if attempts > self.config.max_retries || !should_retry(&e) {
                        return RetryResult {
                            result: Err(e),
                            attempts,
                        };
                    }

                    let delay = self.config.delay_for_attempt(attempts - 1);

                    tracing::warn!(
                        context,
                        attempt = attempts,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Operation failed, will retry"
                    );

                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_delay_grows_and_caps() {
        let config = RetryConfig::default()
            .with_jitter(0.0)
            .with_initial_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(250));

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(250));
        assert_eq!(config.delay_for_attempt(8), Duration::from_millis(250));
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let config = RetryConfig::default()
            .with_jitter(0.5)
            .with_initial_delay(Duration::from_millis(100));

        for _ in 0..50 {
            let delay = config.delay_for_attempt(0);
            assert!(delay >= Duration::from_millis(50));
            assert!(delay <= Duration::from_millis(150));
        }
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_failures() {
        let attempt_count = Arc::new(AtomicU32::new(0));
        let retry = Retry::new(RetryConfig::fast().with_max_retries(5));

        let count = attempt_count.clone();
        let result = retry
            .run_with_predicate(
                "test",
                || {
                    let count = count.clone();
                    async move {
                        if count.fetch_add(1, Ordering::SeqCst) < 2 {
                            Err("not yet")
                        } else {
                            Ok(42)
                        }
                    }
                },
                |_| true,
            )
            .await;

        assert!(result.is_success());
        assert_eq!(result.attempts, 3);
        assert_eq!(result.into_result().unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retry_exhausts_budget() {
        let retry = Retry::new(RetryConfig::fast().with_max_retries(2));

        let result = retry
            .run_with_predicate("test", || async { Err::<i32, _>("always fails") }, |_| true)
            .await;

        assert!(!result.is_success());
        assert_eq!(result.attempts, 3); // Initial + 2 retries
    }

    #[tokio::test]
    async fn test_predicate_stops_on_fatal_error() {
        let retry = Retry::new(RetryConfig::fast().with_max_retries(5));

        let result = retry
            .run_with_predicate("test", || async { Err::<i32, _>("fatal") }, |e| *e != "fatal")
            .await;

        assert_eq!(result.attempts, 1);
        assert_eq!(result.into_result().unwrap_err(), "fatal");
    }
}
