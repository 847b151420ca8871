//! Retry with exponential backoff for calls to the platform services.
//!
//! Every HTTP client in this crate funnels its requests through
//! [`with_retry_if`] using [`ClientError::is_retryable`](crate::ClientError::is_retryable)
//! as the predicate, so a flaky directory or file store answers a request a
//! couple of times before the gateway gives up on it.
//!
//! ```rust,no_run
//! use gateway_clients::retry::{with_retry, RetryConfig};
//! use std::time::Duration;
//!
//! async fn example() -> Result<u32, String> {
//!     let config = RetryConfig {
//!         max_attempts: 3,
//!         initial_delay: Duration::from_millis(100),
//!         max_delay: Duration::from_secs(2),
//!         exponential_base: 2.0,
//!     };
//!
//!     with_retry(&config, || async { Ok(7) }).await
//! }
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Backoff policy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, the first one included.
    pub max_attempts: u32,

    /// Delay before the first retry.
    pub initial_delay: Duration,

    /// Upper bound for any single delay.
    pub max_delay: Duration,

    /// Growth factor applied to the delay after each failure.
    pub exponential_base: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            exponential_base: 2.0,
        }
    }
}

impl RetryConfig {
    /// Short delays, used by tests against local mock servers.
    pub fn fast() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            exponential_base: 2.0,
        }
    }

    /// The default policy.
    pub fn standard() -> Self {
        Self::default()
    }

    /// A single attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            exponential_base: 1.0,
        }
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        Duration::from_secs_f64(
            (delay.as_secs_f64() * self.exponential_base).min(self.max_delay.as_secs_f64()),
        )
    }
}

/// Run `f` until it succeeds or `max_attempts` is reached.
///
/// Every error is considered transient.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
{
    with_retry_if(config, f, |_| true).await
}

/// Run `f` until it succeeds, fails with an error `is_retryable` rejects, or
/// `max_attempts` is reached.
///
/// # Arguments
///
/// * `config` - Backoff policy
/// * `f` - Produces a fresh future for each attempt
/// * `is_retryable` - Decides whether an error warrants another attempt
///
/// # Returns
///
/// The first success, or the last error seen.
pub async fn with_retry_if<F, Fut, T, E, P>(
    config: &RetryConfig,
    mut f: F,
    mut is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
    P: FnMut(&E) -> bool,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;

        match f().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Platform call succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if !is_retryable(&e) => {
                tracing::debug!(error = ?e, "Platform call failed permanently");
                return Err(e);
            }
            Err(e) if attempt >= config.max_attempts => {
                tracing::error!(attempts = attempt, error = ?e, "Platform call retries exhausted");
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(
                    attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = ?e,
                    "Platform call failed, retrying"
                );
                sleep(delay).await;
                delay = config.next_delay(delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counting<T: Clone, E: Clone>(
        counter: Arc<AtomicU32>,
        fail_until: u32,
        ok: T,
        err: E,
    ) -> impl FnMut() -> std::future::Ready<Result<T, E>> {
        move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n < fail_until {
                std::future::ready(Err(err.clone()))
            } else {
                std::future::ready(Ok(ok.clone()))
            }
        }
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = RetryConfig {
            max_attempts: 5,
            initial_delay: Duration::from_millis(400),
            max_delay: Duration::from_millis(500),
            exponential_base: 2.0,
        };
        assert_eq!(
            config.next_delay(Duration::from_millis(400)),
            Duration::from_millis(500)
        );
        assert_eq!(
            config.next_delay(Duration::from_millis(100)),
            Duration::from_millis(200)
        );
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let counter = Arc::new(AtomicU32::new(0));
        let result = with_retry(
            &RetryConfig::fast(),
            counting(counter.clone(), 0, 42, "boom"),
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_after_transient_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let result = with_retry(
            &RetryConfig::fast(),
            counting(counter.clone(), 2, 42, "boom"),
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_attempts_exhausted() {
        let counter = Arc::new(AtomicU32::new(0));
        let config = RetryConfig {
            max_attempts: 2,
            ..RetryConfig::fast()
        };
        let result = with_retry(&config, counting(counter.clone(), 10, 42, "boom")).await;

        assert_eq!(result, Err("boom"));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let result = with_retry_if(
            &RetryConfig::fast(),
            counting(counter.clone(), 10, 42, "forbidden"),
            |_| false,
        )
        .await;

        assert_eq!(result, Err("forbidden"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
