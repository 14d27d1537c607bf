//! Retry policy and the retry loop for page reads.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::Error;

/// Configuration for automatic retry behavior.
///
/// Every failed attempt waits before the next one; the wait starts at
/// `initial_delay` and is multiplied by `multiplier` after each failure.
/// Authentication failures and cancellation are never retried.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use openair_lib::retry::RetryConfig;
///
/// let config = RetryConfig::default().initial_delay(Duration::from_millis(50));
/// assert_eq!(config.max_attempts, 8);
/// assert_eq!(config.delay_after(3), Duration::from_millis(200));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub initial_delay: Duration,
    /// Factor applied to the delay after each failure.
    pub multiplier: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            initial_delay: Duration::from_millis(100),
            multiplier: 2,
        }
    }
}

impl RetryConfig {
    /// Sets the total number of attempts.
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Sets the delay after the first failed attempt.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    pub fn multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Returns the wait after the given number of failed attempts (1-based).
    pub fn delay_after(&self, failures: u32) -> Duration {
        let factor = self
            .multiplier
            .checked_pow(failures.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }
}

/// Runs `op` until it succeeds or the policy gives up.
///
/// `op` receives the 1-based attempt number. Errors that are not retryable
/// are returned as they are; running out of attempts yields
/// [`Error::RetryExhausted`] wrapping the last attempt's error. Cancellation
/// interrupts both the attempt in flight and the backoff wait.
pub async fn retry<T, F, Fut>(
    config: &RetryConfig,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, Error>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = op(attempt) => result,
        };

        let err = match result {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) => err,
        };

        if attempt >= max_attempts {
            return Err(Error::RetryExhausted {
                attempts: attempt,
                source: Box::new(err),
            });
        }

        let delay = config.delay_after(attempt);
        warn!(attempt, ?delay, error = %err, "request failed, retrying");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
        attempt += 1;
    }
}
