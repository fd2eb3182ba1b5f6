//! # Conflict Retry
//!
//! Re-runs a stock transaction when it lost a race for a lock.
//!
//! Only [`DbError::is_retryable`] errors are retried; insufficient stock,
//! validation and not-found failures return immediately. Each retry starts
//! from scratch: locks are re-acquired and stock is re-read.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};

/// Each delay is spread over `[d * 0.5, d * 1.5]`.
const JITTER: f64 = 0.5;

/// Retry and lock-wait settings for stock mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// How long one stock lock acquisition may wait.
    pub lock_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
            lock_timeout: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Delay schedule for one call to [`with_conflict_retry`]: starts at
    /// `base_delay`, doubles, caps at `max_delay`, jittered.
    fn backoff(&self) -> ExponentialBackoff {
        let mut backoff = ExponentialBackoff {
            current_interval: self.base_delay,
            initial_interval: self.base_delay,
            max_interval: self.max_delay,
            randomization_factor: JITTER,
            multiplier: 2.0,
            max_elapsed_time: None, // attempts are capped instead
            ..Default::default()
        };
        backoff.reset();
        backoff
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// `policy.max_attempts` is reached.
///
/// The last retryable failure is surfaced as [`DbError::Conflict`].
pub async fn with_conflict_retry<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    let mut attempt = 0;
    let mut backoff = policy.backoff();

    loop {
        attempt += 1;

        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = operation_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if err.is_retryable() => {
                if attempt >= policy.max_attempts {
                    warn!(
                        operation = operation_name,
                        attempts = attempt,
                        error = %err,
                        "Giving up after repeated conflicts"
                    );
                    return Err(match err {
                        DbError::Conflict(msg) => DbError::Conflict(msg),
                        other => DbError::Conflict(other.to_string()),
                    });
                }

                let delay = backoff.next_backoff().unwrap_or(policy.max_delay);
                warn!(
                    operation = operation_name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Conflict, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
