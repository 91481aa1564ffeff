//! Bounded exponential backoff for fallible async operations
//!
//! Only errors that classify themselves as transient are retried. Anything
//! else is returned immediately as [`RetryError::Permanent`].

use crate::config::RetryConfig;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Classifies an error as worth retrying (timeouts, connection failures)
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Attempt budget and delay schedule for [`retry`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            backoff_factor: 2.0,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            backoff_factor: config.backoff_factor,
        }
    }
}

impl RetryPolicy {
    /// Delay slept before retry number `retry` (1-based)
    ///
    /// `initial_delay * backoff_factor^(retry - 1)`, saturating at `Duration::MAX`.
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
        let seconds = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    }
}

/// Terminal outcome of a retried operation
#[derive(Debug, Error)]
pub enum RetryError<E: std::error::Error + 'static> {
    /// Every attempt failed with a transient error
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: E,
    },

    /// A non-transient error; no retry was attempted after it
    #[error(transparent)]
    Permanent(E),
}

impl<E: std::error::Error + 'static> RetryError<E> {
    /// Returns the underlying error of the last attempt
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Permanent(e) => e,
        }
    }
}

/// Runs `operation` until it succeeds, fails permanently, or the attempt
/// budget is spent
///
/// The delay is applied before each retry, never after the final attempt.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + std::error::Error + 'static,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => return Err(RetryError::Permanent(e)),
            Err(e) if attempt >= max_attempts => {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: e,
                })
            }
            Err(e) => {
                let delay = policy.delay_before_retry(attempt);
                tracing::debug!(
                    "Attempt {}/{} failed: {}; retrying in {:?}",
                    attempt,
                    max_attempts,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
