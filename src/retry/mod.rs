//! Fixed-backoff retry for provider rate limiting.
//!
//! Only errors that report [`RateLimitSignal::is_rate_limited`] are retried.
//! Each retry re-issues the identical call after sleeping [`RetryPolicy::backoff`].
//! The loop is iterative, so an unbounded policy does not grow the stack.
//! The sleep goes through a [`Sleeper`] so tests can observe delays without
//! waiting on a real clock.


use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::constants::DEFAULT_RATE_LIMIT_BACKOFF;

/// Errors that can signal a provider-side rate limit (HTTP 429).
pub trait RateLimitSignal {
    fn is_rate_limited(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between a rate-limited attempt and its retry.
    pub backoff: Duration,
    /// Total attempts allowed, including the first. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: DEFAULT_RATE_LIMIT_BACKOFF,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(backoff: Duration) -> Self {
        Self {
            backoff,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_attempts.is_none()
    }

    fn allows_attempt(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt <= max)
    }
}

#[async_trait]
/// Source of delays for the retry loop.
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested delays and returns immediately.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: parking_lot::Mutex<Vec<Duration>>,
}

#[cfg(any(test, feature = "mock"))]
impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().clone()
    }

    pub fn total(&self) -> Duration {
        self.delays.lock().iter().sum()
    }
}

#[cfg(any(test, feature = "mock"))]
#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().push(duration);
    }
}

/// Runs `operation` until it succeeds, fails with a non-rate-limit error, or
/// the policy runs out of attempts.
///
/// When attempts are exhausted the last rate-limit error is returned.
pub async fn retry_on_rate_limit<T, E, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    label: &str,
    mut operation: F,
) -> Result<T, E>
where
    E: RateLimitSignal + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt: u32 = 1;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = label, attempt, "Succeeded after rate-limit retry");
                }
                return Ok(value);
            }
            Err(err) if err.is_rate_limited() => {
                let next = attempt.saturating_add(1);
                if !policy.allows_attempt(next) {
                    warn!(
                        operation = label,
                        attempt,
                        error = %err,
                        "Rate-limit retries exhausted"
                    );
                    return Err(err);
                }

                warn!(
                    operation = label,
                    attempt,
                    backoff_ms = policy.backoff.as_millis() as u64,
                    "Rate limited, backing off before retry"
                );
                sleeper.sleep(policy.backoff).await;
                attempt = next;
            }
            Err(err) => return Err(err),
        }
    }
}
