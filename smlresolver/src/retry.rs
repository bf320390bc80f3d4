//! Bounded retry with exponential backoff
//!
//! The policy itself is a pure decision function: given the attempt number
//! and its outcome it answers retry (after a delay), succeed or fail.
//! [`RetryPolicy::run`] drives an async operation with it.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Default number of attempts (first try included)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay after the first failed attempt
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// What to do after an attempt
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision<T, E> {
    /// Wait for the delay, then try again. Carries the error that caused it.
    Retry(Duration, E),
    Succeed(T),
    Fail(E),
}

/// Final error of a retried operation
#[derive(Debug)]
pub struct RetryFailure<E> {
    /// Attempts performed, the failing one included
    pub attempts: u32,
    pub error: E,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// A policy allowing `max_attempts` tries (at least one)
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    /// Decides the fate of attempt `attempt` given its outcome.
    ///
    /// Errors rejected by `is_retryable` fail immediately. No delay follows
    /// the last allowed attempt.
    pub fn decide<T, E>(
        &self,
        attempt: u32,
        outcome: Result<T, E>,
        is_retryable: impl Fn(&E) -> bool,
    ) -> RetryDecision<T, E> {
        match outcome {
            Ok(value) => RetryDecision::Succeed(value),
            Err(error) if attempt < self.max_attempts && is_retryable(&error) => {
                RetryDecision::Retry(self.delay_for(attempt), error)
            }
            Err(error) => RetryDecision::Fail(error),
        }
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts are exhausted. `op` receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut, R>(&self, mut op: F, is_retryable: R) -> Result<T, RetryFailure<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: Fn(&E) -> bool,
        E: Display,
    {
        let mut attempt = 1;
        loop {
            let outcome = op(attempt).await;
            match self.decide(attempt, outcome, &is_retryable) {
                RetryDecision::Succeed(value) => return Ok(value),
                RetryDecision::Retry(delay, error) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Attempt failed, retrying: {}",
                        error
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::Fail(error) => return Err(RetryFailure { attempts: attempt, error }),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY)
    }
}
