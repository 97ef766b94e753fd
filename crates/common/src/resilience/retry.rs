//! Bounded retry with backoff.
//!
//! The executor runs an async operation until it succeeds, the policy says
//! stop, or `max_attempts` is reached. Every outcome reports how many attempts
//! were made and the last error seen, so callers can surface a
//! retry-exhausted condition instead of dropping the failure.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::error::ErrorClassification;

/// Errors that can occur during retry operations
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// All retry attempts have been exhausted
    #[error("All retry attempts exhausted after {attempts} tries: {last:?}")]
    AttemptsExhausted { attempts: u32, last: E },

    /// The operation failed with a non-retryable error
    #[error("Operation failed with non-retryable error: {source:?}")]
    NonRetryable { source: E },

    /// The retry configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Outcome of a retry execution including result and summary statistics.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, RetryError<E>>,
    pub attempts: u32,
    pub total_delay: Duration,
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry with the configured backoff delay
    Retry,
    /// Retry after a specific delay
    RetryAfter(Duration),
    /// Give up
    Stop,
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Retries exactly the errors that classify themselves as retryable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifiedRetry;

impl<E: ErrorClassification> RetryPolicy<E> for ClassifiedRetry {
    fn should_retry(&self, error: &E, _attempt: u32) -> RetryDecision {
        if !error.is_retryable() {
            return RetryDecision::Stop;
        }
        match error.retry_after() {
            Some(delay) => RetryDecision::RetryAfter(delay),
            None => RetryDecision::Retry,
        }
    }
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Exponential backoff: initial_delay * base^attempt, capped at max_delay
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
}

impl BackoffStrategy {
    /// Delay before the retry that follows `attempt` (0-based).
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Exponential { initial_delay, base, max_delay } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let delay_ms = initial_delay.as_millis() as f64 * base.powi(exponent);
                let capped = delay_ms.min(max_delay.as_millis() as f64);
                Duration::from_millis(capped as u64)
            }
        }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    pub backoff: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: BackoffStrategy::Exponential {
                initial_delay: Duration::from_millis(200),
                base: 2.0,
                max_delay: Duration::from_secs(30),
            },
        }
    }
}

impl RetryConfig {
    /// Exponential backoff doubling from `initial_delay` up to `max_delay`.
    pub fn exponential(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: BackoffStrategy::Exponential { initial_delay, base: 2.0, max_delay },
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RetryError<()>> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }
        if let BackoffStrategy::Exponential { base, .. } = &self.backoff {
            if *base <= 0.0 {
                return Err(RetryError::InvalidConfiguration {
                    message: "exponential base must be greater than 0".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// The main retry executor
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// Execute an operation with retry logic and return outcome statistics.
    #[instrument(skip(self, operation), fields(max_attempts = self.config.max_attempts))]
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> RetryOutcome<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Err(RetryError::InvalidConfiguration { message }) = self.config.validate() {
            return RetryOutcome {
                result: Err(RetryError::InvalidConfiguration { message }),
                attempts: 0,
                total_delay: Duration::ZERO,
            };
        }

        let max_attempts = self.config.max_attempts;
        let mut total_delay = Duration::ZERO;
        let mut attempt: u32 = 0;

        loop {
            let attempt_number = attempt + 1;
            debug!(attempt = attempt_number, max_attempts, "Executing operation");

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "Operation succeeded after retries");
                    }
                    return RetryOutcome { result: Ok(value), attempts: attempt_number, total_delay };
                }
                Err(error) => error,
            };

            let delay = match self.policy.should_retry(&error, attempt) {
                RetryDecision::Stop => {
                    debug!(error = ?error, "Retry policy determined not to retry");
                    return RetryOutcome {
                        result: Err(RetryError::NonRetryable { source: error }),
                        attempts: attempt_number,
                        total_delay,
                    };
                }
                RetryDecision::Retry => self.config.backoff.calculate_delay(attempt),
                RetryDecision::RetryAfter(delay) => delay,
            };

            if attempt_number >= max_attempts {
                warn!(attempts = attempt_number, error = ?error, "All retry attempts exhausted");
                return RetryOutcome {
                    result: Err(RetryError::AttemptsExhausted {
                        attempts: attempt_number,
                        last: error,
                    }),
                    attempts: attempt_number,
                    total_delay,
                };
            }

            warn!(attempt = attempt_number, ?delay, error = ?error, "Operation failed, retrying");
            tokio::time::sleep(delay).await;
            total_delay += delay;
            attempt += 1;
        }
    }
}

/// Retry `operation` under `config`, retrying only retryable errors.
pub async fn retry_classified<F, Fut, T, E>(config: &RetryConfig, operation: F) -> RetryOutcome<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: ErrorClassification + fmt::Debug,
{
    RetryExecutor::new(config.clone(), ClassifiedRetry).execute(operation).await
}
