//! Resilience patterns for transient failures.
//!
//! - **Backoff**: fixed or exponential delay schedules
//! - **Retry**: bounded retry executor driven by a [`RetryPolicy`]
//!
//! The escalation scheduler uses [`retry_classified`] so that only errors
//! reporting themselves as retryable (see
//! [`crate::error::ErrorClassification`]) are attempted again.

pub mod retry;

// Re-export retry types
pub use retry::{
    retry_classified, BackoffStrategy, ClassifiedRetry, RetryConfig, RetryDecision, RetryError,
    RetryExecutor, RetryOutcome, RetryPolicy,
};
