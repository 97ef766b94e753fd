//! Modular common utilities shared across Leadflow crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - (always on): error classification
//! - `runtime`: async retry with backoff (tokio + tracing)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
pub mod error;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use error::{ErrorClassification, ErrorSeverity};
#[cfg(feature = "runtime")]
pub use resilience::{
    retry_classified, BackoffStrategy, ClassifiedRetry, RetryConfig, RetryDecision, RetryError,
    RetryExecutor, RetryOutcome, RetryPolicy,
};
