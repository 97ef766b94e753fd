//! Error classification shared by every Leadflow error type.
//!
//! Errors across the workspace implement [`ErrorClassification`] so retry
//! loops and operator surfaces can make the same decisions without matching
//! on concrete variants:
//!
//! - **`is_retryable()`**: transient store failures are retried by the
//!   escalation scheduler; validation and conflict outcomes never are.
//! - **`severity()`**: drives log level selection.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use leadflow_common::error::{ErrorClassification, ErrorSeverity};
//!
//! #[derive(Debug)]
//! enum StoreError {
//!     Busy,
//!     Corrupt,
//! }
//!
//! impl ErrorClassification for StoreError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, Self::Busy)
//!     }
//!
//!     fn severity(&self) -> ErrorSeverity {
//!         match self {
//!             Self::Busy => ErrorSeverity::Warning,
//!             Self::Corrupt => ErrorSeverity::Critical,
//!         }
//!     }
//! }
//!
//! assert!(StoreError::Busy.is_retryable());
//! assert!(StoreError::Corrupt.is_critical());
//! assert_eq!(StoreError::Busy.retry_after(), None::<Duration>);
//! ```

use std::fmt;
use std::time::Duration;

/// Standard interface for classifying errors by their characteristics.
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient: store unavailability, lock contention,
    /// busy databases. Input problems are never retryable.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Suggested retry delay, when the error carries one.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, expected conditions (lost claim race, unknown id)
    Info,
    /// Degraded but operational (transient store failure)
    Warning,
    /// Failure requiring attention
    Error,
    /// System integrity at risk
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
