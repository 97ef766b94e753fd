//! Error types used throughout the engine

use leadflow_common::{ErrorClassification, ErrorSeverity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Leadflow
///
/// `Clone` so a single store failure can be handed to every caller sharing a
/// coalesced claim request.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum LeadflowError {
    /// Input rejected before any state mutation
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Store unreachable, busy or timed out
    #[error("Transient store error: {0}")]
    TransientStore(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LeadflowError {
    /// Stable label used in logs, JSON responses and exit code mapping.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Conflict(_) => "conflict",
            Self::NotFound(_) => "not_found",
            Self::TransientStore(_) => "transient_store",
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// Join several violated constraints into one validation error.
    pub fn validation<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let joined: Vec<String> = messages.into_iter().map(Into::into).collect();
        Self::Validation(joined.join("; "))
    }
}

impl ErrorClassification for LeadflowError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStore(_) | Self::Database(_))
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Validation(_) | Self::Conflict(_) | Self::NotFound(_) => ErrorSeverity::Info,
            Self::TransientStore(_) => ErrorSeverity::Warning,
            Self::Database(_) | Self::Config(_) => ErrorSeverity::Error,
            Self::Internal(_) => ErrorSeverity::Critical,
        }
    }
}

/// Result type alias for Leadflow operations
pub type Result<T> = std::result::Result<T, LeadflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_store_failures_are_retryable() {
        assert!(LeadflowError::TransientStore("busy".into()).is_retryable());
        assert!(LeadflowError::Database("locked".into()).is_retryable());
        assert!(!LeadflowError::NotFound("lead-1".into()).is_retryable());
        assert!(!LeadflowError::Validation("bad".into()).is_retryable());
        assert!(!LeadflowError::Conflict("taken".into()).is_retryable());
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(LeadflowError::Validation(String::new()).label(), "validation_error");
        assert_eq!(LeadflowError::Conflict(String::new()).label(), "conflict");
        assert_eq!(LeadflowError::NotFound(String::new()).label(), "not_found");
        assert_eq!(LeadflowError::TransientStore(String::new()).label(), "transient_store");
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(LeadflowError::NotFound("lead-9".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "NotFound", "message": "lead-9" }));
    }

    #[test]
    fn validation_joins_messages() {
        let err = LeadflowError::validation(["first", "second"]);
        assert_eq!(err, LeadflowError::Validation("first; second".into()));
    }
}
