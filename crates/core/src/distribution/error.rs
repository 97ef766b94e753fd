//! Allocation validation errors

use leadflow_domain::LeadflowError;
use thiserror::Error;

/// Allocation rejected before producing a preview.
///
/// Always carries at least one message naming a violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("allocation rejected: {}", .messages.join("; "))]
pub struct AllocationError {
    messages: Vec<String>,
}

impl AllocationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { messages: vec![message.into()] }
    }

    /// `None` when there is nothing to report.
    pub fn from_messages(messages: Vec<String>) -> Option<Self> {
        if messages.is_empty() {
            None
        } else {
            Some(Self { messages })
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl From<AllocationError> for LeadflowError {
    fn from(err: AllocationError) -> Self {
        LeadflowError::validation(err.messages)
    }
}
