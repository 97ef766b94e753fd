//! Scheduler error types

use std::time::Duration;

use leadflow_domain::LeadflowError;
use thiserror::Error;
use tokio::task::JoinError;
use tokio::time::error::Elapsed;

use crate::errors::InfraError;

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Scheduler is already running
    #[error("Scheduler already running")]
    AlreadyRunning,

    /// Scheduler is not running
    #[error("Scheduler not running")]
    NotRunning,

    /// Operation timed out
    #[error("Operation timed out after {duration:?}")]
    Timeout {
        duration: Duration,
        #[source]
        source: Elapsed,
    },

    /// A store call failed
    #[error("Repository operation '{operation}' failed: {source}")]
    Repository {
        operation: &'static str,
        #[source]
        source: LeadflowError,
    },

    /// Task join failed
    #[error("Task join failed: {0}")]
    TaskJoinFailed(#[from] JoinError),

    /// Escalation write kept failing
    #[error("Escalation of lead {lead_id} failed after {attempts} attempts: {source}")]
    RetryExhausted {
        lead_id: String,
        attempts: u32,
        #[source]
        source: LeadflowError,
    },
}

impl From<SchedulerError> for InfraError {
    fn from(err: SchedulerError) -> Self {
        let leadflow_err = match err {
            SchedulerError::AlreadyRunning | SchedulerError::NotRunning => {
                LeadflowError::Conflict(err.to_string())
            }
            SchedulerError::Timeout { .. } => LeadflowError::TransientStore(err.to_string()),
            SchedulerError::Repository { source, .. } => source,
            SchedulerError::RetryExhausted { .. } => {
                LeadflowError::TransientStore(err.to_string())
            }
            SchedulerError::TaskJoinFailed(_) => LeadflowError::Internal(err.to_string()),
        };
        InfraError(leadflow_err)
    }
}

impl From<SchedulerError> for LeadflowError {
    fn from(err: SchedulerError) -> Self {
        InfraError::from(err).into()
    }
}

/// Convenience type alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
