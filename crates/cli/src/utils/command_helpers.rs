//! Command execution helpers
//!
//! Times each command and logs its outcome so the handlers stay focused on
//! the work itself.

use std::future::Future;
use std::time::Instant;

use leadflow_domain::{LeadflowError, Result as DomainResult};
use serde::Serialize;
use serde_json::Value;

use crate::utils::logging::log_command_execution;

/// Run `command_fn`, log its outcome and duration, and serialize the result.
pub async fn execute_logged<F, Fut, T>(command_name: &str, command_fn: F) -> DomainResult<Value>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
    T: Serialize,
{
    let start = Instant::now();

    let result = command_fn().await.and_then(|value| to_json(&value));

    log_command_execution(command_name, start.elapsed(), result.as_ref().err());
    result
}

pub fn to_json<T: Serialize>(value: &T) -> DomainResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| LeadflowError::Internal(format!("failed to serialize output: {e}")))
}
