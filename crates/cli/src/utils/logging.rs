use std::time::Duration;

use leadflow_common::{ErrorClassification, ErrorSeverity};
use leadflow_domain::LeadflowError;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the `info` default.
///
/// Logs go to stderr so stdout stays clean for command output.
pub fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

/// Log the outcome of a command execution with structured fields.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error: Option<&LeadflowError>) {
    let duration_ms = elapsed.as_millis() as u64;

    match error {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(err) => match err.severity() {
            ErrorSeverity::Error | ErrorSeverity::Critical => {
                error!(command, duration_ms, error_type = err.label(), error = %err, "command_execution_failure")
            }
            _ => {
                warn!(command, duration_ms, error_type = err.label(), error = %err, "command_execution_failure")
            }
        },
    }
}

/// Process exit code for a failed command.
pub fn exit_code(error: &LeadflowError) -> u8 {
    match error.label() {
        "validation_error" => 2,
        "conflict" => 3,
        "not_found" => 4,
        "transient_store" => 5,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_labels() {
        assert_eq!(exit_code(&LeadflowError::Validation("x".into())), 2);
        assert_eq!(exit_code(&LeadflowError::Conflict("x".into())), 3);
        assert_eq!(exit_code(&LeadflowError::NotFound("x".into())), 4);
        assert_eq!(exit_code(&LeadflowError::TransientStore("x".into())), 5);
        assert_eq!(exit_code(&LeadflowError::Database("x".into())), 1);
        assert_eq!(exit_code(&LeadflowError::Internal("x".into())), 1);
    }
}
