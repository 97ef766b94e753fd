//! Leadflow - lead distribution and claim coordination
//!
//! Exit codes: 0 success, 2 validation error, 3 conflict, 4 not found,
//! 5 transient store failure, 1 anything else.

use std::process::ExitCode;

use clap::Parser;
use leadflow_cli::utils::logging::{exit_code, init_tracing};
use leadflow_cli::Cli;
use leadflow_domain::LeadflowError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_json) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    match leadflow_cli::run(cli).await {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(rendered) => {
                println!("{rendered}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("failed to render output: {e}");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            let (label, code) = match err.downcast_ref::<LeadflowError>() {
                Some(domain) => (domain.label(), exit_code(domain)),
                None => ("internal", 1),
            };
            let report = serde_json::json!({ "error": label, "message": format!("{err:#}") });
            eprintln!("{report}");
            ExitCode::from(code)
        }
    }
}
