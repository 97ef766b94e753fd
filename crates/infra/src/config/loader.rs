//! Configuration loader
//!
//! Loads engine configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! Required:
//! - `LEADFLOW_DB_PATH`: Database file path
//! - `LEADFLOW_QUEUE_TIMEOUT_MINUTES`: Escalation delay in minutes
//!
//! Optional (section defaults apply when unset):
//! - `LEADFLOW_DB_POOL_SIZE`: Connection pool size
//! - `LEADFLOW_QUEUE_SWEEP_INTERVAL`: Sweep interval in seconds
//! - `LEADFLOW_QUEUE_POOL`: Pool watched by the scheduler
//! - `LEADFLOW_QUEUE_MAX_ATTEMPTS`: Escalation write attempts
//! - `LEADFLOW_QUEUE_INITIAL_BACKOFF_MS` / `LEADFLOW_QUEUE_MAX_BACKOFF_MS`
//! - `LEADFLOW_QUEUE_STORE_TIMEOUT_MS`: Scheduler store call timeout
//! - `LEADFLOW_SLA_LOW_DAYS` / `LEADFLOW_SLA_MID_DAYS`: Staleness thresholds
//! - `LEADFLOW_SLA_TICKET_WARNING_HOURS`: Ticket warning window
//! - `LEADFLOW_CLAIM_STORE_TIMEOUT_MS`: Claim compare-and-set timeout
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./leadflow.toml` or `./leadflow.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names in the parent and grandparent directory
//! 4. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use leadflow_domain::{
    ClaimConfig, Config, DatabaseConfig, LeadflowError, QueueConfig, Result, SlaConfig,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["leadflow.toml", "leadflow.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `LeadflowError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded values fail validation
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `LeadflowError::Config` if required variables are missing
/// or any variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let defaults = Config::default();

    let database = DatabaseConfig {
        path: env_var("LEADFLOW_DB_PATH")?,
        pool_size: env_parse("LEADFLOW_DB_POOL_SIZE", defaults.database.pool_size)?,
    };

    let timeout_minutes = env_var("LEADFLOW_QUEUE_TIMEOUT_MINUTES").and_then(|s| {
        s.trim()
            .parse::<u32>()
            .map_err(|e| LeadflowError::Config(format!("Invalid queue timeout: {e}")))
    })?;
    let queue = QueueConfig {
        timeout_minutes,
        sweep_interval_seconds: env_parse(
            "LEADFLOW_QUEUE_SWEEP_INTERVAL",
            defaults.queue.sweep_interval_seconds,
        )?,
        pool: std::env::var("LEADFLOW_QUEUE_POOL").ok().filter(|pool| !pool.trim().is_empty()),
        max_escalation_attempts: env_parse(
            "LEADFLOW_QUEUE_MAX_ATTEMPTS",
            defaults.queue.max_escalation_attempts,
        )?,
        initial_backoff_ms: env_parse(
            "LEADFLOW_QUEUE_INITIAL_BACKOFF_MS",
            defaults.queue.initial_backoff_ms,
        )?,
        max_backoff_ms: env_parse("LEADFLOW_QUEUE_MAX_BACKOFF_MS", defaults.queue.max_backoff_ms)?,
        store_timeout_ms: env_parse(
            "LEADFLOW_QUEUE_STORE_TIMEOUT_MS",
            defaults.queue.store_timeout_ms,
        )?,
    };

    let sla = SlaConfig {
        stale_low_days: env_parse("LEADFLOW_SLA_LOW_DAYS", defaults.sla.stale_low_days)?,
        stale_mid_days: env_parse("LEADFLOW_SLA_MID_DAYS", defaults.sla.stale_mid_days)?,
        ticket_warning_hours: env_parse(
            "LEADFLOW_SLA_TICKET_WARNING_HOURS",
            defaults.sla.ticket_warning_hours,
        )?,
    };

    let claims = ClaimConfig {
        store_timeout_ms: env_parse(
            "LEADFLOW_CLAIM_STORE_TIMEOUT_MS",
            defaults.claims.store_timeout_ms,
        )?,
    };

    let config = Config { database, queue, sla, claims };
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `LeadflowError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The loaded values fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LeadflowError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            LeadflowError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LeadflowError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| LeadflowError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| LeadflowError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(LeadflowError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        LeadflowError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional environment variable, `default` when unset
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| LeadflowError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}
