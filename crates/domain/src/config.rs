//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DB_PATH, DEFAULT_DB_POOL_SIZE, DEFAULT_INITIAL_BACKOFF_MS,
    DEFAULT_MAX_ESCALATION_ATTEMPTS, DEFAULT_MAX_BACKOFF_MS, DEFAULT_STALE_LOW_DAYS,
    DEFAULT_STALE_MID_DAYS, DEFAULT_STORE_TIMEOUT_MS, DEFAULT_SWEEP_INTERVAL_SECS,
    DEFAULT_TIMEOUT_MINUTES, TICKET_WARNING_HOURS,
};
use crate::errors::{LeadflowError, Result};
use crate::types::sla::SlaThresholds;

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub queue: QueueConfig,
    pub sla: SlaConfig,
    pub claims: ClaimConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

/// Lead queue and escalation scheduler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Pool-wide escalation delay measured from lead creation
    pub timeout_minutes: u32,
    pub sweep_interval_seconds: u64,
    /// Pool watched by the scheduler; `None` watches every pool
    pub pool: Option<String>,
    pub max_escalation_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub store_timeout_ms: u64,
}

/// Staleness and ticket SLA configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlaConfig {
    /// Initial thresholds seeded into the threshold store
    pub stale_low_days: u32,
    pub stale_mid_days: u32,
    pub ticket_warning_hours: i64,
}

/// Claim coordinator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimConfig {
    pub store_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.to_string(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECS,
            pool: None,
            max_escalation_attempts: DEFAULT_MAX_ESCALATION_ATTEMPTS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
        }
    }
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            stale_low_days: DEFAULT_STALE_LOW_DAYS,
            stale_mid_days: DEFAULT_STALE_MID_DAYS,
            ticket_warning_hours: TICKET_WARNING_HOURS,
        }
    }
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self { store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS }
    }
}

impl QueueConfig {
    pub fn timeout(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.timeout_minutes))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl SlaConfig {
    /// Thresholds described by this section.
    pub fn thresholds(&self) -> Result<SlaThresholds> {
        SlaThresholds::new(self.stale_low_days, self.stale_mid_days)
    }

    pub fn ticket_warning(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ticket_warning_hours)
    }
}

impl ClaimConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Config {
    /// Check every section, collecting all violations into one error.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.database.pool_size == 0 {
            problems.push("database.pool_size must be greater than 0".to_string());
        }
        if self.queue.timeout_minutes == 0 {
            problems.push("queue.timeout_minutes must be a positive integer".to_string());
        }
        if self.queue.sweep_interval_seconds == 0 {
            problems.push("queue.sweep_interval_seconds must be greater than 0".to_string());
        }
        if self.queue.max_escalation_attempts == 0 {
            problems.push("queue.max_escalation_attempts must be greater than 0".to_string());
        }
        if self.queue.initial_backoff_ms > self.queue.max_backoff_ms {
            problems.push("queue.initial_backoff_ms must not exceed max_backoff_ms".to_string());
        }
        if self.sla.ticket_warning_hours <= 0 {
            problems.push("sla.ticket_warning_hours must be greater than 0".to_string());
        }
        if let Err(err) = self.sla.thresholds() {
            problems.push(format!("sla: {err}"));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(LeadflowError::Config(problems.join("; ")))
        }
    }
}
