//! Domain constants
//!
//! Centralized location for defaults and limits shared across crates.

// Lead queue
pub const DEFAULT_TIMEOUT_MINUTES: u32 = 30;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_MAX_ESCALATION_ATTEMPTS: u32 = 5;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 200;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 30_000;
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

// Staleness thresholds (whole days since last contact)
pub const DEFAULT_STALE_LOW_DAYS: u32 = 7;
pub const DEFAULT_STALE_MID_DAYS: u32 = 30;
pub const THRESHOLD_MAX: u32 = 365;

// Ticket SLA
pub const TICKET_WARNING_HOURS: i64 = 6;
pub const MAX_TICKET_SLA_HOURS: i64 = 24 * 365 * 10;

// Database
pub const DEFAULT_DB_PATH: &str = "leadflow.db";
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

// Scheduler events
pub const SCHEDULER_EVENT_CAPACITY: usize = 256;
