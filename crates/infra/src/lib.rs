//! # Leadflow Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - SQLite lead and threshold stores (r2d2 pool)
//! - In-memory stores and a file-backed target directory
//! - The escalation scheduler runtime
//! - Configuration loading and error conversions
//!
//! ## Architecture
//! - Implements traits defined in `leadflow-core`
//! - Contains all "impure" code (I/O, timers, background tasks)

pub mod config;
pub mod database;
pub mod errors;
pub mod memory;
pub mod notifier;
pub mod scheduling;

// Re-export commonly used items
pub use database::{DbManager, SqliteLeadStore, SqliteThresholdStore};
pub use errors::InfraError;
pub use memory::{InMemoryLeadStore, InMemoryThresholdStore, StaticTargetDirectory};
pub use notifier::TracingNotifier;
pub use scheduling::{
    EscalationScheduler, EscalationSchedulerConfig, ReconcileReport, SchedulerError,
    SchedulerEvent, SchedulerResult,
};
