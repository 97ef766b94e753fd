//! Background scheduling for lead escalation
//!
//! - [`EscalationScheduler`] owns one timer per pending lead and escalates it
//!   when the queue timeout elapses
//! - [`SchedulerEvent`] is broadcast for every escalation outcome

pub mod error;
pub mod escalation_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use escalation_scheduler::{
    EscalationScheduler, EscalationSchedulerConfig, ReconcileReport, SchedulerEvent,
};
