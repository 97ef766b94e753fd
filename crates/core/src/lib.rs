//! # Leadflow Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Staleness/SLA classification
//! - Lead queue reconciliation planning
//! - Claim coordination
//! - Distribution strategies and redistribution previews
//! - Port interfaces (traits) for stores, notifier and clock
//!
//! ## Architecture Principles
//! - Only depends on `leadflow-common` and `leadflow-domain`
//! - No database or transport code
//! - All external dependencies via traits

pub mod claim;
pub mod clock;
pub mod distribution;
pub mod leads;
pub mod queue;
pub mod redistribution;
pub mod sla;

// Re-export specific items to avoid ambiguity
pub use claim::ClaimCoordinator;
pub use clock::{Clock, FixedClock, SystemClock};
pub use distribution::ports::TargetDirectory;
pub use distribution::{allocate, AllocationError, AllocationRequest};
pub use leads::ports::{LeadStore, Notifier};
pub use queue::{plan_reconciliation, ReconcilePlan, SlotState};
pub use redistribution::{
    preview, Assignment, AssignmentPlan, RedistributionPlan, RedistributionRequest,
    RedistributionService,
};
pub use sla::ports::ThresholdStore;
pub use sla::StalenessService;
