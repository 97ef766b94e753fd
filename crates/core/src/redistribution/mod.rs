//! Redistribution scope, preview and assignment planning

pub mod preview;
pub mod service;

pub use preview::preview;
pub use service::{
    Assignment, AssignmentPlan, RedistributionPlan, RedistributionRequest, RedistributionService,
};
