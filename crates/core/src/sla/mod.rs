//! Staleness and SLA classification

pub mod classifier;
pub mod ports;
pub mod service;

pub use classifier::*;
pub use ports::ThresholdStore;
pub use service::StalenessService;
