//! In-process adapters for the core ports

pub mod lead_store;
pub mod target_directory;
pub mod threshold_store;

pub use lead_store::InMemoryLeadStore;
pub use target_directory::StaticTargetDirectory;
pub use threshold_store::InMemoryThresholdStore;
