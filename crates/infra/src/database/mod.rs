//! Database implementations

pub mod lead_repository;
pub mod manager;
pub mod threshold_repository;

pub use lead_repository::SqliteLeadStore;
pub use manager::{DbConnection, DbManager};
pub use threshold_repository::SqliteThresholdStore;
