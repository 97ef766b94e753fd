//! Distribution strategy engine

pub mod engine;
pub mod error;
pub mod ports;

pub use engine::{allocate, AllocationRequest};
pub use error::AllocationError;
pub use ports::TargetDirectory;
