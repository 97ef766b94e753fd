//! # Leadflow Domain
//!
//! Business domain types and models for the lead distribution engine.
//!
//! This crate contains:
//! - Lead, claim, SLA, distribution and wallet types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - Depends only on `leadflow-common` for error classification
//! - Pure domain models and data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
