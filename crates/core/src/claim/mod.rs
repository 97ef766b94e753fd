//! Claim arbitration for publicly claimable leads

pub mod coordinator;

pub use coordinator::ClaimCoordinator;
