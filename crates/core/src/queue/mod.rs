//! Lead queue reconciliation.
//!
//! The scheduler keeps one slot per lead id. Each reconciliation pass diffs
//! the store's pending pool against those slots and patches the difference:
//! it never clears and recreates, so a refresh cannot reset a countdown.

pub mod reconcile;

pub use reconcile::{plan_reconciliation, ReconcilePlan, SlotState};
