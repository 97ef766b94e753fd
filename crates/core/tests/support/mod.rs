//! Shared test helpers for `leadflow-core` integration tests.
//!
//! Lightweight in-memory mocks of the core ports so tests can focus on
//! behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod repositories;

use chrono::{DateTime, TimeZone, Utc};

/// Fixed reference instant used across tests.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap()
}
