//! Staleness and SLA buckets

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_STALE_LOW_DAYS, DEFAULT_STALE_MID_DAYS, THRESHOLD_MAX};
use crate::errors::{LeadflowError, Result};
use crate::impl_domain_status_conversions;

/// Bucket boundaries `(low_max, mid_max)` in whole days.
///
/// Always satisfies `0 < low_max < mid_max <= THRESHOLD_MAX`; the only way to
/// build one is [`SlaThresholds::new`], deserialization included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholds")]
pub struct SlaThresholds {
    low_max: u32,
    mid_max: u32,
}

#[derive(Deserialize)]
struct RawThresholds {
    low_max: u32,
    mid_max: u32,
}

impl TryFrom<RawThresholds> for SlaThresholds {
    type Error = LeadflowError;

    fn try_from(raw: RawThresholds) -> Result<Self> {
        Self::new(raw.low_max, raw.mid_max)
    }
}

impl SlaThresholds {
    pub fn new(low_max: u32, mid_max: u32) -> Result<Self> {
        if low_max == 0 {
            return Err(LeadflowError::Validation(
                "low threshold must be greater than 0".to_string(),
            ));
        }
        if low_max >= mid_max {
            return Err(LeadflowError::Validation(format!(
                "low threshold ({low_max}) must be below mid threshold ({mid_max})"
            )));
        }
        if mid_max > THRESHOLD_MAX {
            return Err(LeadflowError::Validation(format!(
                "mid threshold ({mid_max}) must not exceed {THRESHOLD_MAX}"
            )));
        }
        Ok(Self { low_max, mid_max })
    }

    pub fn low_max(&self) -> u32 {
        self.low_max
    }

    pub fn mid_max(&self) -> u32 {
        self.mid_max
    }
}

impl Default for SlaThresholds {
    fn default() -> Self {
        Self { low_max: DEFAULT_STALE_LOW_DAYS, mid_max: DEFAULT_STALE_MID_DAYS }
    }
}

/// Elapsed-time bucket, ordered from fresh to stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalenessBucket {
    Green,
    Yellow,
    Red,
}

impl_domain_status_conversions!(StalenessBucket {
    Green => "green",
    Yellow => "yellow",
    Red => "red",
});

/// Remaining-time bucket for deadlines, ordered from healthy to breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaStatus {
    Ok,
    Warning,
    Overdue,
}

impl_domain_status_conversions!(SlaStatus {
    Ok => "ok",
    Warning => "warning",
    Overdue => "overdue",
});

/// Temperature of a lead in an agent's wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadTemperature {
    Hot,
    Warm,
    Cold,
}

impl_domain_status_conversions!(LeadTemperature {
    Hot => "hot",
    Warm => "warm",
    Cold => "cold",
});

impl LeadTemperature {
    pub const ALL: [Self; 3] = [Self::Hot, Self::Warm, Self::Cold];
}

impl From<StalenessBucket> for LeadTemperature {
    fn from(bucket: StalenessBucket) -> Self {
        match bucket {
            StalenessBucket::Green => Self::Hot,
            StalenessBucket::Yellow => Self::Warm,
            StalenessBucket::Red => Self::Cold,
        }
    }
}
