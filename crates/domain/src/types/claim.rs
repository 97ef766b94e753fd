//! Claim arbitration types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Result of a claim request.
///
/// Losing a race is an expected outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    Granted,
    AlreadyClaimed,
    /// Lead not publicly claimable, or the store call timed out
    NotEligible,
}

impl_domain_status_conversions!(ClaimOutcome {
    Granted => "granted",
    AlreadyClaimed => "already_claimed",
    NotEligible => "not_eligible",
});

impl ClaimOutcome {
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

/// A single claim request; the unit of arbitration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimAttempt {
    pub lead_id: String,
    pub agent_id: String,
    pub submitted_at: DateTime<Utc>,
}

impl ClaimAttempt {
    pub fn new(
        lead_id: impl Into<String>,
        agent_id: impl Into<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self { lead_id: lead_id.into(), agent_id: agent_id.into(), submitted_at }
    }
}
