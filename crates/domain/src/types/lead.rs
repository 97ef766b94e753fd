//! Leads and their lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Lifecycle stage of a lead.
///
/// `Pending` leads sit in the pre-service pool. The scheduler moves
/// uncaptured pending leads to `Escalated` (publicly claimable); the claim
/// coordinator moves escalated leads to `Claimed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStage {
    Pending,
    Escalated,
    Claimed,
}

impl_domain_status_conversions!(LeadStage {
    Pending => "pending",
    Escalated => "escalated",
    Claimed => "claimed",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub pool_id: String,
    pub created_at: DateTime<Utc>,
    pub stage: LeadStage,
    /// Owning agent, empty until captured
    #[serde(default)]
    pub captured_by: Option<String>,
    #[serde(default)]
    pub last_contact_at: Option<DateTime<Utc>>,
}

impl Lead {
    /// A fresh, uncaptured lead in the pending stage.
    pub fn new(id: impl Into<String>, pool_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            pool_id: pool_id.into(),
            created_at,
            stage: LeadStage::Pending,
            captured_by: None,
            last_contact_at: None,
        }
    }

    pub fn is_captured(&self) -> bool {
        self.captured_by.is_some()
    }

    /// Pending and uncaptured: needs exactly one live escalation timer.
    pub fn awaits_escalation(&self) -> bool {
        self.stage == LeadStage::Pending && !self.is_captured()
    }

    /// Escalated and still uncaptured.
    pub fn is_claimable(&self) -> bool {
        self.stage == LeadStage::Escalated && !self.is_captured()
    }

    pub fn escalation_deadline(&self, timeout: chrono::Duration) -> DateTime<Utc> {
        self.created_at + timeout
    }
}

/// Partial update accepted by the lead store.
///
/// Ownership and stage are not patchable. They change only through the claim
/// compare-and-set and the escalation write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPatch {
    #[serde(default)]
    pub pool_id: Option<String>,
    #[serde(default)]
    pub last_contact_at: Option<DateTime<Utc>>,
}

impl LeadPatch {
    pub fn is_empty(&self) -> bool {
        self.pool_id.is_none() && self.last_contact_at.is_none()
    }

    pub fn apply(&self, lead: &mut Lead) {
        if let Some(pool_id) = &self.pool_id {
            lead.pool_id.clone_from(pool_id);
        }
        if let Some(contact) = self.last_contact_at {
            lead.last_contact_at = Some(contact);
        }
    }
}

/// Selects which pool(s) `list_pending` returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolFilter {
    pub pool_id: Option<String>,
}

impl PoolFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn pool(pool_id: impl Into<String>) -> Self {
        Self { pool_id: Some(pool_id.into()) }
    }

    pub fn matches(&self, lead: &Lead) -> bool {
        self.pool_id.as_deref().map_or(true, |pool| pool == lead.pool_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Captured,
}

impl_domain_status_conversions!(HistoryAction {
    Captured => "captured",
});

/// Audit record written once per lead capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadHistoryEntry {
    pub lead_id: String,
    pub agent_id: String,
    pub action: HistoryAction,
    pub recorded_at: DateTime<Utc>,
}

impl LeadHistoryEntry {
    pub fn captured(
        lead_id: impl Into<String>,
        agent_id: impl Into<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            lead_id: lead_id.into(),
            agent_id: agent_id.into(),
            action: HistoryAction::Captured,
            recorded_at,
        }
    }
}
