//! Port interfaces for the authoritative lead store and the notifier

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadflow_domain::{ClaimOutcome, Lead, LeadHistoryEntry, LeadPatch, PoolFilter, Result};

/// Authoritative lead/ticket store.
///
/// The store, not the engine, orders concurrent writes: the capture
/// compare-and-set and the escalation write must each be atomic per lead.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Leads in the pending stage, captured or not, matching `filter`.
    async fn list_pending(&self, filter: &PoolFilter) -> Result<Vec<Lead>>;

    /// Fetch a single lead.
    ///
    /// # Errors
    /// `LeadflowError::NotFound` when the id is unknown.
    async fn get_by_id(&self, id: &str) -> Result<Lead>;

    /// Set `captured_by = new_owner` and move the lead to `Claimed`, but only
    /// if it is escalated and `captured_by` is currently empty.
    ///
    /// A successful swap appends the `captured` history entry (stamped `at`)
    /// in the same atomic step, so a capture never exists without its audit
    /// row.
    ///
    /// Returns `false` when the condition did not hold, including unknown ids.
    async fn compare_and_set_capture(
        &self,
        id: &str,
        new_owner: &str,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Move a pending, uncaptured lead to `Escalated`.
    ///
    /// Returns `false` when the lead had already left that state (captured,
    /// escalated or claimed), which makes the write idempotent.
    ///
    /// # Errors
    /// `LeadflowError::NotFound` when the lead no longer exists.
    async fn mark_escalated(&self, id: &str) -> Result<bool>;

    /// Apply a partial update and return the stored lead.
    async fn update(&self, id: &str, patch: &LeadPatch) -> Result<Lead>;

    /// Append an audit entry.
    async fn append_history(&self, entry: &LeadHistoryEntry) -> Result<()>;

    /// Leads currently owned by `agent_id`, ordered by id.
    async fn list_by_owner(&self, agent_id: &str) -> Result<Vec<Lead>>;
}

/// Outbound notifications.
///
/// Fire-and-forget: callers log a returned error and carry on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_escalated(&self, lead_id: &str) -> Result<()>;

    async fn notify_claim_outcome(
        &self,
        agent_id: &str,
        lead_id: &str,
        outcome: ClaimOutcome,
    ) -> Result<()>;
}
