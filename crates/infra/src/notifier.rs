//! Notifier that reports through structured tracing events

use async_trait::async_trait;
use leadflow_core::Notifier;
use leadflow_domain::{ClaimOutcome, Result as DomainResult};
use tracing::info;

/// Emits `lead_escalated` and `claim_outcome` events on the `leadflow::notify`
/// target. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify_escalated(&self, lead_id: &str) -> DomainResult<()> {
        info!(target: "leadflow::notify", event = "lead_escalated", lead_id, "lead is now claimable");
        Ok(())
    }

    async fn notify_claim_outcome(
        &self,
        agent_id: &str,
        lead_id: &str,
        outcome: ClaimOutcome,
    ) -> DomainResult<()> {
        info!(
            target: "leadflow::notify",
            event = "claim_outcome",
            agent_id,
            lead_id,
            outcome = %outcome,
            "claim resolved"
        );
        Ok(())
    }
}
