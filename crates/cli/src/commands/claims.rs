//! Claim commands
//!
//! Only a granted claim is a success at this edge. A lost race and an
//! ineligible (or unanswered) claim both report `conflict`.

use leadflow_domain::{ClaimOutcome, LeadflowError, Result as DomainResult};
use serde::Serialize;

use crate::context::AppContext;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimResponse {
    pub lead_id: String,
    pub agent_id: String,
    pub outcome: ClaimOutcome,
}

pub async fn claim_lead(
    ctx: &AppContext,
    lead_id: &str,
    agent_id: &str,
) -> DomainResult<ClaimResponse> {
    let outcome = ctx.claims.claim(lead_id, agent_id).await?;
    claim_response(lead_id, agent_id, outcome)
}

fn claim_response(
    lead_id: &str,
    agent_id: &str,
    outcome: ClaimOutcome,
) -> DomainResult<ClaimResponse> {
    match outcome {
        ClaimOutcome::Granted => Ok(ClaimResponse {
            lead_id: lead_id.to_string(),
            agent_id: agent_id.to_string(),
            outcome,
        }),
        ClaimOutcome::AlreadyClaimed => Err(LeadflowError::Conflict(format!(
            "lead {lead_id} was already claimed by another agent"
        ))),
        ClaimOutcome::NotEligible => Err(LeadflowError::Conflict(format!(
            "lead {lead_id} is not open for claiming, or the store did not confirm the claim in time"
        ))),
    }
}
