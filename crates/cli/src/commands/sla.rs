//! Staleness threshold and classification commands

use chrono::{DateTime, Utc};
use leadflow_core::sla::{classify_deadline, parse_timestamp, ticket_deadline};
use leadflow_core::LeadStore;
use leadflow_domain::constants::MAX_TICKET_SLA_HOURS;
use leadflow_domain::{
    LeadTemperature, LeadflowError, Result as DomainResult, SlaStatus, SlaThresholds,
    StalenessBucket,
};
use serde::Serialize;

use crate::context::AppContext;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadClassification {
    pub lead_id: String,
    pub last_contact_at: Option<DateTime<Utc>>,
    pub bucket: StalenessBucket,
    pub temperature: LeadTemperature,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketClassification {
    pub created_at: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: SlaStatus,
}

pub async fn set_thresholds(ctx: &AppContext, low: u32, mid: u32) -> DomainResult<SlaThresholds> {
    ctx.staleness.set_thresholds(low, mid).await
}

pub async fn show_thresholds(ctx: &AppContext) -> DomainResult<SlaThresholds> {
    ctx.staleness.thresholds().await
}

pub async fn classify_lead(ctx: &AppContext, lead_id: &str) -> DomainResult<LeadClassification> {
    let lead = ctx.leads.get_by_id(lead_id).await?;
    let bucket = ctx.staleness.classify_lead(&lead).await?;

    Ok(LeadClassification {
        lead_id: lead.id,
        last_contact_at: lead.last_contact_at,
        bucket,
        temperature: bucket.into(),
    })
}

pub async fn classify_ticket(
    ctx: &AppContext,
    created_at: &str,
    sla_hours: i64,
) -> DomainResult<TicketClassification> {
    if !(1..=MAX_TICKET_SLA_HOURS).contains(&sla_hours) {
        return Err(LeadflowError::Validation(format!(
            "sla_hours must be between 1 and {MAX_TICKET_SLA_HOURS}, got {sla_hours}"
        )));
    }

    let created_at = parse_timestamp(created_at);
    let status =
        classify_deadline(ctx.clock.now(), created_at, sla_hours, ctx.config.sla.ticket_warning());

    Ok(TicketClassification {
        created_at,
        deadline: created_at.and_then(|created| ticket_deadline(created, sla_hours)),
        status,
    })
}
