//! Redistribution service - wallet, targets and strategy in one preview

use std::collections::BTreeMap;
use std::sync::Arc;

use leadflow_domain::{
    AllocationPreview, LeadTemperature, LeadflowError, RedistributionAction,
    RedistributionFilters, RedistributionPreview, Result, StrategyType, UnitBucket,
    WalletSummary,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::preview::preview;
use crate::distribution::{allocate, AllocationRequest, TargetDirectory};
use crate::sla::StalenessService;

/// A bulk action over one agent's wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedistributionRequest {
    pub agent_id: String,
    pub filters: RedistributionFilters,
    pub action: RedistributionAction,
    pub strategy: StrategyType,
    /// Destinations in priority order; unused when archiving
    pub target_ids: Vec<String>,
    pub max_items_per_person: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub lead_id: String,
    pub temperature: LeadTemperature,
    pub destination_id: String,
}

/// Concrete lead ids per outcome. Applying it is up to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPlan {
    pub assignments: Vec<Assignment>,
    pub archived: Vec<String>,
    /// Selected leads no destination could take (capped rosters)
    pub unassigned: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedistributionPlan {
    pub wallet: WalletSummary,
    pub preview: RedistributionPreview,
    pub allocation: Option<AllocationPreview>,
    pub plan: AssignmentPlan,
}

pub struct RedistributionService {
    staleness: Arc<StalenessService>,
    targets: Arc<dyn TargetDirectory>,
}

impl RedistributionService {
    pub fn new(staleness: Arc<StalenessService>, targets: Arc<dyn TargetDirectory>) -> Self {
        Self { staleness, targets }
    }

    /// Build the preview and the deterministic assignment plan for `request`.
    ///
    /// Leads are handed out bucket by bucket, ordered by id within a bucket,
    /// filling allocation rows in row order.
    ///
    /// # Errors
    /// - `NotFound` for an unknown target id
    /// - `Validation` when redistributing without targets or when the
    ///   allocation is rejected
    pub async fn plan(&self, request: &RedistributionRequest) -> Result<RedistributionPlan> {
        let leads = self.staleness.wallet_leads(&request.agent_id).await?;
        let wallet = WalletSummary::from_buckets(&request.agent_id, leads.iter().map(|(_, t)| *t));
        let summary = preview(&wallet, &request.filters, request.action);

        let mut by_bucket: BTreeMap<LeadTemperature, Vec<String>> = BTreeMap::new();
        for (lead, temperature) in leads {
            if request.filters.includes(temperature) {
                by_bucket.entry(temperature).or_default().push(lead.id);
            }
        }

        let mut plan = AssignmentPlan::default();
        let allocation = match request.action {
            RedistributionAction::Archive => {
                plan.archived = by_bucket.into_values().flatten().collect();
                None
            }
            RedistributionAction::Redistribute => {
                if request.target_ids.is_empty() {
                    return Err(LeadflowError::Validation(
                        "redistribution needs at least one destination target".to_string(),
                    ));
                }
                let mut targets = Vec::with_capacity(request.target_ids.len());
                for id in &request.target_ids {
                    targets.push(self.targets.get_target(id).await?);
                }

                let allocation = allocate(
                    &AllocationRequest::new(
                        request.strategy,
                        targets,
                        request.filters.to_scope(),
                        summary.breakdown,
                    )
                    .with_max_items_per_person(request.max_items_per_person),
                )?;

                for (temperature, ids) in by_bucket {
                    let bucket = UnitBucket::from(temperature);
                    let mut ids = ids.into_iter();
                    for row in &allocation.rows {
                        for lead_id in ids.by_ref().take(row.get(bucket) as usize) {
                            plan.assignments.push(Assignment {
                                lead_id,
                                temperature,
                                destination_id: row.destination_id.clone(),
                            });
                        }
                    }
                    plan.unassigned.extend(ids);
                }
                Some(allocation)
            }
        };

        info!(
            agent_id = %request.agent_id,
            action = %request.action,
            selected = summary.selected_total,
            assigned = plan.assignments.len(),
            archived = plan.archived.len(),
            unassigned = plan.unassigned.len(),
            "redistribution planned"
        );

        Ok(RedistributionPlan { wallet, preview: summary, allocation, plan })
    }
}
