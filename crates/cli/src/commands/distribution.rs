//! Distribution and redistribution previews
//!
//! Both commands are read-only: they compute who would get what and leave
//! applying it to the caller.

use leadflow_core::{
    allocate, AllocationRequest, RedistributionPlan, RedistributionRequest, TargetDirectory,
};
use leadflow_domain::{
    AllocationPreview, AllocationTotals, DistributionScope, LeadflowError,
    Result as DomainResult, StrategyType, WalletSummary,
};

use crate::context::AppContext;

pub struct DistributionArgs<'a> {
    pub strategy: StrategyType,
    pub target_ids: &'a [String],
    pub totals: AllocationTotals,
    pub scope: DistributionScope,
    pub max_items_per_person: Option<u32>,
}

pub async fn preview_distribution(
    ctx: &AppContext,
    args: DistributionArgs<'_>,
) -> DomainResult<AllocationPreview> {
    let directory = ctx.targets()?;

    let mut targets = Vec::with_capacity(args.target_ids.len());
    for id in args.target_ids {
        targets.push(directory.get_target(id).await?);
    }

    let request = AllocationRequest::new(args.strategy, targets, args.scope, args.totals)
        .with_max_items_per_person(args.max_items_per_person);
    allocate(&request).map_err(LeadflowError::from)
}

pub async fn preview_redistribution(
    ctx: &AppContext,
    request: &RedistributionRequest,
) -> DomainResult<RedistributionPlan> {
    ctx.redistribution()?.plan(request).await
}

pub async fn show_wallet(ctx: &AppContext, agent_id: &str) -> DomainResult<WalletSummary> {
    ctx.staleness.wallet_for(agent_id).await
}
