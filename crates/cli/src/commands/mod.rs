//! Command handlers
//!
//! Each handler returns a serializable response; [`execute`] dispatches a
//! parsed [`Command`] and renders the response as JSON.

pub mod claims;
pub mod distribution;
pub mod leads;
pub mod scheduler;
pub mod sla;

use leadflow_core::RedistributionRequest;
use leadflow_domain::Result as DomainResult;
use serde_json::Value;

use crate::cli::{filters_from, scope_from, Command};
use crate::context::AppContext;
use crate::utils::command_helpers::execute_logged;

pub async fn execute(ctx: &AppContext, command: Command) -> DomainResult<Value> {
    match command {
        Command::ClaimLead { lead, agent } => {
            execute_logged("claim_lead", || claims::claim_lead(ctx, &lead, &agent)).await
        }
        Command::PreviewDistribution { strategy, target_ids, totals, scope, max_per_person } => {
            let args = distribution::DistributionArgs {
                strategy,
                target_ids: &target_ids,
                totals: totals.into(),
                scope: scope_from(scope.as_deref()),
                max_items_per_person: max_per_person,
            };
            execute_logged("preview_distribution", || {
                distribution::preview_distribution(ctx, args)
            })
            .await
        }
        Command::PreviewRedistribution {
            agent,
            action,
            strategy,
            target_ids,
            include,
            max_per_person,
        } => {
            let request = RedistributionRequest {
                agent_id: agent,
                filters: filters_from(include.as_deref()),
                action,
                strategy,
                target_ids,
                max_items_per_person: max_per_person,
            };
            execute_logged("preview_redistribution", || {
                distribution::preview_redistribution(ctx, &request)
            })
            .await
        }
        Command::ShowWallet { agent } => {
            execute_logged("show_wallet", || distribution::show_wallet(ctx, &agent)).await
        }
        Command::SetThresholds { low, mid } => {
            execute_logged("set_thresholds", || sla::set_thresholds(ctx, low, mid)).await
        }
        Command::ShowThresholds => {
            execute_logged("show_thresholds", || sla::show_thresholds(ctx)).await
        }
        Command::ClassifyLead { lead } => {
            execute_logged("classify_lead", || sla::classify_lead(ctx, &lead)).await
        }
        Command::ClassifyTicket { created_at, sla_hours } => {
            execute_logged("classify_ticket", || sla::classify_ticket(ctx, &created_at, sla_hours))
                .await
        }
        Command::ImportLeads { file } => {
            execute_logged("import_leads", || leads::import_leads(ctx, &file)).await
        }
        Command::RunScheduler { once: true } => {
            execute_logged("run_scheduler_once", || scheduler::run_once(ctx)).await
        }
        Command::RunScheduler { once: false } => {
            execute_logged("run_scheduler", || scheduler::run_until_interrupted(ctx)).await
        }
    }
}
