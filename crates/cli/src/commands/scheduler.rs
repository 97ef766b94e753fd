//! Escalation scheduler commands

use leadflow_domain::{LeadflowError, Result as DomainResult};
use leadflow_infra::{ReconcileReport, SchedulerEvent};
use serde::Serialize;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{info, warn};

use crate::context::AppContext;

/// Result of a single reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerRun {
    pub report: ReconcileReport,
    pub escalated: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerSummary {
    pub escalated: usize,
    pub failed: usize,
}

/// Reconcile once and wait for the overdue escalations it started.
///
/// Leads not yet due are left alone; their timers end with the process.
pub async fn run_once(ctx: &AppContext) -> DomainResult<SchedulerRun> {
    let scheduler = ctx.scheduler();
    let mut events = scheduler.subscribe();

    let report = scheduler.reconcile().await?;
    scheduler.settle().await;

    let mut run = SchedulerRun { report, ..SchedulerRun::default() };
    loop {
        match events.try_recv() {
            Ok(SchedulerEvent::Escalated { lead_id }) => run.escalated.push(lead_id),
            Ok(SchedulerEvent::EscalationFailed { lead_id, .. }) => run.failed.push(lead_id),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "scheduler events dropped");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    Ok(run)
}

/// Run the sweep until Ctrl-C, streaming events to stdout as JSON lines.
pub async fn run_until_interrupted(ctx: &AppContext) -> DomainResult<SchedulerSummary> {
    let mut scheduler = ctx.scheduler();
    let mut events = scheduler.subscribe();
    let mut summary = SchedulerSummary::default();

    scheduler.start().await?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, stopping scheduler");
                break;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    match &event {
                        SchedulerEvent::Escalated { .. } => summary.escalated += 1,
                        SchedulerEvent::EscalationFailed { .. } => summary.failed += 1,
                    }
                    let line = serde_json::to_string(&event).map_err(|e| {
                        LeadflowError::Internal(format!("failed to serialize event: {e}"))
                    })?;
                    println!("{line}");
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "scheduler events dropped"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    scheduler.stop().await?;
    Ok(summary)
}
