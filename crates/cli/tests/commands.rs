//! End-to-end command tests over a real SQLite database.

mod support;

use leadflow_cli::commands::{self, scheduler};
use leadflow_cli::utils::logging::exit_code;
use leadflow_cli::Command;
use leadflow_core::LeadStore;
use leadflow_domain::{LeadStage, LeadflowError, RedistributionAction, StrategyType};
use serde_json::json;
use support::{fixture_leads, TestEnv};

async fn seeded() -> TestEnv {
    let env = TestEnv::new();
    let file = env.lead_file(&fixture_leads());
    commands::execute(&env.ctx, Command::ImportLeads { file }).await.unwrap();
    env
}

#[tokio::test(flavor = "multi_thread")]
async fn import_is_an_upsert() {
    let env = TestEnv::new();
    let file = env.lead_file(&fixture_leads());

    let first = commands::execute(&env.ctx, Command::ImportLeads { file: file.clone() })
        .await
        .unwrap();
    let second = commands::execute(&env.ctx, Command::ImportLeads { file }).await.unwrap();

    assert_eq!(first, json!({ "inserted": 5, "updated": 0 }));
    assert_eq!(second, json!({ "inserted": 0, "updated": 5 }));
}

#[tokio::test(flavor = "multi_thread")]
async fn classify_lead_uses_current_thresholds() {
    let env = seeded().await;
    let classify = || Command::ClassifyLead { lead: "w-warm".into() };

    let before = commands::execute(&env.ctx, classify()).await.unwrap();
    assert_eq!(before["bucket"], "yellow");
    assert_eq!(before["temperature"], "warm");

    commands::execute(&env.ctx, Command::SetThresholds { low: 3, mid: 8 }).await.unwrap();

    let after = commands::execute(&env.ctx, classify()).await.unwrap();
    assert_eq!(after["bucket"], "red");
}

#[tokio::test(flavor = "multi_thread")]
async fn thresholds_are_validated_and_persisted() {
    let env = TestEnv::new();

    let rejected = commands::execute(&env.ctx, Command::SetThresholds { low: 0, mid: 5 }).await;
    assert!(matches!(rejected, Err(LeadflowError::Validation(_))));

    let defaults = commands::execute(&env.ctx, Command::ShowThresholds).await.unwrap();
    assert_eq!(defaults, json!({ "low_max": 7, "mid_max": 30 }));

    commands::execute(&env.ctx, Command::SetThresholds { low: 3, mid: 10 }).await.unwrap();
    let shown = commands::execute(&env.ctx, Command::ShowThresholds).await.unwrap();
    assert_eq!(shown, json!({ "low_max": 3, "mid_max": 10 }));
}

#[tokio::test(flavor = "multi_thread")]
async fn first_claim_wins() {
    let env = seeded().await;
    let claim = |agent: &str| Command::ClaimLead { lead: "open".into(), agent: agent.into() };

    let winner = commands::execute(&env.ctx, claim("ana")).await.unwrap();
    let loser = commands::execute(&env.ctx, claim("bo")).await.unwrap_err();

    assert_eq!(winner["outcome"], "granted");
    assert!(matches!(loser, LeadflowError::Conflict(_)));
    assert_eq!(exit_code(&loser), 3);
    assert_eq!(env.ctx.leads.history_for("open").await.unwrap().len(), 1);
    let lead = env.ctx.leads.get_by_id("open").await.unwrap();
    assert_eq!(lead.captured_by.as_deref(), Some("ana"));
}

#[tokio::test(flavor = "multi_thread")]
async fn claiming_a_pending_lead_is_a_conflict() {
    let env = seeded().await;

    let err = commands::execute(
        &env.ctx,
        Command::ClaimLead { lead: "overdue".into(), agent: "ana".into() },
    )
    .await
    .unwrap_err();

    assert_eq!(err.label(), "conflict");
    assert_eq!(exit_code(&err), 3);
    assert!(env.ctx.leads.history_for("overdue").await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn claiming_unknown_lead_is_not_found() {
    let env = TestEnv::new();
    let result = commands::execute(
        &env.ctx,
        Command::ClaimLead { lead: "ghost".into(), agent: "ana".into() },
    )
    .await;
    assert!(matches!(result, Err(LeadflowError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn single_scheduler_pass_escalates_overdue_leads() {
    let env = seeded().await;

    let run = scheduler::run_once(&env.ctx).await.unwrap();

    assert_eq!(run.report.escalated_now, vec!["overdue".to_string()]);
    assert_eq!(run.escalated, vec!["overdue".to_string()]);
    assert!(run.failed.is_empty());
    assert_eq!(env.ctx.leads.get_by_id("overdue").await.unwrap().stage, LeadStage::Escalated);

    let again = scheduler::run_once(&env.ctx).await.unwrap();
    assert!(again.report.escalated_now.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn distribution_preview_splits_across_targets() {
    let env = TestEnv::new();

    let preview = commands::execute(
        &env.ctx,
        Command::PreviewDistribution {
            strategy: StrategyType::RoundRobin,
            target_ids: vec!["bo".into(), "cy".into()],
            totals: leadflow_cli::cli::TotalsArgs { hot: 3, ..Default::default() },
            scope: None,
            max_per_person: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(preview["rows"][0]["destination_id"], "bo");
    assert_eq!(preview["rows"][0]["total"], 2);
    assert_eq!(preview["rows"][1]["total"], 1);
    assert_eq!(preview["unassigned"], 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn distribution_preview_reports_target_problems() {
    let env = TestEnv::new();
    let preview = |ids: Vec<String>| Command::PreviewDistribution {
        strategy: StrategyType::RoundRobin,
        target_ids: ids,
        totals: Default::default(),
        scope: None,
        max_per_person: None,
    };

    let overflowing = commands::execute(
        &env.ctx,
        Command::PreviewDistribution {
            strategy: StrategyType::RoundRobin,
            target_ids: vec!["bo".into()],
            totals: leadflow_cli::cli::TotalsArgs { hot: u64::MAX, warm: 1, ..Default::default() },
            scope: None,
            max_per_person: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(exit_code(&overflowing), 2);

    let unknown = commands::execute(&env.ctx, preview(vec!["ghost".into()])).await;
    assert!(matches!(unknown, Err(LeadflowError::NotFound(_))));

    let bare = TestEnv::without_targets();
    let missing = commands::execute(&bare.ctx, preview(vec!["bo".into()])).await;
    assert!(matches!(missing, Err(LeadflowError::Config(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn redistribution_preview_assigns_every_selected_lead() {
    let env = seeded().await;

    let plan = commands::execute(
        &env.ctx,
        Command::PreviewRedistribution {
            agent: "ana".into(),
            action: RedistributionAction::Redistribute,
            strategy: StrategyType::RoundRobin,
            target_ids: vec!["bo".into(), "cy".into()],
            include: None,
            max_per_person: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(plan["wallet"], json!({ "agent_id": "ana", "hot": 1, "warm": 1, "cold": 1, "total": 3 }));
    assert_eq!(plan["plan"]["assignments"].as_array().unwrap().len(), 3);
    assert!(plan["plan"]["unassigned"].as_array().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn archive_preview_needs_no_targets() {
    let env = seeded().await;

    let plan = commands::execute(
        &env.ctx,
        Command::PreviewRedistribution {
            agent: "ana".into(),
            action: RedistributionAction::Archive,
            strategy: StrategyType::RoundRobin,
            target_ids: Vec::new(),
            include: Some(vec![leadflow_domain::LeadTemperature::Cold]),
            max_per_person: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(plan["plan"]["archived"], json!(["w-cold"]));
    assert_eq!(plan["preview"]["to_archive"], 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn ticket_sla_uses_configured_warning_window() {
    let env = TestEnv::new();
    let ticket = |created_at: &str| Command::ClassifyTicket {
        created_at: created_at.into(),
        sla_hours: 8,
    };

    // Deadline 13:00, four hours away with a six hour window
    let warning = commands::execute(&env.ctx, ticket("2024-07-01T05:00:00Z")).await.unwrap();
    assert_eq!(warning["status"], "warning");
    assert_eq!(warning["deadline"], "2024-07-01T13:00:00Z");

    let healthy = commands::execute(&env.ctx, ticket("2024-07-01T08:00:00Z")).await.unwrap();
    assert_eq!(healthy["status"], "ok");

    let garbage = commands::execute(&env.ctx, ticket("yesterday")).await.unwrap();
    assert_eq!(garbage["status"], "overdue");
    assert!(garbage["deadline"].is_null());
}

#[tokio::test(flavor = "multi_thread")]
async fn ticket_sla_hours_out_of_range_are_rejected() {
    let env = TestEnv::new();

    for sla_hours in [0, -5, 3_000_000_000] {
        let err = commands::execute(
            &env.ctx,
            Command::ClassifyTicket { created_at: "2024-07-01T00:00:00Z".into(), sla_hours },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LeadflowError::Validation(_)), "{sla_hours}: {err:?}");
        assert_eq!(exit_code(&err), 2);
    }
}
