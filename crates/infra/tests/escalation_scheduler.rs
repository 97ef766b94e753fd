//! Integration tests for the escalation scheduler, driven on paused tokio
//! time with a pinned clock.

mod support;

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use leadflow_common::RetryConfig;
use leadflow_core::{FixedClock, LeadStore, SlotState};
use leadflow_domain::{Lead, LeadStage, LeadflowError, PoolFilter};
use leadflow_infra::{
    EscalationScheduler, EscalationSchedulerConfig, InMemoryLeadStore, SchedulerEvent,
};
use support::{base_time, FlakyLeadStore, RecordingNotifier};

fn config() -> EscalationSchedulerConfig {
    EscalationSchedulerConfig {
        timeout: ChronoDuration::minutes(5),
        sweep_interval: Duration::from_secs(60),
        pool: PoolFilter::all(),
        store_timeout: Duration::from_secs(1),
        retry: RetryConfig::exponential(3, Duration::from_millis(100), Duration::from_secs(1)),
    }
}

fn scheduler(store: Arc<dyn LeadStore>, notifier: &RecordingNotifier) -> EscalationScheduler {
    EscalationScheduler::new(
        store,
        Arc::new(notifier.clone()),
        Arc::new(FixedClock::new(base_time())),
        config(),
    )
}

fn fresh_lead(id: &str) -> Lead {
    Lead::new(id, "inbound", base_time())
}

fn overdue_lead(id: &str) -> Lead {
    Lead::new(id, "inbound", base_time() - ChronoDuration::minutes(10))
}

#[tokio::test(start_paused = true)]
async fn timer_escalates_lead_after_timeout() {
    let store = InMemoryLeadStore::new([fresh_lead("lead-1")]);
    let notifier = RecordingNotifier::default();
    let scheduler = scheduler(Arc::new(store.clone()), &notifier);
    let mut events = scheduler.subscribe();

    let report = scheduler.reconcile().await.unwrap();
    assert_eq!(report.armed, 1);
    assert!(report.escalated_now.is_empty());

    tokio::time::sleep(Duration::from_secs(4 * 60)).await;
    assert_eq!(store.lead("lead-1").unwrap().stage, LeadStage::Pending);

    let event = events.recv().await.unwrap();
    assert_eq!(event, SchedulerEvent::Escalated { lead_id: "lead-1".into() });
    assert_eq!(store.lead("lead-1").unwrap().stage, LeadStage::Escalated);
    assert_eq!(notifier.escalated(), vec!["lead-1".to_string()]);
    assert_eq!(scheduler.timer_states().get("lead-1"), Some(&SlotState::Escalated));
}

#[tokio::test(start_paused = true)]
async fn repeated_reconcile_does_not_duplicate_timers() {
    let store = InMemoryLeadStore::new([fresh_lead("lead-1"), fresh_lead("lead-2")]);
    let notifier = RecordingNotifier::default();
    let scheduler = scheduler(Arc::new(store.clone()), &notifier);

    let first = scheduler.reconcile().await.unwrap();
    let second = scheduler.reconcile().await.unwrap();

    assert_eq!(first.armed, 2);
    assert_eq!(second.armed, 0);
    assert_eq!(second.rearmed, 0);
    assert_eq!(second.unchanged, 2);
    assert_eq!(scheduler.timer_states().len(), 2);

    tokio::time::sleep(Duration::from_secs(6 * 60)).await;
    let mut escalated = notifier.escalated();
    escalated.sort();
    assert_eq!(escalated, vec!["lead-1".to_string(), "lead-2".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn overdue_lead_escalates_in_the_same_pass() {
    let store = InMemoryLeadStore::new([overdue_lead("late")]);
    let notifier = RecordingNotifier::default();
    let scheduler = scheduler(Arc::new(store.clone()), &notifier);

    let report = scheduler.reconcile().await.unwrap();
    assert_eq!(report.escalated_now, vec!["late".to_string()]);
    assert_eq!(report.armed, 0);

    scheduler.settle().await;

    assert_eq!(store.lead("late").unwrap().stage, LeadStage::Escalated);
    assert_eq!(notifier.escalated(), vec!["late".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn direct_capture_cancels_the_timer() {
    let store = InMemoryLeadStore::new([fresh_lead("lead-1")]);
    let notifier = RecordingNotifier::default();
    let scheduler = scheduler(Arc::new(store.clone()), &notifier);

    scheduler.reconcile().await.unwrap();
    assert!(store.capture_direct("lead-1", "agent-a").unwrap());

    let report = scheduler.reconcile().await.unwrap();
    assert_eq!(report.cancelled, 1);
    assert!(scheduler.timer_states().is_empty());

    tokio::time::sleep(Duration::from_secs(10 * 60)).await;
    let lead = store.lead("lead-1").unwrap();
    assert_eq!(lead.stage, LeadStage::Pending);
    assert_eq!(lead.captured_by.as_deref(), Some("agent-a"));
    assert!(notifier.escalated().is_empty());
}

#[tokio::test(start_paused = true)]
async fn removed_lead_drops_its_timer() {
    let store = InMemoryLeadStore::new([fresh_lead("lead-1")]);
    let notifier = RecordingNotifier::default();
    let scheduler = scheduler(Arc::new(store.clone()), &notifier);

    scheduler.reconcile().await.unwrap();
    assert!(store.remove("lead-1"));

    let report = scheduler.reconcile().await.unwrap();
    assert_eq!(report.cancelled, 1);
    tokio::time::sleep(Duration::from_secs(10 * 60)).await;
    assert!(notifier.escalated().is_empty());
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried() {
    let store = InMemoryLeadStore::new([overdue_lead("late")]);
    let flaky = FlakyLeadStore::new(store.clone(), 2);
    let notifier = RecordingNotifier::default();
    let scheduler = scheduler(Arc::new(flaky.clone()), &notifier);
    let mut events = scheduler.subscribe();

    scheduler.reconcile().await.unwrap();
    scheduler.settle().await;

    assert_eq!(flaky.escalation_calls(), 3);
    assert_eq!(store.lead("late").unwrap().stage, LeadStage::Escalated);
    assert_eq!(events.recv().await.unwrap(), SchedulerEvent::Escalated { lead_id: "late".into() });
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_report_failure_and_retry_next_pass() {
    let store = InMemoryLeadStore::new([overdue_lead("late")]);
    let flaky = FlakyLeadStore::new(store.clone(), 3);
    let notifier = RecordingNotifier::default();
    let scheduler = scheduler(Arc::new(flaky.clone()), &notifier);
    let mut events = scheduler.subscribe();

    scheduler.reconcile().await.unwrap();
    scheduler.settle().await;

    match events.recv().await.unwrap() {
        SchedulerEvent::EscalationFailed { lead_id, attempts, error } => {
            assert_eq!(lead_id, "late");
            assert_eq!(attempts, 3);
            assert!(matches!(error, LeadflowError::TransientStore(_)));
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(store.lead("late").unwrap().stage, LeadStage::Pending);
    assert!(scheduler.timer_states().is_empty());

    // Store recovered; the next pass picks the lead up again
    let report = scheduler.reconcile().await.unwrap();
    assert_eq!(report.escalated_now, vec!["late".to_string()]);
    scheduler.settle().await;
    assert_eq!(store.lead("late").unwrap().stage, LeadStage::Escalated);
}

#[tokio::test(start_paused = true)]
async fn background_sweep_arms_new_leads() {
    let store = InMemoryLeadStore::default();
    let notifier = RecordingNotifier::default();
    let mut scheduler = scheduler(Arc::new(store.clone()), &notifier);

    scheduler.start().await.unwrap();
    assert!(scheduler.start().await.is_err());

    store.insert(overdue_lead("late"));
    // Next sweep runs one interval after the first
    tokio::time::sleep(Duration::from_secs(61)).await;

    assert_eq!(store.lead("late").unwrap().stage, LeadStage::Escalated);

    scheduler.stop().await.unwrap();
    assert!(!scheduler.is_running());
}
