//! Integration tests for threshold-driven classification

mod support;

use std::sync::Arc;

use chrono::Duration;
use leadflow_core::{FixedClock, StalenessService};
use leadflow_domain::{Lead, LeadflowError, SlaThresholds, StalenessBucket};
use support::base_time;
use support::repositories::{MockLeadStore, MockThresholdStore};

fn owned(id: &str, agent: &str, days_since_contact: Option<i64>) -> Lead {
    let mut lead = Lead::new(id, "inbound", base_time() - Duration::days(90));
    lead.captured_by = Some(agent.to_string());
    lead.last_contact_at = days_since_contact.map(|days| base_time() - Duration::days(days));
    lead
}

fn service(store: MockLeadStore) -> StalenessService {
    StalenessService::new(
        Arc::new(MockThresholdStore::new(SlaThresholds::default())),
        Arc::new(store),
        Arc::new(FixedClock::new(base_time())),
    )
}

#[tokio::test]
async fn threshold_update_applies_to_the_next_call() {
    // Arrange
    let lead = owned("lead-1", "agent-a", Some(10));
    let service = service(MockLeadStore::new(vec![lead.clone()]));
    assert_eq!(service.classify_lead(&lead).await.unwrap(), StalenessBucket::Yellow);

    // Act
    service.set_thresholds(10, 20).await.unwrap();

    // Assert
    assert_eq!(service.classify_lead(&lead).await.unwrap(), StalenessBucket::Green);
}

#[tokio::test]
async fn invalid_thresholds_are_rejected_without_writing() {
    let service = service(MockLeadStore::default());

    let err = service.set_thresholds(30, 30).await.unwrap_err();

    assert!(matches!(err, LeadflowError::Validation(_)));
    assert_eq!(service.thresholds().await.unwrap(), SlaThresholds::default());
}

#[tokio::test]
async fn wallet_counts_temperatures_for_one_agent() {
    let store = MockLeadStore::new(vec![
        owned("a", "agent-a", Some(1)),
        owned("b", "agent-a", Some(7)),
        owned("c", "agent-a", Some(8)),
        owned("d", "agent-a", None),
        owned("e", "agent-b", Some(1)),
    ]);
    let service = service(store);

    let wallet = service.wallet_for("agent-a").await.unwrap();

    assert_eq!((wallet.hot, wallet.warm, wallet.cold, wallet.total), (2, 1, 1, 4));
    assert_eq!(wallet.agent_id, "agent-a");
}
