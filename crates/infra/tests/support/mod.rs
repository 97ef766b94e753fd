//! Shared helpers for `leadflow-infra` integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use leadflow_core::{LeadStore, Notifier};
use leadflow_domain::{
    ClaimOutcome, Lead, LeadHistoryEntry, LeadPatch, LeadflowError, PoolFilter,
    Result as DomainResult,
};
use leadflow_infra::InMemoryLeadStore;
use parking_lot::Mutex;

/// Fixed reference instant used across tests.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap()
}

/// Notifier that records every escalation it is told about.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    escalated: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn escalated(&self) -> Vec<String> {
        self.escalated.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_escalated(&self, lead_id: &str) -> DomainResult<()> {
        self.escalated.lock().push(lead_id.to_string());
        Ok(())
    }

    async fn notify_claim_outcome(
        &self,
        _agent_id: &str,
        _lead_id: &str,
        _outcome: ClaimOutcome,
    ) -> DomainResult<()> {
        Ok(())
    }
}

/// Wraps an [`InMemoryLeadStore`] and fails the first `failures` escalation
/// writes with a transient error.
#[derive(Clone)]
pub struct FlakyLeadStore {
    inner: InMemoryLeadStore,
    failures: Arc<AtomicU32>,
    escalation_calls: Arc<AtomicU32>,
}

impl FlakyLeadStore {
    pub fn new(inner: InMemoryLeadStore, failures: u32) -> Self {
        Self {
            inner,
            failures: Arc::new(AtomicU32::new(failures)),
            escalation_calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn escalation_calls(&self) -> u32 {
        self.escalation_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LeadStore for FlakyLeadStore {
    async fn list_pending(&self, filter: &PoolFilter) -> DomainResult<Vec<Lead>> {
        self.inner.list_pending(filter).await
    }

    async fn get_by_id(&self, id: &str) -> DomainResult<Lead> {
        self.inner.get_by_id(id).await
    }

    async fn compare_and_set_capture(
        &self,
        id: &str,
        new_owner: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<bool> {
        self.inner.compare_and_set_capture(id, new_owner, at).await
    }

    async fn mark_escalated(&self, id: &str) -> DomainResult<bool> {
        self.escalation_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(LeadflowError::TransientStore("store unavailable".into()));
        }
        self.inner.mark_escalated(id).await
    }

    async fn update(&self, id: &str, patch: &LeadPatch) -> DomainResult<Lead> {
        self.inner.update(id, patch).await
    }

    async fn append_history(&self, entry: &LeadHistoryEntry) -> DomainResult<()> {
        self.inner.append_history(entry).await
    }

    async fn list_by_owner(&self, agent_id: &str) -> DomainResult<Vec<Lead>> {
        self.inner.list_by_owner(agent_id).await
    }
}
