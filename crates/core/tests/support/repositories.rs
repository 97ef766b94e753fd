//! Mock port implementations for testing
//!
//! Provides in-memory mocks for the core ports, enabling deterministic tests
//! without database dependencies.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadflow_core::{LeadStore, Notifier, TargetDirectory, ThresholdStore};
use leadflow_domain::{
    ClaimOutcome, DistributionTarget, Lead, LeadHistoryEntry, LeadPatch, LeadStage,
    LeadflowError, PoolFilter, Result as DomainResult, SlaThresholds,
};
use parking_lot::Mutex;

/// In-memory mock for `LeadStore`.
///
/// The capture compare-and-set runs under one lock, which makes it the
/// single authoritative arbiter for concurrent claims.
#[derive(Default, Clone)]
pub struct MockLeadStore {
    leads: Arc<Mutex<HashMap<String, Lead>>>,
    history: Arc<Mutex<Vec<LeadHistoryEntry>>>,
    cas_calls: Arc<AtomicUsize>,
    cas_delay: Option<Duration>,
    cas_failure: Option<LeadflowError>,
}

impl MockLeadStore {
    pub fn new(leads: Vec<Lead>) -> Self {
        let store = Self::default();
        for lead in leads {
            store.insert(lead);
        }
        store
    }

    /// Sleep before every compare-and-set.
    pub fn with_cas_delay(mut self, delay: Duration) -> Self {
        self.cas_delay = Some(delay);
        self
    }

    /// Fail every compare-and-set with `error`.
    pub fn with_cas_failure(mut self, error: LeadflowError) -> Self {
        self.cas_failure = Some(error);
        self
    }

    pub fn insert(&self, lead: Lead) {
        self.leads.lock().insert(lead.id.clone(), lead);
    }

    pub fn lead(&self, id: &str) -> Option<Lead> {
        self.leads.lock().get(id).cloned()
    }

    pub fn history(&self) -> Vec<LeadHistoryEntry> {
        self.history.lock().clone()
    }

    pub fn cas_calls(&self) -> usize {
        self.cas_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LeadStore for MockLeadStore {
    async fn list_pending(&self, filter: &PoolFilter) -> DomainResult<Vec<Lead>> {
        let mut leads: Vec<Lead> = self
            .leads
            .lock()
            .values()
            .filter(|lead| lead.stage == LeadStage::Pending && filter.matches(lead))
            .cloned()
            .collect();
        leads.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(leads)
    }

    async fn get_by_id(&self, id: &str) -> DomainResult<Lead> {
        self.lead(id).ok_or_else(|| LeadflowError::NotFound(format!("lead {id}")))
    }

    async fn compare_and_set_capture(
        &self,
        id: &str,
        new_owner: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<bool> {
        self.cas_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.cas_delay {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        if let Some(err) = &self.cas_failure {
            return Err(err.clone());
        }

        let mut leads = self.leads.lock();
        match leads.get_mut(id) {
            Some(lead) if lead.is_claimable() => {
                lead.captured_by = Some(new_owner.to_string());
                lead.stage = LeadStage::Claimed;
                self.history.lock().push(LeadHistoryEntry::captured(id, new_owner, at));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_escalated(&self, id: &str) -> DomainResult<bool> {
        let mut leads = self.leads.lock();
        let lead =
            leads.get_mut(id).ok_or_else(|| LeadflowError::NotFound(format!("lead {id}")))?;
        if lead.awaits_escalation() {
            lead.stage = LeadStage::Escalated;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn update(&self, id: &str, patch: &LeadPatch) -> DomainResult<Lead> {
        let mut leads = self.leads.lock();
        let lead =
            leads.get_mut(id).ok_or_else(|| LeadflowError::NotFound(format!("lead {id}")))?;
        patch.apply(lead);
        Ok(lead.clone())
    }

    async fn append_history(&self, entry: &LeadHistoryEntry) -> DomainResult<()> {
        self.history.lock().push(entry.clone());
        Ok(())
    }

    async fn list_by_owner(&self, agent_id: &str) -> DomainResult<Vec<Lead>> {
        let mut leads: Vec<Lead> = self
            .leads
            .lock()
            .values()
            .filter(|lead| lead.captured_by.as_deref() == Some(agent_id))
            .cloned()
            .collect();
        leads.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(leads)
    }
}

/// Records every notification it receives.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    escalated: Arc<Mutex<Vec<String>>>,
    outcomes: Arc<Mutex<Vec<(String, String, ClaimOutcome)>>>,
    fail: bool,
}

impl RecordingNotifier {
    /// A notifier whose every call fails after recording.
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn escalated(&self) -> Vec<String> {
        self.escalated.lock().clone()
    }

    pub fn outcomes(&self) -> Vec<(String, String, ClaimOutcome)> {
        self.outcomes.lock().clone()
    }

    fn result(&self) -> DomainResult<()> {
        if self.fail {
            Err(LeadflowError::Internal("notifier offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_escalated(&self, lead_id: &str) -> DomainResult<()> {
        self.escalated.lock().push(lead_id.to_string());
        self.result()
    }

    async fn notify_claim_outcome(
        &self,
        agent_id: &str,
        lead_id: &str,
        outcome: ClaimOutcome,
    ) -> DomainResult<()> {
        self.outcomes.lock().push((agent_id.to_string(), lead_id.to_string(), outcome));
        self.result()
    }
}

/// In-memory mock for `ThresholdStore`.
#[derive(Default, Clone)]
pub struct MockThresholdStore {
    current: Arc<Mutex<SlaThresholds>>,
}

impl MockThresholdStore {
    pub fn new(thresholds: SlaThresholds) -> Self {
        Self { current: Arc::new(Mutex::new(thresholds)) }
    }
}

#[async_trait]
impl ThresholdStore for MockThresholdStore {
    async fn get_thresholds(&self) -> DomainResult<SlaThresholds> {
        Ok(*self.current.lock())
    }

    async fn set_thresholds(&self, thresholds: SlaThresholds) -> DomainResult<()> {
        *self.current.lock() = thresholds;
        Ok(())
    }
}

/// Fixed set of targets for `TargetDirectory`.
#[derive(Default, Clone)]
pub struct MockTargetDirectory {
    targets: Arc<Vec<DistributionTarget>>,
}

impl MockTargetDirectory {
    pub fn new(targets: Vec<DistributionTarget>) -> Self {
        Self { targets: Arc::new(targets) }
    }
}

#[async_trait]
impl TargetDirectory for MockTargetDirectory {
    async fn get_target(&self, id: &str) -> DomainResult<DistributionTarget> {
        self.targets
            .iter()
            .find(|target| target.id == id)
            .cloned()
            .ok_or_else(|| LeadflowError::NotFound(format!("target {id}")))
    }

    async fn list_targets(&self) -> DomainResult<Vec<DistributionTarget>> {
        Ok(self.targets.to_vec())
    }
}
