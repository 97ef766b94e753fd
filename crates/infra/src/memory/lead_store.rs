//! Mutex-guarded in-process lead store
//!
//! Every mutation runs under one lock, so the capture compare-and-set is
//! linearizable across tasks and threads.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadflow_core::LeadStore;
use leadflow_domain::{
    Lead, LeadHistoryEntry, LeadPatch, LeadStage, LeadflowError, PoolFilter,
    Result as DomainResult,
};
use parking_lot::Mutex;

#[derive(Default)]
struct State {
    leads: HashMap<String, Lead>,
    history: Vec<LeadHistoryEntry>,
}

/// In-memory implementation of [`LeadStore`]. Clones share the same state.
#[derive(Default, Clone)]
pub struct InMemoryLeadStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryLeadStore {
    pub fn new(leads: impl IntoIterator<Item = Lead>) -> Self {
        let store = Self::default();
        for lead in leads {
            store.insert(lead);
        }
        store
    }

    /// Add or replace a lead.
    pub fn insert(&self, lead: Lead) {
        self.state.lock().leads.insert(lead.id.clone(), lead);
    }

    /// Drop a lead from the pool. Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        self.state.lock().leads.remove(id).is_some()
    }

    /// An agent picks up a pending lead before it is escalated.
    ///
    /// The lead keeps its `Pending` stage; the scheduler cancels its timer on
    /// the next pass. Returns `false` if the lead is already owned or no
    /// longer pending.
    pub fn capture_direct(&self, id: &str, agent_id: &str) -> DomainResult<bool> {
        let mut state = self.state.lock();
        let lead = state
            .leads
            .get_mut(id)
            .ok_or_else(|| LeadflowError::NotFound(format!("lead {id}")))?;
        if !lead.awaits_escalation() {
            return Ok(false);
        }
        lead.captured_by = Some(agent_id.to_string());
        Ok(true)
    }

    pub fn lead(&self, id: &str) -> Option<Lead> {
        self.state.lock().leads.get(id).cloned()
    }

    pub fn leads(&self) -> Vec<Lead> {
        let mut leads: Vec<Lead> = self.state.lock().leads.values().cloned().collect();
        leads.sort_by(|a, b| a.id.cmp(&b.id));
        leads
    }

    pub fn history(&self) -> Vec<LeadHistoryEntry> {
        self.state.lock().history.clone()
    }

    fn sorted<F>(&self, keep: F) -> Vec<Lead>
    where
        F: Fn(&Lead) -> bool,
    {
        let mut leads: Vec<Lead> =
            self.state.lock().leads.values().filter(|lead| keep(lead)).cloned().collect();
        leads.sort_by(|a, b| a.id.cmp(&b.id));
        leads
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn list_pending(&self, filter: &PoolFilter) -> DomainResult<Vec<Lead>> {
        Ok(self.sorted(|lead| lead.stage == LeadStage::Pending && filter.matches(lead)))
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
        let mut guard = self.state.lock();
        let state = &mut *guard;
        match state.leads.get_mut(id) {
            Some(lead) if lead.is_claimable() => {
                lead.captured_by = Some(new_owner.to_string());
                lead.stage = LeadStage::Claimed;
                state.history.push(LeadHistoryEntry::captured(id, new_owner, at));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_escalated(&self, id: &str) -> DomainResult<bool> {
        let mut state = self.state.lock();
        let lead = state
            .leads
            .get_mut(id)
            .ok_or_else(|| LeadflowError::NotFound(format!("lead {id}")))?;
        if lead.awaits_escalation() {
            lead.stage = LeadStage::Escalated;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn update(&self, id: &str, patch: &LeadPatch) -> DomainResult<Lead> {
        let mut state = self.state.lock();
        let lead = state
            .leads
            .get_mut(id)
            .ok_or_else(|| LeadflowError::NotFound(format!("lead {id}")))?;
        patch.apply(lead);
        Ok(lead.clone())
    }

    async fn append_history(&self, entry: &LeadHistoryEntry) -> DomainResult<()> {
        self.state.lock().history.push(entry.clone());
        Ok(())
    }

    async fn list_by_owner(&self, agent_id: &str) -> DomainResult<Vec<Lead>> {
        Ok(self.sorted(|lead| lead.captured_by.as_deref() == Some(agent_id)))
    }
}
