//! Claim coordinator.
//!
//! A claim is a single compare-and-set against the authoritative store's
//! capture field. The store's atomicity orders concurrent claims; the
//! coordinator never breaks ties itself and never retries a failed claim.
//!
//! Duplicate submissions by the same agent for the same lead, made while the
//! first is still unresolved, share that first request's store round-trip.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use leadflow_domain::{ClaimAttempt, ClaimOutcome, Result};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::clock::Clock;
use crate::leads::ports::{LeadStore, Notifier};

type SharedClaim = Shared<BoxFuture<'static, Result<ClaimOutcome>>>;
type ClaimKey = (String, String);

pub struct ClaimCoordinator {
    inner: Arc<Inner>,
    in_flight: Arc<Mutex<HashMap<ClaimKey, SharedClaim>>>,
}

struct Inner {
    store: Arc<dyn LeadStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl ClaimCoordinator {
    pub fn new(
        store: Arc<dyn LeadStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner { store, notifier, clock, store_timeout }),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Try to capture `lead_id` for `agent_id`.
    ///
    /// - `Granted`: this agent now owns the lead; the store wrote its history
    ///   entry together with the capture
    /// - `AlreadyClaimed`: another agent won (or already owned it)
    /// - `NotEligible`: the lead is not publicly claimable, or the store call
    ///   timed out and the outcome is unknown
    ///
    /// # Errors
    /// `NotFound` for unknown leads; store failures are returned as-is with
    /// no retry.
    #[instrument(skip(self))]
    pub async fn claim(&self, lead_id: &str, agent_id: &str) -> Result<ClaimOutcome> {
        let key: ClaimKey = (lead_id.to_string(), agent_id.to_string());

        let request = {
            let mut in_flight = self.in_flight.lock();
            if let Some(existing) = in_flight.get(&key) {
                debug!("joining in-flight claim request");
                existing.clone()
            } else {
                let attempt = ClaimAttempt::new(lead_id, agent_id, self.inner.clock.now());
                let request = Arc::clone(&self.inner).resolve(attempt).boxed().shared();
                in_flight.insert(key.clone(), request.clone());
                request
            }
        };

        let outcome = request.clone().await;

        let mut in_flight = self.in_flight.lock();
        if in_flight.get(&key).is_some_and(|current| current.ptr_eq(&request)) {
            in_flight.remove(&key);
        }

        outcome
    }

    /// Number of unresolved claim requests.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }
}

impl Inner {
    async fn resolve(self: Arc<Self>, attempt: ClaimAttempt) -> Result<ClaimOutcome> {
        let ClaimAttempt { lead_id, agent_id, submitted_at } = &attempt;

        let swapped = match tokio::time::timeout(
            self.store_timeout,
            self.store.compare_and_set_capture(lead_id, agent_id, *submitted_at),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    lead_id = %lead_id,
                    agent_id = %agent_id,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "claim timed out; outcome unknown"
                );
                return Ok(ClaimOutcome::NotEligible);
            }
        };

        let outcome = if swapped {
            ClaimOutcome::Granted
        } else {
            let lead = self.store.get_by_id(lead_id).await?;
            if lead.is_captured() {
                ClaimOutcome::AlreadyClaimed
            } else {
                ClaimOutcome::NotEligible
            }
        };

        info!(lead_id = %lead_id, agent_id = %agent_id, outcome = %outcome, "claim resolved");

        if let Err(err) = self.notifier.notify_claim_outcome(agent_id, lead_id, outcome).await {
            warn!(error = %err, lead_id = %lead_id, "failed to notify claim outcome");
        }

        Ok(outcome)
    }
}
