//! Escalation scheduler for the pending lead pool.
//!
//! Keeps exactly one timer slot per pending, uncaptured lead. A periodic
//! sweep (or an explicit [`EscalationScheduler::reconcile`] call) diffs the
//! store's pending pool against the slot arena and patches the difference:
//! new leads are armed, captured or removed leads are cancelled, and leads
//! whose deadline already passed are escalated in the same pass.
//!
//! When a timer fires the lead is marked escalated through the store, with
//! bounded exponential backoff on retryable failures. Every escalation and
//! every exhausted retry is broadcast as a [`SchedulerEvent`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use leadflow_core::SystemClock;
//! use leadflow_infra::scheduling::{EscalationScheduler, EscalationSchedulerConfig};
//! use leadflow_infra::{InMemoryLeadStore, TracingNotifier};
//!
//! # async fn example() -> Result<(), leadflow_infra::SchedulerError> {
//! let mut scheduler = EscalationScheduler::new(
//!     Arc::new(InMemoryLeadStore::default()),
//!     Arc::new(TracingNotifier),
//!     Arc::new(SystemClock),
//!     EscalationSchedulerConfig::default(),
//! );
//!
//! let mut events = scheduler.subscribe();
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # drop(events.try_recv());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use leadflow_common::{retry_classified, RetryConfig, RetryError};
use leadflow_core::{plan_reconciliation, Clock, LeadStore, Notifier, ReconcilePlan, SlotState};
use leadflow_domain::constants::SCHEDULER_EVENT_CAPACITY;
use leadflow_domain::{LeadflowError, PoolFilter, QueueConfig};
use parking_lot::Mutex as SlotLock;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the escalation scheduler
#[derive(Debug, Clone)]
pub struct EscalationSchedulerConfig {
    /// Escalation delay measured from lead creation
    pub timeout: chrono::Duration,
    /// Period of the background reconciliation sweep
    pub sweep_interval: Duration,
    pub pool: PoolFilter,
    /// Timeout for each store call
    pub store_timeout: Duration,
    /// Backoff for the escalation write
    pub retry: RetryConfig,
}

impl EscalationSchedulerConfig {
    pub fn from_queue(queue: &QueueConfig) -> Self {
        Self {
            timeout: queue.timeout(),
            sweep_interval: queue.sweep_interval(),
            pool: queue.pool.clone().map(PoolFilter::pool).unwrap_or_default(),
            store_timeout: queue.store_timeout(),
            retry: RetryConfig::exponential(
                queue.max_escalation_attempts,
                Duration::from_millis(queue.initial_backoff_ms),
                Duration::from_millis(queue.max_backoff_ms),
            ),
        }
    }
}

impl Default for EscalationSchedulerConfig {
    fn default() -> Self {
        Self::from_queue(&QueueConfig::default())
    }
}

/// Broadcast to subscribers as escalations resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SchedulerEvent {
    Escalated { lead_id: String },
    /// The lead stays pending; the next sweep tries again
    EscalationFailed { lead_id: String, attempts: u32, error: LeadflowError },
}

/// What one reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub armed: usize,
    pub rearmed: usize,
    pub cancelled: usize,
    /// Leads whose deadline had already passed
    pub escalated_now: Vec<String>,
    pub unchanged: usize,
}

impl From<&ReconcilePlan> for ReconcileReport {
    fn from(plan: &ReconcilePlan) -> Self {
        Self {
            armed: plan.arm.len(),
            rearmed: plan.rearm.len(),
            cancelled: plan.cancel.len(),
            escalated_now: plan.escalate_now.clone(),
            unchanged: plan.unchanged,
        }
    }
}

struct TimerSlot {
    state: SlotState,
    /// Distinguishes a slot from the one it replaced
    generation: u64,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

/// State shared between the scheduler handle, the sweep loop and every timer
/// task.
struct Shared {
    store: Arc<dyn LeadStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: EscalationSchedulerConfig,
    slots: SlotLock<HashMap<String, TimerSlot>>,
    next_generation: AtomicU64,
    events: broadcast::Sender<SchedulerEvent>,
}

/// Escalation scheduler with explicit lifecycle
pub struct EscalationScheduler {
    shared: Arc<Shared>,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl EscalationScheduler {
    pub fn new(
        store: Arc<dyn LeadStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: EscalationSchedulerConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(SCHEDULER_EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                store,
                notifier,
                clock,
                config,
                slots: SlotLock::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                events,
            }),
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.shared.events.subscribe()
    }

    /// Start the background sweep
    ///
    /// Reconciles immediately, then once per sweep interval.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is already running
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!("Starting escalation scheduler");

        // Create a new cancellation token (supports restart after stop)
        self.cancellation_token = CancellationToken::new();

        let shared = Arc::clone(&self.shared);
        let cancel = self.cancellation_token.clone();
        let handle = tokio::spawn(async move {
            Self::sweep_loop(shared, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Escalation scheduler started");
        Ok(())
    }

    /// Stop the sweep and cancel every armed timer
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is not running
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping escalation scheduler");

        self.cancellation_token.cancel();

        let stopped = if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = Duration::from_secs(5);
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|source| SchedulerError::Timeout { duration: join_timeout, source })
                .and_then(|joined| joined.map_err(SchedulerError::from))
        } else {
            Ok(())
        };

        let cancelled = self.shared.cancel_all();
        info!(cancelled_timers = cancelled, "Escalation scheduler stopped");

        stopped
    }

    /// Check if scheduler is running
    ///
    /// A scheduler is considered running if it has an active task handle that
    /// hasn't finished.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// Run one reconciliation pass now.
    ///
    /// Safe to call at any time, running or not. Repeating it without pool
    /// changes arms nothing and escalates nothing.
    #[instrument(skip(self))]
    pub async fn reconcile(&self) -> SchedulerResult<ReconcileReport> {
        self.shared.reconcile().await
    }

    /// Wait for escalations already in flight to resolve.
    pub async fn settle(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut slots = self.shared.slots.lock();
            slots
                .values_mut()
                .filter(|slot| matches!(slot.state, SlotState::Escalating))
                .filter_map(|slot| slot.handle.take())
                .collect()
        };

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "escalation task ended abnormally");
            }
        }
    }

    /// Snapshot of the slot arena, keyed by lead id.
    pub fn timer_states(&self) -> HashMap<String, SlotState> {
        self.shared.slots.lock().iter().map(|(id, slot)| (id.clone(), slot.state)).collect()
    }

    /// Background sweep loop
    async fn sweep_loop(shared: Arc<Shared>, cancel: CancellationToken) {
        let interval = shared.config.sweep_interval;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Sweep loop cancelled");
                    break;
                }
                result = shared.reconcile() => {
                    if let Err(e) = result {
                        error!(error = %e, "Reconciliation pass failed");
                    }
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Sweep loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }
}

impl Shared {
    async fn reconcile(self: &Arc<Self>) -> SchedulerResult<ReconcileReport> {
        let store_timeout = self.config.store_timeout;
        let pending =
            tokio::time::timeout(store_timeout, self.store.list_pending(&self.config.pool))
                .await
                .map_err(|source| SchedulerError::Timeout { duration: store_timeout, source })?
                .map_err(|source| SchedulerError::Repository {
                    operation: "list_pending",
                    source,
                })?;

        let now = self.clock.now();
        let report = {
            let mut slots = self.slots.lock();
            let states: HashMap<String, SlotState> =
                slots.iter().map(|(id, slot)| (id.clone(), slot.state)).collect();
            let plan = plan_reconciliation(now, self.config.timeout, &pending, &states);

            for id in &plan.cancel {
                if let Some(slot) = slots.remove(id) {
                    slot.cancel.cancel();
                }
            }
            for (id, deadline) in plan.arm.iter().chain(plan.rearm.iter()) {
                if let Some(old) = slots.remove(id) {
                    old.cancel.cancel();
                }
                slots.insert(id.clone(), self.spawn_timer(id.clone(), *deadline, now));
            }
            for id in &plan.escalate_now {
                if let Some(old) = slots.remove(id) {
                    old.cancel.cancel();
                }
                slots.insert(id.clone(), self.spawn_escalation(id.clone()));
            }

            ReconcileReport::from(&plan)
        };

        if report.armed + report.rearmed + report.cancelled + report.escalated_now.len() > 0 {
            info!(
                pending = pending.len(),
                armed = report.armed,
                rearmed = report.rearmed,
                cancelled = report.cancelled,
                escalated_now = report.escalated_now.len(),
                unchanged = report.unchanged,
                "Lead queue reconciled"
            );
        } else {
            debug!(pending = pending.len(), unchanged = report.unchanged, "Lead queue unchanged");
        }

        Ok(report)
    }

    fn next_generation(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::Relaxed)
    }

    /// Arm a countdown that escalates at `deadline`.
    fn spawn_timer(
        self: &Arc<Self>,
        lead_id: String,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> TimerSlot {
        let generation = self.next_generation();
        let cancel = CancellationToken::new();
        let delay = (deadline - now).to_std().unwrap_or(Duration::ZERO);

        let shared = Arc::clone(self);
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(lead_id = %lead_id, "Escalation timer cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    if shared.begin_escalation(&lead_id, generation) {
                        shared.escalate(&lead_id, generation, &token).await;
                    }
                }
            }
        });

        TimerSlot { state: SlotState::Armed { deadline }, generation, cancel, handle: Some(handle) }
    }

    /// Escalate right away, without a timer.
    fn spawn_escalation(self: &Arc<Self>, lead_id: String) -> TimerSlot {
        let generation = self.next_generation();
        let cancel = CancellationToken::new();

        let shared = Arc::clone(self);
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            shared.escalate(&lead_id, generation, &token).await;
        });

        TimerSlot { state: SlotState::Escalating, generation, cancel, handle: Some(handle) }
    }

    /// Move an armed slot to `Escalating`; `false` if it was replaced or
    /// dropped meanwhile.
    fn begin_escalation(&self, lead_id: &str, generation: u64) -> bool {
        let mut slots = self.slots.lock();
        match slots.get_mut(lead_id) {
            Some(slot)
                if slot.generation == generation
                    && matches!(slot.state, SlotState::Armed { .. }) =>
            {
                slot.state = SlotState::Escalating;
                true
            }
            _ => false,
        }
    }

    /// Settle the slot for `generation`: keep it in `next` state or drop it.
    fn finish(&self, lead_id: &str, generation: u64, next: Option<SlotState>) {
        let mut slots = self.slots.lock();
        let owned = slots.get(lead_id).is_some_and(|slot| slot.generation == generation);
        if !owned {
            return;
        }
        match next {
            Some(state) => {
                if let Some(slot) = slots.get_mut(lead_id) {
                    slot.state = state;
                    slot.handle = None;
                }
            }
            None => {
                slots.remove(lead_id);
            }
        }
    }

    async fn escalate(&self, lead_id: &str, generation: u64, cancel: &CancellationToken) {
        let store_timeout = self.config.store_timeout;
        let operation = || {
            let store = Arc::clone(&self.store);
            let id = lead_id.to_string();
            async move {
                tokio::time::timeout(store_timeout, store.mark_escalated(&id)).await.map_err(
                    |_| {
                        LeadflowError::TransientStore(format!(
                            "mark_escalated timed out after {store_timeout:?}"
                        ))
                    },
                )?
            }
        };

        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(lead_id, "Escalation abandoned on shutdown");
                return;
            }
            outcome = retry_classified(&self.config.retry, operation) => outcome,
        };
        let attempts = outcome.attempts;

        match outcome.result {
            Ok(true) => {
                self.finish(lead_id, generation, Some(SlotState::Escalated));
                info!(lead_id, attempts, "Lead escalated");
                self.emit(SchedulerEvent::Escalated { lead_id: lead_id.to_string() });

                if let Err(e) = self.notifier.notify_escalated(lead_id).await {
                    warn!(lead_id, error = %e, "Failed to notify escalation");
                }
            }
            Ok(false) => {
                self.finish(lead_id, generation, None);
                debug!(lead_id, "Lead left the pending pool before escalation");
            }
            Err(RetryError::NonRetryable { source: LeadflowError::NotFound(_) }) => {
                self.finish(lead_id, generation, None);
                debug!(lead_id, "Lead removed before escalation");
            }
            Err(err) => {
                let source = match err {
                    RetryError::AttemptsExhausted { last, .. } => last,
                    RetryError::NonRetryable { source } => source,
                    RetryError::InvalidConfiguration { message } => LeadflowError::Config(message),
                };
                self.finish(lead_id, generation, None);

                let failure = SchedulerError::RetryExhausted {
                    lead_id: lead_id.to_string(),
                    attempts,
                    source: source.clone(),
                };
                error!(lead_id, attempts, error = %failure, "Escalation failed");
                self.emit(SchedulerEvent::EscalationFailed {
                    lead_id: lead_id.to_string(),
                    attempts,
                    error: source,
                });
            }
        }
    }

    fn emit(&self, event: SchedulerEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Cancel and drop every slot. Returns how many were dropped.
    fn cancel_all(&self) -> usize {
        let mut slots = self.slots.lock();
        let count = slots.len();
        for (_, slot) in slots.drain() {
            slot.cancel.cancel();
        }
        count
    }
}

/// Ensure timers stop when the scheduler is dropped
impl Drop for EscalationScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("EscalationScheduler dropped while running; cancelling");
        }
        self.cancellation_token.cancel();
        self.shared.cancel_all();
    }
}
