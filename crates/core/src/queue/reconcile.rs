//! Pure diff between the pending pool and the scheduler's timer slots

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use leadflow_domain::Lead;

/// State of the timer slot held for one lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Countdown running, fires at `deadline`
    Armed { deadline: DateTime<Utc> },
    /// Escalation write in flight (or backing off between retries)
    Escalating,
    /// Escalation written; kept until the lead leaves the pending pool
    Escalated,
}

/// Changes needed to bring the slots in line with the pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// New countdowns, `(lead id, deadline)`
    pub arm: Vec<(String, DateTime<Utc>)>,
    /// Countdowns whose deadline moved
    pub rearm: Vec<(String, DateTime<Utc>)>,
    /// Slots to drop: lead captured, escalated or removed
    pub cancel: Vec<String>,
    /// Deadline already passed: escalate in this pass, no timer
    pub escalate_now: Vec<String>,
    /// Slots left exactly as they were
    pub unchanged: usize,
}

impl ReconcilePlan {
    pub fn is_noop(&self) -> bool {
        self.arm.is_empty()
            && self.rearm.is_empty()
            && self.cancel.is_empty()
            && self.escalate_now.is_empty()
    }
}

/// Diff `pending` (as listed by the store) against the current `slots`.
///
/// - an uncaptured pending lead without a slot is armed, or escalated now if
///   its deadline is not in the future
/// - an armed slot with the same deadline is left alone
/// - `Escalating` slots are never touched; the in-flight task owns them
/// - slots for leads that are captured or gone from the pool are cancelled
pub fn plan_reconciliation(
    now: DateTime<Utc>,
    timeout: Duration,
    pending: &[Lead],
    slots: &HashMap<String, SlotState>,
) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();
    let mut wanted: HashSet<&str> = HashSet::new();

    for lead in pending.iter().filter(|lead| lead.awaits_escalation()) {
        if !wanted.insert(lead.id.as_str()) {
            continue;
        }
        let deadline = lead.escalation_deadline(timeout);
        let overdue = deadline <= now;

        match slots.get(&lead.id) {
            Some(SlotState::Armed { deadline: current }) if *current == deadline => {
                plan.unchanged += 1;
            }
            Some(SlotState::Armed { .. }) if overdue => plan.escalate_now.push(lead.id.clone()),
            Some(SlotState::Armed { .. }) => plan.rearm.push((lead.id.clone(), deadline)),
            Some(SlotState::Escalating | SlotState::Escalated) => plan.unchanged += 1,
            None if overdue => plan.escalate_now.push(lead.id.clone()),
            None => plan.arm.push((lead.id.clone(), deadline)),
        }
    }

    let mut stale: Vec<String> = slots
        .iter()
        .filter(|(id, state)| {
            !wanted.contains(id.as_str()) && !matches!(state, SlotState::Escalating)
        })
        .map(|(id, _)| id.clone())
        .collect();
    stale.sort();
    plan.cancel = stale;

    plan
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 2, 10, 0, 0).unwrap()
    }

    fn timeout() -> Duration {
        Duration::minutes(30)
    }

    fn lead(id: &str, minutes_ago: i64) -> Lead {
        Lead::new(id, "inbound", now() - Duration::minutes(minutes_ago))
    }

    /// Apply a plan the way the scheduler does, minus the side effects.
    fn apply(plan: &ReconcilePlan, slots: &mut HashMap<String, SlotState>) {
        for id in &plan.cancel {
            slots.remove(id);
        }
        for (id, deadline) in plan.arm.iter().chain(plan.rearm.iter()) {
            slots.insert(id.clone(), SlotState::Armed { deadline: *deadline });
        }
        for id in &plan.escalate_now {
            slots.insert(id.clone(), SlotState::Escalated);
        }
    }

    #[test]
    fn arms_new_leads_with_creation_based_deadline() {
        let pending = vec![lead("a", 5)];
        let plan = plan_reconciliation(now(), timeout(), &pending, &HashMap::new());

        assert_eq!(plan.arm, vec![("a".to_string(), now() + Duration::minutes(25))]);
        assert!(plan.escalate_now.is_empty());
    }

    #[test]
    fn overdue_leads_escalate_immediately() {
        let pending = vec![lead("late", 31), lead("exact", 30)];
        let plan = plan_reconciliation(now(), timeout(), &pending, &HashMap::new());

        assert_eq!(plan.escalate_now, vec!["late".to_string(), "exact".to_string()]);
        assert!(plan.arm.is_empty());
    }

    #[test]
    fn second_pass_without_changes_is_a_noop() {
        let pending = vec![lead("a", 5), lead("b", 10), lead("c", 45)];
        let mut slots = HashMap::new();

        let first = plan_reconciliation(now(), timeout(), &pending, &slots);
        apply(&first, &mut slots);
        // "c" was escalated: the store no longer lists it as pending
        let pending: Vec<Lead> = pending.into_iter().filter(|l| l.id != "c").collect();

        let second = plan_reconciliation(now(), timeout(), &pending, &slots);
        apply(&second, &mut slots);
        let third = plan_reconciliation(now(), timeout(), &pending, &slots);

        assert_eq!(second.cancel, vec!["c".to_string()]);
        assert!(third.is_noop());
        assert_eq!(third.unchanged, 2);
    }

    #[test]
    fn captured_and_removed_leads_are_cancelled() {
        let mut captured = lead("a", 5);
        captured.captured_by = Some("agent-1".into());
        let mut slots = HashMap::new();
        let deadline = now() + Duration::minutes(25);
        slots.insert("a".to_string(), SlotState::Armed { deadline });
        slots.insert("gone".to_string(), SlotState::Armed { deadline });

        let plan = plan_reconciliation(now(), timeout(), &[captured], &slots);
        assert_eq!(plan.cancel, vec!["a".to_string(), "gone".to_string()]);
    }

    #[test]
    fn in_flight_escalations_are_left_alone() {
        let mut slots = HashMap::new();
        slots.insert("busy".to_string(), SlotState::Escalating);

        let plan = plan_reconciliation(now(), timeout(), &[], &slots);
        assert!(plan.is_noop());

        let plan = plan_reconciliation(now(), timeout(), &[lead("busy", 40)], &slots);
        assert!(plan.is_noop());
        assert_eq!(plan.unchanged, 1);
    }

    #[test]
    fn moved_deadline_is_rearmed() {
        let mut slots = HashMap::new();
        slots.insert(
            "a".to_string(),
            SlotState::Armed { deadline: now() + Duration::minutes(2) },
        );

        let plan = plan_reconciliation(now(), timeout(), &[lead("a", 10)], &slots);
        assert_eq!(plan.rearm, vec![("a".to_string(), now() + Duration::minutes(20))]);
    }

    #[test]
    fn duplicate_pool_entries_yield_one_timer() {
        let pending = vec![lead("a", 5), lead("a", 5)];
        let plan = plan_reconciliation(now(), timeout(), &pending, &HashMap::new());
        assert_eq!(plan.arm.len(), 1);
    }
}
