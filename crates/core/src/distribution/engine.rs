//! Allocation strategies.
//!
//! Every strategy is a pure function of its request: identical strategy,
//! targets, scope and totals give identical rows. Buckets are processed in
//! [`UnitBucket::ALL`] order and targets in input order; the first target in
//! input order wins every tie.
//!
//! Conservation: `sum(row.total) + unassigned == scoped total`, with
//! `unassigned` only ever non-zero for capped roster strategies.

use std::collections::HashSet;

use leadflow_domain::{
    AllocationPreview, AllocationRow, AllocationTotals, DistributionScope, DistributionTarget,
    Member, StrategyType, TargetKind, UnitBucket,
};
use tracing::debug;

use super::error::AllocationError;

/// Inputs of one allocation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRequest {
    pub strategy: StrategyType,
    pub targets: Vec<DistributionTarget>,
    pub scope: DistributionScope,
    pub totals: AllocationTotals,
    /// Per-member cap for `by_team` and `by_store`
    pub max_items_per_person: Option<u32>,
}

impl AllocationRequest {
    pub fn new(
        strategy: StrategyType,
        targets: Vec<DistributionTarget>,
        scope: DistributionScope,
        totals: AllocationTotals,
    ) -> Self {
        Self { strategy, targets, scope, totals, max_items_per_person: None }
    }

    pub fn with_max_items_per_person(mut self, cap: Option<u32>) -> Self {
        self.max_items_per_person = cap;
        self
    }
}

/// Compute the per-destination allocation for `request`.
///
/// # Errors
/// [`AllocationError`] listing every violated constraint: no targets,
/// duplicate target ids, a zero cap, selected totals that overflow `u64`,
/// missing weighted quotas, mismatched roster target kinds or an empty
/// active roster.
pub fn allocate(request: &AllocationRequest) -> Result<AllocationPreview, AllocationError> {
    validate_common(request)?;

    let scoped = request.totals.scoped(&request.scope);
    let mut warnings = Vec::new();

    if request.scope.is_empty() {
        warnings.push("no lead buckets or properties selected; nothing to distribute".to_string());
    } else if scoped.total() == 0 {
        warnings.push("selected buckets are empty; nothing to distribute".to_string());
    }

    let (rows, unassigned) = match request.strategy {
        StrategyType::RoundRobin => (round_robin(&request.targets, &scoped), 0),
        StrategyType::Weighted => {
            (weighted(&request.targets, &request.scope, &scoped)?, 0)
        }
        StrategyType::ByTeam | StrategyType::ByStore => {
            let cap = request.max_items_per_person.map(u64::from);
            roster(request.strategy, &request.targets, &scoped, cap)?
        }
    };

    if let Some(cap) = request.max_items_per_person {
        if matches!(request.strategy, StrategyType::RoundRobin | StrategyType::Weighted) {
            warnings.push(format!(
                "max_items_per_person ({cap}) only applies to by_team and by_store; ignored"
            ));
        } else if unassigned > 0 {
            warnings.push(format!(
                "{unassigned} item(s) left unassigned: every active member reached \
                 max_items_per_person ({cap})"
            ));
        }
    }

    let mut totals = AllocationRow::new("total", "Total", None);
    for row in &rows {
        for bucket in UnitBucket::ALL {
            totals.add(bucket, row.get(bucket));
        }
    }

    debug!(
        strategy = %request.strategy,
        rows = rows.len(),
        assigned = totals.total,
        unassigned,
        "allocation computed"
    );

    Ok(AllocationPreview { strategy: request.strategy, rows, totals, unassigned, warnings })
}

fn validate_common(request: &AllocationRequest) -> Result<(), AllocationError> {
    let mut problems = Vec::new();

    if request.targets.is_empty() {
        problems.push("at least one distribution target is required".to_string());
    }

    let mut seen = HashSet::new();
    for target in &request.targets {
        if !seen.insert(target.id.as_str()) {
            problems.push(format!("duplicate target id '{}'", target.id));
        }
    }

    if request.max_items_per_person == Some(0) {
        problems.push("max_items_per_person must be a positive integer".to_string());
    }

    if request.totals.scoped(&request.scope).checked_total().is_none() {
        problems.push(format!("selected totals exceed {} units", u64::MAX));
    }

    match AllocationError::from_messages(problems) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn target_rows(targets: &[DistributionTarget]) -> Vec<AllocationRow> {
    targets.iter().map(|target| AllocationRow::new(&target.id, &target.name, None)).collect()
}

/// One unit per target per pass; the cursor carries over between buckets so
/// no target ends up more than one unit ahead of another.
fn round_robin(targets: &[DistributionTarget], scoped: &AllocationTotals) -> Vec<AllocationRow> {
    let mut rows = target_rows(targets);
    let count = rows.len();
    let mut cursor = 0usize;

    for bucket in UnitBucket::ALL {
        let units = scoped.get(bucket);
        if units == 0 {
            continue;
        }
        let base = units / count as u64;
        let extra = (units % count as u64) as usize;

        for row in rows.iter_mut() {
            row.add(bucket, base);
        }
        for offset in 0..extra {
            rows[(cursor + offset) % count].add(bucket, 1);
        }
        cursor = (cursor + extra) % count;
    }

    rows
}

/// Largest-remainder split proportional to each target's quota.
fn weighted(
    targets: &[DistributionTarget],
    scope: &DistributionScope,
    scoped: &AllocationTotals,
) -> Result<Vec<AllocationRow>, AllocationError> {
    let mut problems = Vec::new();

    for target in targets {
        if !scope.included().any(|bucket| target.quota_for(bucket) > 0) {
            problems.push(format!(
                "target '{}' has no positive quota for any selected bucket",
                target.id
            ));
        }
    }
    for bucket in scope.included() {
        let sum: u64 = targets.iter().map(|target| target.quota_for(bucket)).sum();
        if scoped.get(bucket) > 0 && sum == 0 {
            problems.push(format!("no target has a quota for {bucket}"));
        }
    }
    if let Some(err) = AllocationError::from_messages(problems) {
        return Err(err);
    }

    let mut rows = target_rows(targets);

    for bucket in UnitBucket::ALL {
        let units = scoped.get(bucket);
        if units == 0 {
            continue;
        }
        let quotas: Vec<u128> =
            targets.iter().map(|target| u128::from(target.quota_for(bucket))).collect();
        let sum: u128 = quotas.iter().sum();

        let mut assigned = 0u64;
        let mut remainders = Vec::with_capacity(quotas.len());
        for (index, quota) in quotas.iter().enumerate() {
            let numerator = u128::from(units) * quota;
            let share = (numerator / sum) as u64;
            rows[index].add(bucket, share);
            assigned += share;
            remainders.push((numerator % sum, index));
        }

        // Largest fractional part first, input order on ties.
        remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        let leftover = (units - assigned) as usize;
        for (_, index) in remainders.into_iter().take(leftover) {
            rows[index].add(bucket, 1);
        }
    }

    Ok(rows)
}

/// Even spread over the active members of team or store targets.
///
/// Returns the member rows and the number of units no member could take.
fn roster(
    strategy: StrategyType,
    targets: &[DistributionTarget],
    scoped: &AllocationTotals,
    cap: Option<u64>,
) -> Result<(Vec<AllocationRow>, u64), AllocationError> {
    let expected =
        if strategy == StrategyType::ByStore { TargetKind::Store } else { TargetKind::Team };
    let mut problems = Vec::new();

    for target in targets.iter().filter(|target| target.kind != expected) {
        problems.push(format!(
            "target '{}' is a {}; {strategy} expects {expected} targets",
            target.id, target.kind
        ));
    }

    let members = active_roster(targets);
    if members.is_empty() {
        problems.push("no active members across the selected targets".to_string());
    }
    if let Some(err) = AllocationError::from_messages(problems) {
        return Err(err);
    }

    let mut rows: Vec<AllocationRow> = members
        .iter()
        .map(|(member, parent)| AllocationRow::new(&member.id, &member.name, Some(parent.clone())))
        .collect();
    let count = rows.len();
    let headroom = |row: &AllocationRow| cap.map_or(u64::MAX, |cap| cap.saturating_sub(row.total));

    let mut cursor = 0usize;
    let mut unassigned = 0u64;

    for bucket in UnitBucket::ALL {
        let mut units = scoped.get(bucket);

        while units > 0 {
            let open: Vec<usize> = (0..count)
                .map(|offset| (cursor + offset) % count)
                .filter(|&index| headroom(&rows[index]) > 0)
                .collect();
            if open.is_empty() {
                break;
            }

            let room = open.iter().map(|&index| headroom(&rows[index])).min().unwrap_or(0);
            let passes = (units / open.len() as u64).min(room);
            if passes > 0 {
                for &index in &open {
                    rows[index].add(bucket, passes);
                }
                units -= passes * open.len() as u64;
                continue;
            }

            // Fewer units than open members: one each in cursor order.
            let take = units as usize;
            for &index in &open[..take] {
                rows[index].add(bucket, 1);
            }
            cursor = (open[take - 1] + 1) % count;
            units = 0;
        }

        unassigned += units;
    }

    Ok((rows, unassigned))
}

/// Active members in target order, each member once.
fn active_roster(targets: &[DistributionTarget]) -> Vec<(&Member, String)> {
    let mut seen = HashSet::new();
    let mut members = Vec::new();
    for target in targets {
        for member in target.active_members() {
            if seen.insert(member.id.as_str()) {
                members.push((member, target.id.clone()));
            }
        }
    }
    members
}
