//! Pure bucket classification.
//!
//! Two inputs are supported:
//! - elapsed whole days since a contact (wallet staleness), bucketed
//!   `green`/`yellow`/`red` against [`SlaThresholds`]
//! - time remaining until a deadline (ticket SLA), bucketed
//!   `ok`/`warning`/`overdue` against a warning window
//!
//! A missing or unparseable timestamp always lands in the worst bucket.

use chrono::{DateTime, Duration, Utc};
use leadflow_domain::{LeadTemperature, SlaStatus, SlaThresholds, StalenessBucket};

/// Whole days between `since` and `now`, floored and never negative.
pub fn elapsed_days(now: DateTime<Utc>, since: DateTime<Utc>) -> u32 {
    let days = (now - since).num_days().max(0);
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Bucket for a known number of elapsed days.
pub fn classify_elapsed_days(days: u32, thresholds: &SlaThresholds) -> StalenessBucket {
    if days <= thresholds.low_max() {
        StalenessBucket::Green
    } else if days <= thresholds.mid_max() {
        StalenessBucket::Yellow
    } else {
        StalenessBucket::Red
    }
}

/// Bucket for the time since `since`; `None` is `Red`.
pub fn classify_elapsed(
    now: DateTime<Utc>,
    since: Option<DateTime<Utc>>,
    thresholds: &SlaThresholds,
) -> StalenessBucket {
    match since {
        Some(since) => classify_elapsed_days(elapsed_days(now, since), thresholds),
        None => StalenessBucket::Red,
    }
}

/// Temperature of a lead given its last contact.
pub fn temperature(
    now: DateTime<Utc>,
    last_contact_at: Option<DateTime<Utc>>,
    thresholds: &SlaThresholds,
) -> LeadTemperature {
    classify_elapsed(now, last_contact_at, thresholds).into()
}

/// Status for the time left before a deadline; `None` is `Overdue`.
pub fn classify_remaining(remaining: Option<Duration>, warning_window: Duration) -> SlaStatus {
    match remaining {
        None => SlaStatus::Overdue,
        Some(left) if left < Duration::zero() => SlaStatus::Overdue,
        Some(left) if left <= warning_window => SlaStatus::Warning,
        Some(_) => SlaStatus::Ok,
    }
}

/// `created_at + sla_hours`, or `None` when the sum leaves chrono's range.
pub fn ticket_deadline(created_at: DateTime<Utc>, sla_hours: i64) -> Option<DateTime<Utc>> {
    Duration::try_hours(sla_hours).and_then(|sla| created_at.checked_add_signed(sla))
}

/// Ticket SLA status where `deadline = created_at + sla_hours`.
///
/// A deadline that cannot be represented counts as overdue.
pub fn classify_deadline(
    now: DateTime<Utc>,
    created_at: Option<DateTime<Utc>>,
    sla_hours: i64,
    warning_window: Duration,
) -> SlaStatus {
    let remaining = created_at
        .and_then(|created| ticket_deadline(created, sla_hours))
        .map(|deadline| deadline - now);
    classify_remaining(remaining, warning_window)
}

/// Parse an RFC 3339 timestamp; anything else is `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(trimmed).ok().map(|parsed| parsed.with_timezone(&Utc))
}
