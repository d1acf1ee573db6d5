//! Derived read-only projections over the alert collection.
//!
//! Views hold no state: each call recomputes from the engine's live
//! collection, so a fresh snapshot is always one call away.

use chrono::{DateTime, Duration, Utc};
use fleetmon_common::types::{Alert, AlertStats, AlertStatus, OffenderGroup, Severity};
use std::collections::HashMap;

/// Default group limit for the top-offenders ranking.
pub const DEFAULT_OFFENDER_LIMIT: usize = 5;

/// Default trailing window for the recently-auto-closed listing.
pub const DEFAULT_RECENT_HOURS: u64 = 24;

/// Sentinel group for alerts with no correlation value.
pub const UNKNOWN_KEY: &str = "Unknown";

/// Total and per-status counts, plus per-severity counts restricted to
/// the active subset.
pub fn stats(alerts: &[Alert]) -> AlertStats {
    let mut s = AlertStats {
        total: alerts.len(),
        ..AlertStats::default()
    };

    for alert in alerts {
        match alert.status {
            AlertStatus::Open => s.open += 1,
            AlertStatus::Escalated => s.escalated += 1,
            AlertStatus::AutoClosed => s.auto_closed += 1,
            AlertStatus::Resolved => s.resolved += 1,
        }
        if alert.status.is_active() {
            match alert.severity {
                Severity::Info => s.info += 1,
                Severity::Warning => s.warning += 1,
                Severity::Critical => s.critical += 1,
            }
        }
    }

    s
}

/// Active alerts grouped by correlation value, sorted descending by group
/// size and truncated to `limit`.
///
/// Ties keep first-encountered order (stable sort over insertion order).
/// Alerts with no correlation value fall into the [`UNKNOWN_KEY`] bucket.
/// Terminal alerts never contribute, so a key whose alerts are all
/// terminal does not appear at all.
pub fn top_offenders(alerts: &[Alert], correlation_field: &str, limit: usize) -> Vec<OffenderGroup> {
    let mut groups: Vec<OffenderGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for alert in alerts.iter().filter(|a| a.status.is_active()) {
        let key = alert
            .correlation_key(correlation_field)
            .unwrap_or_else(|| UNKNOWN_KEY.to_string());

        let idx = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(OffenderGroup {
                key,
                count: 0,
                critical_count: 0,
                alerts: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[idx];
        group.count += 1;
        if alert.severity == Severity::Critical {
            group.critical_count += 1;
        }
        group.alerts.push(alert.clone());
    }

    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups.truncate(limit);
    groups
}

/// Auto-closed alerts whose *creation* time falls within the trailing
/// `hours` window, newest-created first.
///
/// Filtering by creation time rather than the close-transition time
/// bounds the listing by incident age. Intentionally preserved behavior.
pub fn recent_auto_closed(alerts: &[Alert], now: DateTime<Utc>, hours: u64) -> Vec<Alert> {
    let cutoff = now - Duration::hours(hours as i64);
    let mut closed: Vec<Alert> = alerts
        .iter()
        .filter(|a| a.status == AlertStatus::AutoClosed && a.created_at >= cutoff)
        .cloned()
        .collect();
    closed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    closed
}
