use crate::catalog::RuleCatalog;
use crate::error::{AlertError, Result};
use crate::event_log::EventLog;
use crate::{views, Clock, SystemClock};
use chrono::Duration;
use fleetmon_common::types::{
    Alert, AlertStats, AlertStatus, EventKind, EventLogEntry, Metadata, OffenderGroup, Severity,
    SourceType, StateHistoryEntry,
};
use serde_json::Value;
use std::sync::Arc;

/// History reason recorded on rule-driven escalation.
pub const REASON_RULE_THRESHOLD: &str = "Rule threshold exceeded";
/// History reason when a rule's condition flag closed the alert.
pub const REASON_CONDITION_MET: &str = "Document renewed and validated";
/// History reason when an alert outlived its rule's age window.
pub const REASON_WINDOW_EXPIRED: &str = "Time window expired";
/// History reason recorded on operator-initiated resolution.
pub const REASON_MANUAL: &str = "Manually resolved";

/// Owns the alert collection and event log; implements create, escalate,
/// auto-close, and resolve, evaluating the rule catalog against current
/// alert state.
///
/// Explicitly constructed and independently instantiable: there is no
/// process-wide instance, and the id sequence is per engine. Callers that
/// share an engine across tasks wrap it in their own lock (see
/// [`crate::scheduler::SweepScheduler`]); every operation here takes
/// `&mut self`, so a single lock serializes all read-modify-write cycles.
pub struct AlertEngine {
    catalog: RuleCatalog,
    alerts: Vec<Alert>,
    event_log: EventLog,
    next_alert_id: u64,
    clock: Arc<dyn Clock>,
}

impl AlertEngine {
    pub fn new(catalog: RuleCatalog) -> Self {
        Self::with_clock(catalog, Arc::new(SystemClock))
    }

    /// Construct with an injected time source so escalation-window and
    /// auto-close-age behavior can be tested deterministically.
    pub fn with_clock(catalog: RuleCatalog, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog,
            alerts: Vec::new(),
            event_log: EventLog::new(),
            next_alert_id: 1,
            clock,
        }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn get(&self, alert_id: &str) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == alert_id)
    }

    /// Validating boundary for callers holding raw strings: parses both
    /// enums and rejects unrecognized values before anything is created.
    pub fn submit(
        &mut self,
        source_type: &str,
        severity: &str,
        metadata: Metadata,
    ) -> Result<Alert> {
        let source_type: SourceType = source_type.parse().map_err(AlertError::InvalidInput)?;
        let severity: Severity = severity.parse().map_err(AlertError::InvalidInput)?;
        Ok(self.create_alert(source_type, severity, metadata))
    }

    /// Create an alert in `OPEN`, log the `CREATED` event, then
    /// synchronously evaluate escalation against the new alert before
    /// returning a snapshot of it.
    pub fn create_alert(
        &mut self,
        source_type: SourceType,
        severity: Severity,
        metadata: Metadata,
    ) -> Alert {
        let now = self.clock.now();
        let id = format!("ALT-{}", self.next_alert_id);
        self.next_alert_id += 1;

        self.alerts.push(Alert {
            id: id.clone(),
            source_type,
            severity,
            status: AlertStatus::Open,
            created_at: now,
            metadata,
            state_history: vec![StateHistoryEntry {
                status: AlertStatus::Open,
                timestamp: now,
                reason: None,
            }],
        });

        self.event_log.record(
            EventKind::Created,
            &id,
            format!("Alert created: {source_type}"),
            now,
        );
        tracing::info!(
            alert_id = %id,
            source_type = %source_type,
            severity = %severity,
            "Alert created"
        );

        let idx = self.alerts.len() - 1;
        self.evaluate_escalation(idx);
        self.alerts[idx].clone()
    }

    /// Escalation is evaluated once, at creation time; the sweep never
    /// re-runs it. Related alerts share the source type and correlation
    /// value, fall inside the rule's lookback window, and are still
    /// active. The new alert is already in the collection, so it counts
    /// toward its own threshold.
    fn evaluate_escalation(&mut self, idx: usize) {
        let source_type = self.alerts[idx].source_type;
        let Some(rule) = self.catalog.rule(source_type) else {
            return;
        };
        let Some(threshold) = rule.escalate_if_count else {
            return;
        };
        let upgrade = rule.severity_upgrade;
        let window = Duration::minutes(rule.window_minutes as i64);

        let now = self.clock.now();
        let window_start = now - window;
        let field = self.catalog.correlation_field();
        let key = self.alerts[idx].correlation_key(field);

        let related = self
            .alerts
            .iter()
            .filter(|a| {
                a.source_type == source_type
                    && a.correlation_key(field) == key
                    && a.created_at >= window_start
                    && a.status.is_active()
            })
            .count();

        if related >= threshold && self.alerts[idx].status == AlertStatus::Open {
            let id = self.alerts[idx].id.clone();
            tracing::debug!(
                alert_id = %id,
                related,
                threshold,
                "Escalation threshold reached"
            );
            self.escalate(&id, upgrade);
        }
    }

    /// No-op when the alert is missing, already `ESCALATED`, or terminal.
    pub fn escalate(&mut self, alert_id: &str, new_severity: Severity) {
        let now = self.clock.now();
        let Some(alert) = self.alerts.iter_mut().find(|a| a.id == alert_id) else {
            tracing::debug!(alert_id, "Escalate skipped: alert not found");
            return;
        };
        if alert.status == AlertStatus::Escalated || alert.status.is_terminal() {
            return;
        }

        alert.status = AlertStatus::Escalated;
        alert.severity = new_severity;
        alert.state_history.push(StateHistoryEntry {
            status: AlertStatus::Escalated,
            timestamp: now,
            reason: Some(REASON_RULE_THRESHOLD.to_string()),
        });

        self.event_log.record(
            EventKind::Escalated,
            alert_id,
            format!("Alert escalated to {new_severity}"),
            now,
        );
        tracing::warn!(alert_id, severity = %new_severity, "Alert escalated");
    }

    /// No-op when the alert is missing or already terminal.
    pub fn auto_close(&mut self, alert_id: &str, reason: &str) {
        let now = self.clock.now();
        let Some(alert) = self.alerts.iter_mut().find(|a| a.id == alert_id) else {
            tracing::debug!(alert_id, "Auto-close skipped: alert not found");
            return;
        };
        if alert.status.is_terminal() {
            return;
        }

        alert.status = AlertStatus::AutoClosed;
        alert.state_history.push(StateHistoryEntry {
            status: AlertStatus::AutoClosed,
            timestamp: now,
            reason: Some(reason.to_string()),
        });

        self.event_log
            .record(EventKind::AutoClosed, alert_id, reason, now);
        tracing::info!(alert_id, reason, "Alert auto-closed");
    }

    /// Operator-initiated resolution, callable from `OPEN` or `ESCALATED`.
    ///
    /// Unknown ids surface [`AlertError::NotFound`]; alerts already in a
    /// terminal state are left untouched and return `Ok`.
    pub fn resolve(&mut self, alert_id: &str) -> Result<()> {
        let now = self.clock.now();
        let Some(alert) = self.alerts.iter_mut().find(|a| a.id == alert_id) else {
            return Err(AlertError::NotFound(alert_id.to_string()));
        };
        if alert.status.is_terminal() {
            return Ok(());
        }

        alert.status = AlertStatus::Resolved;
        alert.state_history.push(StateHistoryEntry {
            status: AlertStatus::Resolved,
            timestamp: now,
            reason: Some(REASON_MANUAL.to_string()),
        });

        self.event_log.record(
            EventKind::Resolved,
            alert_id,
            "Manually resolved by operator",
            now,
        );
        tracing::info!(alert_id, "Alert resolved");
        Ok(())
    }

    /// External-collaborator hook for updating an alert's payload, e.g. a
    /// compliance tracker flipping `document_valid` after renewal.
    pub fn set_metadata(
        &mut self,
        alert_id: &str,
        key: impl Into<String>,
        value: Value,
    ) -> Result<()> {
        let Some(alert) = self.alerts.iter_mut().find(|a| a.id == alert_id) else {
            return Err(AlertError::NotFound(alert_id.to_string()));
        };
        alert.metadata.insert(key.into(), value);
        Ok(())
    }

    /// Re-evaluate every non-terminal alert against its rule's auto-close
    /// conditions. The condition-flag check runs first and wins over the
    /// age check. Idempotent: with no intervening state change a repeat
    /// sweep transitions nothing.
    pub fn run_auto_close_job(&mut self) {
        let now = self.clock.now();

        for idx in 0..self.alerts.len() {
            if self.alerts[idx].status.is_terminal() {
                continue;
            }
            let Some(rule) = self.catalog.rule(self.alerts[idx].source_type) else {
                continue;
            };

            let condition_met = rule
                .auto_close_if
                .as_deref()
                .is_some_and(|field| self.alerts[idx].condition_flag(field));

            let reason = if condition_met {
                Some(REASON_CONDITION_MET)
            } else if let Some(window_minutes) = rule.auto_close_window_minutes {
                let age = now - self.alerts[idx].created_at;
                (age > Duration::minutes(window_minutes as i64)).then_some(REASON_WINDOW_EXPIRED)
            } else {
                None
            };

            if let Some(reason) = reason {
                let id = self.alerts[idx].id.clone();
                self.auto_close(&id, reason);
            }
        }
    }

    pub fn stats(&self) -> AlertStats {
        views::stats(&self.alerts)
    }

    pub fn top_offenders(&self, limit: usize) -> Vec<OffenderGroup> {
        views::top_offenders(&self.alerts, self.catalog.correlation_field(), limit)
    }

    pub fn recent_auto_closed(&self, hours: u64) -> Vec<Alert> {
        views::recent_auto_closed(&self.alerts, self.clock.now(), hours)
    }

    /// The newest `count` event-log entries, most recent first.
    pub fn event_log(&self, count: usize) -> Vec<EventLogEntry> {
        self.event_log.recent(count)
    }
}
