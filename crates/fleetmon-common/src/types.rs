use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Free-form alert payload, keyed by source-type convention
/// (e.g. `driver_id`, `speed`, `document_valid`).
pub type Metadata = HashMap<String, Value>;

/// Alert severity level, ordered from lowest to highest.
///
/// # Examples
///
/// ```
/// use fleetmon_common::types::Severity;
///
/// let sev: Severity = "warning".parse().unwrap();
/// assert_eq!(sev, Severity::Warning);
/// assert_eq!(sev.to_string(), "warning");
/// assert!(Severity::Critical > Severity::Info);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// Category of the upstream condition that raised an alert.
///
/// Parsed at the API boundary; unknown strings are rejected there and
/// never reach the engine.
///
/// # Examples
///
/// ```
/// use fleetmon_common::types::SourceType;
///
/// let st: SourceType = "feedback_negative".parse().unwrap();
/// assert_eq!(st, SourceType::FeedbackNegative);
/// assert!("telemetry_gap".parse::<SourceType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Overspeed,
    FeedbackNegative,
    Compliance,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Overspeed => write!(f, "overspeed"),
            SourceType::FeedbackNegative => write!(f, "feedback_negative"),
            SourceType::Compliance => write!(f, "compliance"),
        }
    }
}

impl std::str::FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overspeed" => Ok(SourceType::Overspeed),
            "feedback_negative" => Ok(SourceType::FeedbackNegative),
            "compliance" => Ok(SourceType::Compliance),
            _ => Err(format!("unknown source type: {s}")),
        }
    }
}

/// Alert lifecycle status.
///
/// `AutoClosed` and `Resolved` are terminal: no transition ever leaves
/// them, and re-requesting one is a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    Open,
    Escalated,
    AutoClosed,
    Resolved,
}

impl AlertStatus {
    /// Whether no further transition is permitted from this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, AlertStatus::AutoClosed | AlertStatus::Resolved)
    }

    /// Whether this status still represents live exposure (`OPEN` or
    /// `ESCALATED`).
    pub fn is_active(self) -> bool {
        matches!(self, AlertStatus::Open | AlertStatus::Escalated)
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertStatus::Open => write!(f, "OPEN"),
            AlertStatus::Escalated => write!(f, "ESCALATED"),
            AlertStatus::AutoClosed => write!(f, "AUTO_CLOSED"),
            AlertStatus::Resolved => write!(f, "RESOLVED"),
        }
    }
}

/// One entry in an alert's append-only state history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateHistoryEntry {
    pub status: AlertStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A tracked operational alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Engine-assigned identifier (`ALT-1`, `ALT-2`, ...), monotonic per
    /// engine instance.
    pub id: String,
    pub source_type: SourceType,
    /// Mutable only by escalation.
    pub severity: Severity,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    pub metadata: Metadata,
    /// First entry always records the initial `OPEN` transition; the last
    /// entry's status always equals `status`.
    pub state_history: Vec<StateHistoryEntry>,
}

impl Alert {
    /// The alert's correlation value under `field`, rendered as a string.
    ///
    /// Non-string metadata values (numbers, booleans) still correlate by
    /// their JSON rendering; a missing field yields `None`.
    pub fn correlation_key(&self, field: &str) -> Option<String> {
        self.metadata.get(field).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Explicit field-presence check for boolean condition flags: `true`
    /// only when `field` is present and is JSON `true`.
    pub fn condition_flag(&self, field: &str) -> bool {
        self.metadata
            .get(field)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Kind of a lifecycle transition recorded in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum EventKind {
    Created,
    Escalated,
    AutoClosed,
    Resolved,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Created => write!(f, "CREATED"),
            EventKind::Escalated => write!(f, "ESCALATED"),
            EventKind::AutoClosed => write!(f, "AUTO-CLOSED"),
            EventKind::Resolved => write!(f, "RESOLVED"),
        }
    }
}

/// An immutable audit record of one lifecycle transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub kind: EventKind,
    pub alert_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Summary counts over the alert collection.
///
/// Per-severity counts cover the active subset (`OPEN` ∪ `ESCALATED`)
/// only: they represent current exposure, not historical volume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertStats {
    pub total: usize,
    pub open: usize,
    pub escalated: usize,
    pub auto_closed: usize,
    pub resolved: usize,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

/// One correlation-key group in the top-offenders ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffenderGroup {
    /// Correlation value, or `"Unknown"` when the field is absent.
    pub key: String,
    /// Active alerts in the group.
    pub count: usize,
    /// Active alerts currently at `Critical` severity.
    pub critical_count: usize,
    pub alerts: Vec<Alert>,
}
