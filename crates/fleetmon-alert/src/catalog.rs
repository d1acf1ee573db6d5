use fleetmon_common::types::{Severity, SourceType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Escalation and auto-close policy for one source type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationRule {
    /// Minimum number of related alerts within `window_minutes` required
    /// to escalate. Absent means this source type never escalates.
    #[serde(default)]
    pub escalate_if_count: Option<usize>,
    /// Lookback window for counting related alerts.
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u64,
    /// Severity assigned on escalation.
    #[serde(default = "default_severity_upgrade")]
    pub severity_upgrade: Severity,
    /// Metadata boolean flag whose truth auto-closes the alert on the next
    /// sweep regardless of age.
    #[serde(default)]
    pub auto_close_if: Option<String>,
    /// Age in minutes after which a non-terminal alert is auto-closed.
    #[serde(default)]
    pub auto_close_window_minutes: Option<u64>,
}

fn default_window_minutes() -> u64 {
    60
}

fn default_severity_upgrade() -> Severity {
    Severity::Critical
}

/// Immutable lookup from source type to its escalation/auto-close policy.
///
/// Loaded once at startup; never mutated at runtime. A source type with no
/// entry is "rule absent": such alerts are created normally but no
/// escalation or auto-close behavior ever applies to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleCatalog {
    /// Metadata field used to group related alerts for escalation counting
    /// and offender ranking.
    #[serde(default = "default_correlation_field")]
    correlation_field: String,
    #[serde(default)]
    rules: HashMap<SourceType, EscalationRule>,
}

fn default_correlation_field() -> String {
    "driver_id".to_string()
}

impl Default for RuleCatalog {
    fn default() -> Self {
        let mut rules = HashMap::new();
        rules.insert(
            SourceType::Overspeed,
            EscalationRule {
                escalate_if_count: Some(3),
                window_minutes: 60,
                severity_upgrade: Severity::Critical,
                auto_close_if: None,
                auto_close_window_minutes: None,
            },
        );
        rules.insert(
            SourceType::FeedbackNegative,
            EscalationRule {
                escalate_if_count: Some(2),
                window_minutes: 1440,
                severity_upgrade: Severity::Critical,
                auto_close_if: None,
                auto_close_window_minutes: None,
            },
        );
        rules.insert(
            SourceType::Compliance,
            EscalationRule {
                escalate_if_count: None,
                window_minutes: default_window_minutes(),
                severity_upgrade: default_severity_upgrade(),
                auto_close_if: Some("document_valid".to_string()),
                auto_close_window_minutes: Some(10080),
            },
        );
        Self {
            correlation_field: default_correlation_field(),
            rules,
        }
    }
}

impl RuleCatalog {
    pub fn new(correlation_field: impl Into<String>) -> Self {
        Self {
            correlation_field: correlation_field.into(),
            rules: HashMap::new(),
        }
    }

    /// Register a rule while building a catalog. Not part of the runtime
    /// surface; rules are fixed once the engine is constructed.
    pub fn with_rule(mut self, source_type: SourceType, rule: EscalationRule) -> Self {
        self.rules.insert(source_type, rule);
        self
    }

    pub fn correlation_field(&self) -> &str {
        &self.correlation_field
    }

    pub fn rule(&self, source_type: SourceType) -> Option<&EscalationRule> {
        self.rules.get(&source_type)
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let catalog: Self = toml::from_str(content)?;
        Ok(catalog)
    }
}
