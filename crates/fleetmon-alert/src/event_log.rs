use chrono::{DateTime, Utc};
use fleetmon_common::types::{EventKind, EventLogEntry};
use std::collections::VecDeque;

/// Default number of entries retained by the engine's event log.
pub const DEFAULT_CAPACITY: usize = 50;

/// Bounded, most-recent-first record of lifecycle transitions.
///
/// Pure observability sink: the engine writes to it on every transition
/// but never reads it back for business-logic decisions. Once the
/// capacity is exceeded the oldest entry is evicted.
#[derive(Debug)]
pub struct EventLog {
    capacity: usize,
    entries: VecDeque<EventLogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
        }
    }

    pub fn record(
        &mut self,
        kind: EventKind,
        alert_id: &str,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) {
        self.entries.push_front(EventLogEntry {
            kind,
            alert_id: alert_id.to_string(),
            message: message.into(),
            timestamp,
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    /// The newest `count` entries, most recent first.
    pub fn recent(&self, count: usize) -> Vec<EventLogEntry> {
        self.entries.iter().take(count).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_past_capacity() {
        let mut log = EventLog::with_capacity(3);
        for i in 0..5 {
            log.record(
                EventKind::Created,
                &format!("ALT-{i}"),
                format!("event {i}"),
                Utc::now(),
            );
        }

        assert_eq!(log.len(), 3);
        let recent = log.recent(10);
        // Most recent first; ALT-0 and ALT-1 were evicted
        assert_eq!(recent[0].alert_id, "ALT-4");
        assert_eq!(recent[2].alert_id, "ALT-2");
    }

    #[test]
    fn recent_truncates_to_count() {
        let mut log = EventLog::new();
        for i in 0..10 {
            log.record(EventKind::Created, &format!("ALT-{i}"), "created", Utc::now());
        }
        assert_eq!(log.recent(4).len(), 4);
        assert_eq!(log.recent(4)[0].alert_id, "ALT-9");
    }
}
