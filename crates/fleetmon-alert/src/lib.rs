//! Alert lifecycle and rule-evaluation engine.
//!
//! [`engine::AlertEngine`] owns the alert collection and event log,
//! applies the [`catalog::RuleCatalog`] escalation rules at creation
//! time, and retires alerts through the periodic auto-close sweep
//! driven by [`scheduler::SweepScheduler`]. Aggregation views
//! (summary counts, top offenders, recently auto-closed) are computed
//! on demand from the live collection.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod event_log;
pub mod scheduler;
pub mod views;


use chrono::{DateTime, Utc};

/// Time source injected into the engine.
///
/// Escalation windows and auto-close ages are measured against this
/// clock rather than the system clock directly, so tests can control
/// elapsed time deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
