use crate::engine::AlertEngine;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::time::{interval, Duration};

/// Default sweep cadence in seconds.
pub const DEFAULT_TICK_SECS: u64 = 30;

/// Drives the auto-close sweep at a fixed cadence.
///
/// The engine mutex is held for the whole sweep, so a sweep can never
/// overlap itself or any other engine mutation. Shutdown stops future
/// sweeps but never interrupts one mid-flight: the running tick finishes
/// before the loop observes the signal.
pub struct SweepScheduler {
    engine: Arc<Mutex<AlertEngine>>,
    tick_secs: u64,
}

impl SweepScheduler {
    pub fn new(engine: Arc<Mutex<AlertEngine>>, tick_secs: u64) -> Self {
        Self { engine, tick_secs }
    }

    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(tick_secs = self.tick_secs, "Auto-close sweep scheduler started");

        let mut tick = interval(Duration::from_secs(self.tick_secs));
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let mut engine = self
                        .engine
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    engine.run_auto_close_job();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Auto-close sweep scheduler stopped");
                        return;
                    }
                }
            }
        }
    }
}
