//! Cosmetic progress ticker
//!
//! Runs while a training call is in flight and nudges the shared
//! [`ProgressMeter`] by a random amount on every interval.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spark_core::ProgressMeter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

/// Owns the ticking task. Dropping the ticker aborts the task.
#[derive(Debug)]
pub struct ProgressTicker {
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// Spawn on the current tokio runtime
    pub fn spawn(progress: Arc<watch::Sender<ProgressMeter>>, period: Duration, seed: Option<u64>) -> Self {
        let period = period.max(Duration::from_millis(1));
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let handle = tokio::spawn(async move {
            let mut interval_timer = interval(period);
            interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            interval_timer.tick().await;
            loop {
                interval_timer.tick().await;
                let increment = rng.gen_range(0.0..ProgressMeter::MAX_TICK);
                progress.send_modify(|meter| meter.tick(increment));
            }
        });

        debug!(period_ms = period.as_millis() as u64, "Progress ticker started");
        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Abort the task now
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
