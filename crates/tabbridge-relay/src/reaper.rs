//! Periodic reaper for abandoned command records.
//!
//! The dispatcher deletes its own record on terminal state or timeout; the
//! reaper is the second line of defense against leaks when the caller side
//! disappears entirely (extension gone, dispatch task cancelled).

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::config::RelayConfig;
use crate::store::CommandStore;

/// Background sweep task handle.
pub struct Reaper {
    handle: JoinHandle<()>,
    interval: Duration,
    max_age: Duration,
}

impl Reaper {
    /// Spawn a sweep task with the configured interval and max record age.
    pub fn spawn(store: Arc<CommandStore>, config: &RelayConfig) -> Self {
        let interval = Duration::from_secs(config.reap_interval_secs);
        let max_age = Duration::from_secs(config.max_command_age_secs);
        let handle = tokio::spawn(Self::run(store, interval, max_age));

        Self {
            handle,
            interval,
            max_age,
        }
    }

    async fn run(store: Arc<CommandStore>, interval: Duration, max_age: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it so the first sweep
        // happens one full interval after startup.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = store.sweep_older_than(max_age).await;
            if removed > 0 {
                info!("Reaped {} stale command records", removed);
            } else {
                debug!("Reaper sweep found nothing to remove");
            }
        }
    }

    /// Sweep interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Maximum record age before eviction.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Stop the sweep task.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
