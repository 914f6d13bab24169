//! Application state shared across handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Notify;

use tabbridge_relay::{CommandStore, Dispatcher, RelayConfig, TelemetryStore};

/// Shared state: the command store, the dispatcher over it, and the
/// telemetry buffers. One instance lives for the process lifetime and is
/// injected into every handler.
pub struct AppState {
    pub store: Arc<CommandStore>,
    pub dispatcher: Dispatcher,
    pub telemetry: Arc<TelemetryStore>,
    pub relay_config: RelayConfig,
    start_time: Instant,
    /// Notifier for API-triggered shutdown.
    pub shutdown_notify: Arc<Notify>,
}

impl AppState {
    pub fn new(relay_config: RelayConfig) -> Self {
        let store = Arc::new(CommandStore::new());
        let dispatcher = Dispatcher::new(
            store.clone(),
            Duration::from_millis(relay_config.dispatch_timeout_ms),
        );
        let telemetry = Arc::new(TelemetryStore::new(&relay_config));

        Self {
            store,
            dispatcher,
            telemetry,
            relay_config,
            start_time: Instant::now(),
            shutdown_notify: Arc::new(Notify::new()),
        }
    }

    /// Get uptime.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Request shutdown and notify the server signal handler.
    pub fn request_shutdown(&self) {
        self.shutdown_notify.notify_one();
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(RelayConfig::default())
    }
}
