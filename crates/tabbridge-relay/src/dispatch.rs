//! Command dispatch: enqueue and await.
//!
//! Turns the poll/report protocol into a single await-able call. The waiter
//! suspends on the store's notifier instead of polling on an interval; the
//! externally visible contract is unchanged: resolve as soon as a terminal
//! state is observed, fail with `Timeout` at the deadline.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::command::CommandOutcome;
use crate::error::RelayError;
use crate::store::CommandStore;

/// Dispatches commands through the store and awaits their outcome.
///
/// Cheap to clone; each in-flight dispatch owns a distinct id and waits
/// independently. There is no way to cancel a command the extension has
/// already picked up: the dispatch can stop waiting, but the extension's
/// in-flight execution runs to completion on its side.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<CommandStore>,
    default_timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher over a shared store.
    pub fn new(store: Arc<CommandStore>, default_timeout: Duration) -> Self {
        Self {
            store,
            default_timeout,
        }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &Arc<CommandStore> {
        &self.store
    }

    /// Dispatch with the configured default timeout.
    pub async fn dispatch(
        &self,
        action: impl Into<String>,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RelayError> {
        self.dispatch_with_timeout(action, params, self.default_timeout)
            .await
    }

    /// Enqueue a command and wait until the extension reports an outcome or
    /// the deadline passes.
    ///
    /// Exactly one record is created and exactly one is removed per call,
    /// whatever the outcome. On timeout the record is deleted, so a late
    /// report for this id becomes an acknowledged no-op.
    pub async fn dispatch_with_timeout(
        &self,
        action: impl Into<String>,
        params: serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, RelayError> {
        let action = action.into();
        let id = self.store.create(action.clone(), params).await;
        let deadline = Instant::now() + timeout;

        loop {
            // Register before checking state so a result landing between the
            // check and the await still wakes us.
            let notified = self.store.changed().notified();

            if let Some(outcome) = self.store.take_if_terminal(id).await {
                return Self::resolve(id, &action, outcome);
            }

            tokio::select! {
                _ = notified => {}
                _ = tokio::time::sleep_until(deadline) => {
                    // One last look: the result may have landed right at the
                    // deadline.
                    if let Some(outcome) = self.store.take_if_terminal(id).await {
                        return Self::resolve(id, &action, outcome);
                    }
                    self.store.remove(id).await;
                    warn!(
                        "Command {} ({}) timed out after {} ms",
                        id,
                        action,
                        timeout.as_millis()
                    );
                    return Err(RelayError::Timeout {
                        waited_ms: timeout.as_millis() as u64,
                    });
                }
            }
        }
    }

    fn resolve(
        id: u64,
        action: &str,
        outcome: CommandOutcome,
    ) -> Result<serde_json::Value, RelayError> {
        match outcome {
            CommandOutcome::Completed(payload) => {
                debug!("Command {} ({}) completed", id, action);
                Ok(payload)
            }
            CommandOutcome::Failed(message) => {
                debug!("Command {} ({}) failed: {}", id, action, message);
                Err(RelayError::Action(message))
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
