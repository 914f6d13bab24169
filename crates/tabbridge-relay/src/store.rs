//! Correlated command store.
//!
//! The only shared mutable state between the dispatcher, the poll endpoint
//! and the result endpoint. Every multi-step operation on a record happens
//! under a single write lock, so no transition can be interleaved.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Notify, RwLock};
use tracing::debug;

use crate::command::{CommandOutcome, CommandRecord, CommandStatus, PendingCommand};

/// Thread-safe mapping from command id to command record.
pub struct CommandStore {
    /// Next id to allocate. Ids are never reused.
    next_id: AtomicU64,
    /// Live command records.
    records: RwLock<HashMap<u64, CommandRecord>>,
    /// Wakes dispatch waiters whenever a result lands.
    changed: Notify,
}

impl CommandStore {
    /// Create an empty store. Ids start at 1.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            records: RwLock::new(HashMap::new()),
            changed: Notify::new(),
        }
    }

    /// Notifier signalled after every result transition.
    ///
    /// Waiters must register (`notified()`) before checking record state to
    /// avoid missing a wakeup.
    pub fn changed(&self) -> &Notify {
        &self.changed
    }

    /// Allocate the next id and insert a pending record. Never fails.
    pub async fn create(&self, action: impl Into<String>, params: serde_json::Value) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = CommandRecord::new(id, action, params);

        let mut records = self.records.write().await;
        debug!("Created command {} ({})", id, record.action);
        records.insert(id, record);
        id
    }

    /// Look up a record by id.
    pub async fn get(&self, id: u64) -> Option<CommandRecord> {
        self.records.read().await.get(&id).cloned()
    }

    /// Record the peer-reported outcome for a command.
    ///
    /// Transitions the record if and only if it is currently pending.
    /// Returns `false` when the id is unknown or already terminal — the
    /// late-result case, which callers treat as a silent no-op.
    pub async fn set_result(&self, id: u64, outcome: CommandOutcome) -> bool {
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&id) else {
            debug!("Dropping result for unknown command {}", id);
            return false;
        };
        if record.status != CommandStatus::Pending {
            debug!("Dropping result for already-terminal command {}", id);
            return false;
        }

        match outcome {
            CommandOutcome::Completed(payload) => {
                record.status = CommandStatus::Completed;
                record.result = Some(payload);
            }
            CommandOutcome::Failed(message) => {
                record.status = CommandStatus::Error;
                record.error = Some(message);
            }
        }
        drop(records);

        self.changed.notify_waiters();
        true
    }

    /// Remove a record. Returns whether it existed.
    pub async fn remove(&self, id: u64) -> bool {
        self.records.write().await.remove(&id).is_some()
    }

    /// Atomically remove a record if it has reached a terminal state and
    /// return its outcome. Pending or absent records are left untouched.
    pub async fn take_if_terminal(&self, id: u64) -> Option<CommandOutcome> {
        let mut records = self.records.write().await;
        if !records.get(&id)?.is_terminal() {
            return None;
        }
        let record = records.remove(&id)?;
        match record.status {
            CommandStatus::Completed => Some(CommandOutcome::Completed(
                record.result.unwrap_or(serde_json::Value::Null),
            )),
            CommandStatus::Error => Some(CommandOutcome::Failed(
                record
                    .error
                    .unwrap_or_else(|| "Unknown error".to_string()),
            )),
            CommandStatus::Pending => None,
        }
    }

    /// Snapshot of all pending commands for the poll endpoint.
    ///
    /// Pure read. Nothing marks a command as claimed, so repeated polls see
    /// the same pending commands until a result is reported (at-least-once
    /// delivery).
    pub async fn list_pending(&self) -> Vec<PendingCommand> {
        let records = self.records.read().await;
        let mut pending: Vec<PendingCommand> = records
            .values()
            .filter(|r| r.status == CommandStatus::Pending)
            .map(PendingCommand::from)
            .collect();
        pending.sort_by_key(|c| c.id);
        pending
    }

    /// Delete every record older than `max_age`, irrespective of status.
    /// Returns the number of records removed.
    pub async fn sweep_older_than(&self, max_age: Duration) -> usize {
        let cutoff = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
        let now = Utc::now();

        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| record.age(now) <= cutoff);
        before - records.len()
    }

    /// Number of pending records.
    pub async fn pending_count(&self) -> usize {
        self.records
            .read()
            .await
            .values()
            .filter(|r| r.status == CommandStatus::Pending)
            .count()
    }

    /// Total number of records, any status.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Backdate a record's creation time (test hook for age-based sweeps).
    #[cfg(test)]
    pub(crate) async fn backdate(&self, id: u64, secs: i64) {
        let mut records = self.records.write().await;
        if let Some(record) = records.get_mut(&id) {
            record.created_at = Utc::now() - chrono::Duration::seconds(secs);
        }
    }
}

impl Default for CommandStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
