//! Command record definition and status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Command status.
///
/// Transitions are monotonic: `Pending` moves to exactly one of
/// `Completed` or `Error` and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    /// Waiting for the extension to pick it up and report back.
    Pending,
    /// Extension reported success.
    Completed,
    /// Extension reported failure.
    Error,
}

impl Default for CommandStatus {
    fn default() -> Self {
        CommandStatus::Pending
    }
}

/// A command record held by the store while a dispatch is in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRecord {
    /// Correlation id. Monotonically increasing, never reused.
    pub id: u64,
    /// Opaque action name; the relay does not interpret it.
    pub action: String,
    /// Opaque action parameters.
    pub params: serde_json::Value,
    /// Creation time, used by the reaper.
    pub created_at: DateTime<Utc>,
    /// Current status.
    pub status: CommandStatus,
    /// Result payload once completed.
    pub result: Option<serde_json::Value>,
    /// Error message once failed.
    pub error: Option<String>,
}

impl CommandRecord {
    /// Create a new pending record.
    pub fn new(id: u64, action: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            id,
            action: action.into(),
            params,
            created_at: Utc::now(),
            status: CommandStatus::Pending,
            result: None,
            error: None,
        }
    }

    /// Whether the record has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status != CommandStatus::Pending
    }

    /// Age of the record relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }
}

/// Poll-side projection of a pending record.
///
/// The extension only needs the correlation id, the action name and its
/// parameters; status and timestamps stay server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCommand {
    pub id: u64,
    pub action: String,
    pub params: serde_json::Value,
}

impl From<&CommandRecord> for PendingCommand {
    fn from(record: &CommandRecord) -> Self {
        Self {
            id: record.id,
            action: record.action.clone(),
            params: record.params.clone(),
        }
    }
}

/// Terminal outcome of a command, extracted when the record is removed.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Peer reported success with this payload.
    Completed(serde_json::Value),
    /// Peer reported failure with this message.
    Failed(String),
}
