//! Relay errors.

use thiserror::Error;

/// Relay error types.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No terminal state was observed before the dispatch deadline.
    /// Recoverable: the caller may retry with a fresh dispatch.
    #[error("Command timed out after {waited_ms} ms")]
    Timeout {
        /// How long the dispatch waited.
        waited_ms: u64,
    },

    /// The extension explicitly reported failure. The message is surfaced
    /// verbatim to the caller.
    #[error("Action failed: {0}")]
    Action(String),

    /// Internal relay failure scoped to a single dispatch call.
    #[error("Relay error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Whether a caller retry could reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RelayError::Timeout { .. })
    }
}
