//! Relay configuration.

use serde::{Deserialize, Serialize};

/// Relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Default dispatch timeout in milliseconds.
    #[serde(default = "default_dispatch_timeout_ms")]
    pub dispatch_timeout_ms: u64,

    /// Reaper sweep interval in seconds.
    #[serde(default = "default_reap_interval_secs")]
    pub reap_interval_secs: u64,

    /// Maximum command record age in seconds before the reaper evicts it,
    /// regardless of status.
    #[serde(default = "default_max_command_age_secs")]
    pub max_command_age_secs: u64,

    /// Network telemetry buffer capacity.
    #[serde(default = "default_network_capacity")]
    pub network_buffer_capacity: usize,

    /// Console telemetry buffer capacity.
    #[serde(default = "default_console_capacity")]
    pub console_buffer_capacity: usize,

    /// Performance telemetry buffer capacity.
    #[serde(default = "default_performance_capacity")]
    pub performance_buffer_capacity: usize,
}

fn default_dispatch_timeout_ms() -> u64 {
    30_000
}

fn default_reap_interval_secs() -> u64 {
    60
}

fn default_max_command_age_secs() -> u64 {
    60
}

fn default_network_capacity() -> usize {
    5000
}

fn default_console_capacity() -> usize {
    5000
}

fn default_performance_capacity() -> usize {
    500
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            dispatch_timeout_ms: default_dispatch_timeout_ms(),
            reap_interval_secs: default_reap_interval_secs(),
            max_command_age_secs: default_max_command_age_secs(),
            network_buffer_capacity: default_network_capacity(),
            console_buffer_capacity: default_console_capacity(),
            performance_buffer_capacity: default_performance_capacity(),
        }
    }
}
