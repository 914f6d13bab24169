//! # Tabbridge Relay
//!
//! Command correlation layer between an AI-assistant RPC surface and a
//! browser extension that can only poll over HTTP.
//!
//! ## Features
//!
//! - Correlated command store with monotonic ids
//! - Await-able dispatch with deadline (notify-based, no interval polling)
//! - Periodic reaper for abandoned command records
//! - Bounded FIFO telemetry buffers (network/console/performance)

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod reaper;
pub mod store;
pub mod telemetry;

pub use command::{CommandOutcome, CommandRecord, CommandStatus, PendingCommand};
pub use config::RelayConfig;
pub use dispatch::Dispatcher;
pub use error::RelayError;
pub use reaper::Reaper;
pub use store::CommandStore;
pub use telemetry::{TelemetryKind, TelemetryQuery, TelemetryRecord, TelemetryStore};
