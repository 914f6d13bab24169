//! # Tabbridge Server
//!
//! HTTP surface over the relay:
//! - `GET  /poll-commands` — extension fetches pending commands
//! - `POST /command-result` — extension reports an outcome (always acked)
//! - `POST /devtools-data` — extension pushes telemetry
//! - `POST /dispatch` — caller-side command ingress
//! - `GET  /telemetry/{kind}` — caller-side telemetry queries
//! - `GET  /status`, `GET /health` — diagnostics
//!
//! All handlers share one injected [`AppState`]; nothing is ambient.

pub mod config;
mod routes;
mod server;
mod state;

pub use config::{Config, ConfigError, ConfigLoader, ServerConfig};
pub use routes::create_router;
pub use server::BridgeServer;
pub use state::AppState;
