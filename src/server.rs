//! Server initialization and startup logic for tabbridge.

use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tabbridge_server::{BridgeServer, Config};

/// Directory for tabbridge runtime files (`~/.tabbridge`).
fn tabbridge_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".tabbridge")
}

/// Initialize tracing with console and file output.
///
/// Log files are written to `~/.tabbridge/logs/` with daily rotation.
pub(crate) fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = tabbridge_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("tabbridge")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the writer guard alive for the program duration.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Run the relay server in foreground until a shutdown signal arrives.
pub(crate) async fn run_server(
    config: Config,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!(
        "Relay configuration: dispatch timeout {} ms, reap every {} s, max command age {} s",
        config.relay.dispatch_timeout_ms,
        config.relay.reap_interval_secs,
        config.relay.max_command_age_secs
    );

    let server = BridgeServer::new(config);
    server.run().await?;
    Ok(())
}
