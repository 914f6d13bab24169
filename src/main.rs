//! Tabbridge - HTTP command relay between AI-assistant tool calls and a
//! polling browser extension.
//!
//! Main entry point for the tabbridge CLI and server.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{error, info};

use tabbridge_server::{Config, ConfigLoader};

mod server;

/// Tabbridge CLI.
#[derive(Parser)]
#[command(name = "tabbridge")]
#[command(about = "HTTP command relay for browser-extension automation")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay server in foreground (default)
    Run {
        /// Server host
        #[arg(long)]
        host: Option<String>,

        /// Server port
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = server::init_tracing() {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let (host, port) = match cli.command {
        Some(Commands::Run { host, port }) => (host, port),
        None => (None, None),
    };
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    info!("Starting tabbridge v{}", env!("CARGO_PKG_VERSION"));
    if let Err(e) = server::run_server(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from an explicit path, the default location, or
/// built-in defaults, in that order.
fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(ConfigLoader::load(path)?),
        None => {
            let default = Path::new("config/default.toml");
            if default.exists() {
                Ok(ConfigLoader::load(default)?)
            } else {
                Ok(Config::default())
            }
        }
    }
}
