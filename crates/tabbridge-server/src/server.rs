//! Server startup and shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use tabbridge_relay::Reaper;

use crate::config::Config;
use crate::routes::create_router;
use crate::state::AppState;

/// The relay HTTP server.
///
/// Owns the shared state and the reaper lifecycle. `run` blocks until a
/// shutdown signal (ctrl-c or [`AppState::request_shutdown`]) arrives.
pub struct BridgeServer {
    config: Config,
    state: Arc<AppState>,
}

impl BridgeServer {
    /// Create a server with fresh state from the given configuration.
    pub fn new(config: Config) -> Self {
        let state = Arc::new(AppState::new(config.relay.clone()));
        Self { config, state }
    }

    /// Create a server over pre-built state.
    pub fn with_state(config: Config, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the shared state.
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Get the server address.
    pub fn addr(&self) -> String {
        self.config.server.address()
    }

    /// Bind, serve, and shut down in order.
    ///
    /// The extension posts from a browser extension origin, so CORS stays
    /// permissive on this surface.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let reaper = Reaper::spawn(self.state.store.clone(), &self.config.relay);

        let app = create_router(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        let addr: SocketAddr = self.addr().parse()?;
        let listener = TcpListener::bind(addr).await?;
        info!("Relay server listening on {}", listener.local_addr()?);

        let shutdown = self.state.shutdown_notify.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received ctrl-c, shutting down"),
                    _ = shutdown.notified() => info!("Shutdown requested"),
                }
            })
            .await?;

        reaper.stop();
        info!("Relay server stopped");
        Ok(())
    }
}
