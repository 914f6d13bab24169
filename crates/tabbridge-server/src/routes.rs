//! HTTP routing and handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use tabbridge_relay::{
    CommandOutcome, PendingCommand, RelayError, TelemetryKind, TelemetryQuery, TelemetryRecord,
};

use crate::state::AppState;

/// Create the router with all relay endpoints.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Extension-facing
        .route("/poll-commands", get(poll_commands))
        .route("/command-result", post(command_result))
        .route("/devtools-data", post(devtools_data))
        // Caller-facing
        .route("/dispatch", post(dispatch))
        .route("/telemetry/{kind}", get(query_telemetry))
        // Diagnostics
        .route("/status", get(status))
        .route("/health", get(health))
        .with_state(state)
}

// === Wire types ===

#[derive(Debug, Serialize)]
struct PollResponse {
    commands: Vec<PendingCommand>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommandResultRequest {
    command_id: u64,
    success: bool,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct AckResponse {
    success: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DevtoolsDataRequest {
    #[serde(rename = "type")]
    kind: TelemetryKind,
    #[serde(default)]
    tab_id: Option<String>,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DispatchRequest {
    action: String,
    #[serde(default)]
    params: Option<serde_json::Value>,
    #[serde(default)]
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TelemetryQueryParams {
    #[serde(default)]
    tab_id: Option<String>,
    #[serde(default)]
    contains: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TelemetryResponse {
    count: usize,
    records: Vec<TelemetryRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BufferStatus {
    size: usize,
    capacity: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    pending_commands: usize,
    network_buffer: BufferStatus,
    console_buffer: BufferStatus,
    performance_buffer: BufferStatus,
    last_telemetry_at: Option<chrono::DateTime<chrono::Utc>>,
    uptime_secs: u64,
}

// === Extension-facing handlers ===

/// Snapshot of pending commands.
///
/// Pure read with no claim step: a command stays visible to every poll
/// until its result is reported, so delivery is at-least-once and the
/// extension must tolerate seeing a command twice.
async fn poll_commands(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let commands = state.store.list_pending().await;
    Json(PollResponse { commands })
}

/// Accept a reported outcome.
///
/// Always acknowledges. The extension has no way to know whether its result
/// is still wanted; a result for a reaped or timed-out id is dropped here,
/// never errored back.
async fn command_result(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CommandResultRequest>,
) -> impl IntoResponse {
    let outcome = if request.success {
        CommandOutcome::Completed(request.result.unwrap_or(serde_json::Value::Null))
    } else {
        CommandOutcome::Failed(
            request
                .error
                .unwrap_or_else(|| "Unknown error".to_string()),
        )
    };

    let known = state.store.set_result(request.command_id, outcome).await;
    if !known {
        debug!(
            "Discarded result for unknown command {}",
            request.command_id
        );
    }

    Json(AckResponse { success: true })
}

/// Telemetry ingress.
async fn devtools_data(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DevtoolsDataRequest>,
) -> impl IntoResponse {
    state
        .telemetry
        .push(request.kind, request.tab_id, request.data)
        .await;
    Json(AckResponse { success: true })
}

// === Caller-facing handlers ===

/// Dispatch a command and wait for its outcome.
async fn dispatch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DispatchRequest>,
) -> impl IntoResponse {
    let timeout = request
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(state.relay_config.dispatch_timeout_ms));
    let params = request.params.unwrap_or_else(|| json!({}));

    match state
        .dispatcher
        .dispatch_with_timeout(request.action, params, timeout)
        .await
    {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({ "success": true, "result": result })),
        ),
        Err(err) => {
            let status = match &err {
                RelayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                RelayError::Action(_) => StatusCode::BAD_GATEWAY,
                RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(json!({ "success": false, "error": err.to_string() })),
            )
        }
    }
}

/// Telemetry egress: most recent matching records of one category.
async fn query_telemetry(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(params): Query<TelemetryQueryParams>,
) -> axum::response::Response {
    let kind: TelemetryKind = match kind.parse() {
        Ok(kind) => kind,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": message })),
            )
                .into_response();
        }
    };

    let query = TelemetryQuery {
        tab_id: params.tab_id,
        contains: params.contains,
        limit: params.limit,
    };
    let records = state.telemetry.query(kind, &query).await;

    Json(TelemetryResponse {
        count: records.len(),
        records,
    })
    .into_response()
}

// === Diagnostics ===

async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let telemetry = &state.telemetry;

    Json(StatusResponse {
        pending_commands: state.store.pending_count().await,
        network_buffer: BufferStatus {
            size: telemetry.len(TelemetryKind::Network).await,
            capacity: telemetry.capacity(TelemetryKind::Network).await,
        },
        console_buffer: BufferStatus {
            size: telemetry.len(TelemetryKind::Console).await,
            capacity: telemetry.capacity(TelemetryKind::Console).await,
        },
        performance_buffer: BufferStatus {
            size: telemetry.len(TelemetryKind::Performance).await,
            capacity: telemetry.capacity(TelemetryKind::Performance).await,
        },
        last_telemetry_at: telemetry.last_update().await,
        uptime_secs: state.uptime().as_secs(),
    })
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
