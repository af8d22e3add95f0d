//! Replication trigger and status routes.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::Result;
use crate::metrics::MetricsSnapshot;
use crate::scheduler;
use crate::AppState;

/// Response for a manually triggered cycle.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicateResponse {
    /// Number of products saved
    pub replicated: usize,
}

/// Response for the status endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
    pub source_url: String,
    pub interval_secs: u64,
}

/// Create replication routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/replicate", post(replicate_handler))
        .route("/replication/status", get(status_handler))
}

/// POST /replicate - Run one cycle now.
async fn replicate_handler(State(state): State<AppState>) -> Result<Json<ReplicateResponse>> {
    let replicated = scheduler::run_cycle(state.service.as_ref()).await?;
    Ok(Json(ReplicateResponse { replicated }))
}

/// GET /replication/status - Counters of past cycles.
async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        metrics: state.service.metrics().snapshot(),
        source_url: state.config.source_url.clone(),
        interval_secs: state.config.replication_interval.as_secs(),
    })
}
