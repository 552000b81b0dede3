//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (ready to serve traffic)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;
use crate::board::TriageBoard;
use crate::share;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe.
/// Ready once the codec round-trips the sample dataset.
pub async fn readiness() -> StatusCode {
    if check_codec_health() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
///
/// Full health status with component details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let codec_ok = check_codec_health();

    Json(HealthResponse {
        status: if codec_ok { "healthy" } else { "degraded" }.to_string(),
        codec: if codec_ok { "ok" } else { "error" }.to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Encode and decode the sample dataset
fn check_codec_health() -> bool {
    let sample = TriageBoard::sample();
    match sample.to_token().map(|token| share::decode(&token)) {
        Ok(Ok(decoded)) => decoded.records == sample.records(),
        _ => false,
    }
}
