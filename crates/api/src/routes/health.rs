//! Health check endpoints.
//!
//! `/health` and `/health/ready` ping the store on every call, so both
//! follow the store through outages and recoveries.

use axum::{extract::State, http::StatusCode, Json};
use fleet_store::health::check_connection;
use observability::{health, metrics, HealthStatus};

use crate::response::HealthResponse;
use crate::state::AppState;

async fn ping_store(state: &AppState) -> bool {
    check_connection(state.telemetry.store().store().as_ref()).await
}

/// GET /health - Store status plus internal counters.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_connected = ping_store(&state).await;
    let status = if store_connected {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    };

    Json(HealthResponse {
        status: status.as_str().to_string(),
        store_connected,
        components: health().report().components,
        metrics: metrics().snapshot(),
    })
}

/// GET /health/ready - Readiness check (store answers a ping).
pub async fn ready_handler(State(state): State<AppState>) -> StatusCode {
    if ping_store(&state).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness check.
pub async fn live_handler() -> StatusCode {
    if health().is_alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
