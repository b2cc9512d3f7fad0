//! API routes.

pub mod health;
pub mod telemetry;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/telemetry/recordEvent", post(telemetry::record_event_handler))
        .route("/telemetry/getAgentMetrics", get(telemetry::agent_metrics_handler))
        .route("/telemetry/incrementCounter", post(telemetry::increment_counter_handler))
        .route("/telemetry/getFleetMetrics", get(telemetry::fleet_metrics_handler))
        .route("/telemetry/recordCall", post(telemetry::record_call_handler))
        .route("/telemetry/getAgentPerformance", get(telemetry::agent_performance_handler))
        .route("/telemetry/getFleetPerformance", get(telemetry::fleet_performance_handler))
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
