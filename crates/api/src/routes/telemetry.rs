//! Telemetry procedures.
//!
//! Mutations are `POST` with a JSON body, queries are `GET` with query
//! parameters. Store failures never produce an error status; they show up
//! as `success: false`, empty lists, zero values, or `{}`.

use axum::{extract::State, Json};
use fleet_core::{
    AgentMetricsQuery, AgentPerformance, AgentPerformanceQuery, IncrementCounterRequest,
    RecordCallRequest, RecordEventRequest,
};

use crate::extractors::{ApiJson, ApiQuery};
use crate::response::{
    AgentMetricsResponse, ApiError, CounterResponse, FleetMetricsResponse,
    FleetPerformanceResponse, RecordResponse,
};
use crate::state::AppState;

/// POST /telemetry/recordEvent
pub async fn record_event_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RecordEventRequest>,
) -> Result<Json<RecordResponse>, ApiError> {
    Ok(Json(state.telemetry.record_event(request).await?))
}

/// GET /telemetry/getAgentMetrics?agentId=..&eventType=..
pub async fn agent_metrics_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AgentMetricsQuery>,
) -> Result<Json<AgentMetricsResponse>, ApiError> {
    Ok(Json(state.telemetry.get_agent_metrics(query).await?))
}

/// POST /telemetry/incrementCounter
pub async fn increment_counter_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<IncrementCounterRequest>,
) -> Result<Json<CounterResponse>, ApiError> {
    Ok(Json(state.telemetry.increment_counter(request).await?))
}

/// GET /telemetry/getFleetMetrics
pub async fn fleet_metrics_handler(State(state): State<AppState>) -> Json<FleetMetricsResponse> {
    Json(state.telemetry.get_fleet_metrics().await)
}

/// POST /telemetry/recordCall
pub async fn record_call_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RecordCallRequest>,
) -> Result<Json<RecordResponse>, ApiError> {
    Ok(Json(state.telemetry.record_call(request).await?))
}

/// GET /telemetry/getAgentPerformance?agentId=..
pub async fn agent_performance_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AgentPerformanceQuery>,
) -> Result<Json<AgentPerformance>, ApiError> {
    Ok(Json(state.telemetry.get_agent_performance(query).await?))
}

/// GET /telemetry/getFleetPerformance
pub async fn fleet_performance_handler(
    State(state): State<AppState>,
) -> Json<FleetPerformanceResponse> {
    Json(state.telemetry.get_fleet_performance().await)
}
