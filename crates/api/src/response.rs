//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use fleet_core::{FleetMetrics, RecordedEvent, ValidationErrorCode};
use observability::{ComponentHealthReport, MetricsSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of a write procedure. `success=false` means the store write failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordResponse {
    pub success: bool,
    pub message: String,
}

impl RecordResponse {
    pub fn new(success: bool, ok_message: &str, failed_message: &str) -> Self {
        Self {
            success,
            message: if success { ok_message } else { failed_message }.to_string(),
        }
    }
}

/// Raw events of one type for one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetricsResponse {
    pub agent_id: String,
    pub event_type: String,
    pub count: usize,
    pub metrics: Vec<RecordedEvent>,
}

/// New counter value; 0 also when the increment failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterResponse {
    pub counter_key: String,
    pub new_value: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyObject {}

/// Fleet metrics, or `{}` when the key scan failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FleetMetricsResponse {
    Snapshot(FleetMetrics),
    Empty(EmptyObject),
}

impl From<Option<FleetMetrics>> for FleetMetricsResponse {
    fn from(metrics: Option<FleetMetrics>) -> Self {
        match metrics {
            Some(m) => Self::Snapshot(m),
            None => Self::Empty(EmptyObject::default()),
        }
    }
}

/// Fleet summary with zero defaults when the key scan failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetPerformanceResponse {
    pub timestamp: Option<DateTime<Utc>>,
    pub total_agents: usize,
    pub total_events: usize,
    pub agents: BTreeMap<String, BTreeMap<String, u64>>,
}

impl From<Option<FleetMetrics>> for FleetPerformanceResponse {
    fn from(metrics: Option<FleetMetrics>) -> Self {
        match metrics {
            Some(m) => Self {
                timestamp: Some(m.timestamp),
                total_agents: m.total_agents,
                total_events: m.total_events,
                agents: m.agents,
            },
            None => Self {
                timestamp: None,
                total_agents: 0,
                total_events: 0,
                agents: BTreeMap::new(),
            },
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store_connected: bool,
    /// Per-dependency state, including the last ping error.
    pub components: Vec<ComponentHealthReport>,
    pub metrics: MetricsSnapshot,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        if !details.is_empty() {
            self.details = Some(details);
        }
        self
    }
}

/// API error with a machine-readable code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(
            StatusCode::BAD_REQUEST,
            ValidationErrorCode::InvalidFormat.code(),
            msg,
        )
    }

    pub fn validation(code: impl Into<String>, msg: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            response: ErrorResponse::new(msg, code).with_details(details),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<fleet_core::Error> for ApiError {
    fn from(err: fleet_core::Error) -> Self {
        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = err.error_code().unwrap_or("INTERNAL");

        match err {
            fleet_core::Error::ValidationWithCode {
                code,
                message,
                details,
            } => ApiError::validation(code, message, details),
            other => ApiError::with_code(status, code, other.to_string()),
        }
    }
}
