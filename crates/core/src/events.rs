//! Telemetry event and derived aggregate types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::keys;

/// Event type written by call recording.
pub const CALL_COMPLETED: &str = "call_completed";

/// Open-schema JSON object used for event metrics and metadata.
pub type JsonObject = Map<String, Value>;

/// One observation emitted by an agent.
///
/// `(agent_id, event_type, timestamp)` is the storage identity; writing the
/// same triple twice overwrites the earlier value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    /// Milliseconds since epoch, from the caller's clock.
    pub timestamp: i64,
    pub agent_id: String,
    pub event_type: String,
    pub metrics: JsonObject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonObject>,
}

impl TelemetryEvent {
    /// Creates an event stamped with the current time.
    pub fn new(
        agent_id: impl Into<String>,
        event_type: impl Into<String>,
        metrics: JsonObject,
    ) -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            agent_id: agent_id.into(),
            event_type: event_type.into(),
            metrics,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Option<JsonObject>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Key this event is stored under.
    pub fn storage_key(&self) -> String {
        keys::event_key(&self.agent_id, &self.event_type, self.timestamp)
    }

    /// Numeric metric value; missing or non-numeric metrics read as 0.
    pub fn metric_f64(&self, name: &str) -> f64 {
        self.metrics.get(name).and_then(Value::as_f64).unwrap_or(0.0)
    }

    /// Boolean metric flag; anything other than literal `true` reads as false.
    pub fn metric_flag(&self, name: &str) -> bool {
        matches!(self.metrics.get(name), Some(Value::Bool(true)))
    }
}

/// An event as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    #[serde(flatten)]
    pub event: TelemetryEvent,
    /// Server clock at write time. Absent on values written by other tools.
    #[serde(
        rename = "recordedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl RecordedEvent {
    /// Stamps an event for writing.
    pub fn stamp(event: TelemetryEvent, recorded_at: DateTime<Utc>) -> Self {
        Self {
            event,
            recorded_at: Some(recorded_at),
        }
    }
}

/// Fleet-wide counts derived from key names alone.
///
/// Never persisted; recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetMetrics {
    /// Snapshot time.
    pub timestamp: DateTime<Utc>,
    pub total_agents: usize,
    /// agent id -> event type -> occurrence count
    pub agents: BTreeMap<String, BTreeMap<String, u64>>,
    /// Every key matched by the scan, including ones that did not parse.
    pub total_events: usize,
}

impl FleetMetrics {
    /// Aggregates a `telemetry:*` key listing.
    pub fn from_keys<S: AsRef<str>>(keys: &[S], timestamp: DateTime<Utc>) -> Self {
        let mut agents: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();

        for key in keys {
            if let Some((agent_id, event_type)) = keys::parse_event_key(key.as_ref()) {
                *agents
                    .entry(agent_id.to_string())
                    .or_default()
                    .entry(event_type.to_string())
                    .or_insert(0) += 1;
            }
        }

        Self {
            timestamp,
            total_agents: agents.len(),
            agents,
            total_events: keys.len(),
        }
    }
}
