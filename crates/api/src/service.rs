//! Telemetry API layer.
//!
//! Validates caller input, delegates to [`TelemetryStore`], and collapses
//! store failures to the documented sentinels: `success=false`, `[]`, `0`,
//! `{}`. Validation errors are the only errors returned to the caller.

use fleet_core::{
    keys, performance::call_metrics, validate_request, AgentMetricsQuery, AgentPerformance,
    AgentPerformanceQuery, FleetMetrics, IncrementCounterRequest, JsonObject, RecordCallRequest,
    RecordEventRequest, Result, TelemetryEvent, Validate, CALL_COMPLETED,
};
use fleet_store::TelemetryStore;
use observability::metrics;
use serde_json::json;
use tracing::{debug, info};

use crate::response::{
    AgentMetricsResponse, CounterResponse, FleetMetricsResponse, FleetPerformanceResponse,
    RecordResponse,
};

pub struct TelemetryService {
    store: TelemetryStore,
}

impl TelemetryService {
    pub fn new(store: TelemetryStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TelemetryStore {
        &self.store
    }

    fn validate<T: Validate>(&self, request: &T) -> Result<()> {
        validate_request(request).inspect_err(|_| metrics().validation_failures.inc())
    }

    /// Records an arbitrary event stamped with the server clock.
    pub async fn record_event(&self, request: RecordEventRequest) -> Result<RecordResponse> {
        self.validate(&request)?;

        let event = TelemetryEvent::new(request.agent_id, request.event_type, request.metrics)
            .with_metadata(request.metadata);
        let success = self.store.write_event(&event).await.is_ok();

        Ok(RecordResponse::new(
            success,
            "Event recorded",
            "Failed to record event",
        ))
    }

    /// Records a `call_completed` event, then bumps the agent's call counters.
    ///
    /// Counters are only touched after a successful write, one at a time and
    /// without rollback; a failure part way leaves them behind the event log.
    pub async fn record_call(&self, request: RecordCallRequest) -> Result<RecordResponse> {
        self.validate(&request)?;

        let mut call = JsonObject::new();
        call.insert(call_metrics::DURATION.into(), json!(request.duration));
        call.insert(call_metrics::SUCCESSFUL.into(), json!(request.successful));
        call.insert(
            call_metrics::APPOINTMENT_SCHEDULED.into(),
            json!(request.appointment_scheduled),
        );
        call.insert(
            call_metrics::CALL_QUALITY.into(),
            json!(request.call_quality.unwrap_or(0.0)),
        );

        // Always an object; `customerId` only when the caller sent one
        let mut metadata = JsonObject::new();
        if let Some(customer_id) = &request.customer_id {
            metadata.insert("customerId".into(), json!(customer_id));
        }

        let event = TelemetryEvent::new(&request.agent_id, CALL_COMPLETED, call)
            .with_metadata(Some(metadata));
        let success = self.store.write_event(&event).await.is_ok();

        if success {
            let agent_id = &request.agent_id;
            let _ = self
                .store
                .increment_counter(&keys::total_calls_counter(agent_id), 1)
                .await;
            if request.successful {
                let _ = self
                    .store
                    .increment_counter(&keys::successful_calls_counter(agent_id), 1)
                    .await;
            }
            if request.appointment_scheduled {
                let _ = self
                    .store
                    .increment_counter(&keys::appointments_scheduled_counter(agent_id), 1)
                    .await;
            }
            info!(
                agent_id = %agent_id,
                successful = request.successful,
                appointment_scheduled = request.appointment_scheduled,
                "Call recorded"
            );
        }

        Ok(RecordResponse::new(
            success,
            "Call recorded",
            "Failed to record call",
        ))
    }

    /// Raw events plus a count; empty when the read fails.
    pub async fn get_agent_metrics(&self, query: AgentMetricsQuery) -> Result<AgentMetricsResponse> {
        self.validate(&query)?;

        let events = self
            .store
            .read_events_for_agent(&query.agent_id, &query.event_type)
            .await
            .unwrap_or_default();

        Ok(AgentMetricsResponse {
            count: events.len(),
            agent_id: query.agent_id,
            event_type: query.event_type,
            metrics: events,
        })
    }

    /// Returns the new counter value, or 0 when the increment failed.
    ///
    /// A real value of 0 and a failure look the same to the caller.
    pub async fn increment_counter(
        &self,
        request: IncrementCounterRequest,
    ) -> Result<CounterResponse> {
        self.validate(&request)?;

        let new_value = self
            .store
            .increment_counter(&request.counter_key, request.amount())
            .await
            .unwrap_or(0);

        Ok(CounterResponse {
            counter_key: request.counter_key,
            new_value,
        })
    }

    async fn fleet_snapshot(&self) -> Option<FleetMetrics> {
        self.store.read_fleet_metrics().await.ok()
    }

    pub async fn get_fleet_metrics(&self) -> FleetMetricsResponse {
        self.fleet_snapshot().await.into()
    }

    pub async fn get_fleet_performance(&self) -> FleetPerformanceResponse {
        self.fleet_snapshot().await.into()
    }

    /// Call statistics computed over every `call_completed` event for the agent.
    pub async fn get_agent_performance(
        &self,
        query: AgentPerformanceQuery,
    ) -> Result<AgentPerformance> {
        self.validate(&query)?;

        let calls = self
            .store
            .read_events_for_agent(&query.agent_id, CALL_COMPLETED)
            .await
            .unwrap_or_default();

        let performance = AgentPerformance::from_calls(query.agent_id, &calls);
        debug!(
            agent_id = %performance.agent_id,
            total_calls = performance.total_calls,
            "Agent performance computed"
        );
        Ok(performance)
    }
}
