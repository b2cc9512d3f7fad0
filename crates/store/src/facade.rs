//! Telemetry facade: events and counters over a [`KeyValueStore`].
//!
//! Every operation returns an explicit `Result`. Collapsing failures to
//! empty/false/zero results is the API layer's decision, not this one's.

use chrono::Utc;
use fleet_core::{keys, FleetMetrics, RecordedEvent, Result, TelemetryEvent};
use futures::stream::{self, StreamExt};
use observability::metrics;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::StoreSettings;
use crate::kv::KeyValueStore;

/// Stateless bridge between the telemetry vocabulary and the store.
#[derive(Clone)]
pub struct TelemetryStore {
    store: Arc<dyn KeyValueStore>,
    fetch_concurrency: usize,
}

impl TelemetryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            fetch_concurrency: StoreSettings::default().fetch_concurrency,
        }
    }

    pub fn with_fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.fetch_concurrency = fetch_concurrency.max(1);
        self
    }

    /// The underlying store, for health checks.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Writes an event under `telemetry:{agent}:{type}:{timestamp}`, stamped
    /// with `recordedAt`. An existing value under the same key is replaced.
    pub async fn write_event(&self, event: &TelemetryEvent) -> Result<()> {
        let key = event.storage_key();
        let value = serde_json::to_string(&RecordedEvent::stamp(event.clone(), Utc::now()))?;

        match self.store.set(&key, &value).await {
            Ok(()) => {
                metrics().events_written.inc();
                debug!(key = %key, "Telemetry event written");
                Ok(())
            }
            Err(e) => {
                metrics().event_write_failures.inc();
                warn!(key = %key, error = %e, "Failed to write telemetry event");
                Err(e)
            }
        }
    }

    /// Adds `amount` (may be negative) to a counter and returns the new value.
    pub async fn increment_counter(&self, counter_key: &str, amount: i64) -> Result<i64> {
        match self.store.incr(counter_key, amount).await {
            Ok(value) => {
                metrics().counter_increments.inc();
                debug!(counter_key, amount, value, "Counter incremented");
                Ok(value)
            }
            Err(e) => {
                metrics().counter_failures.inc();
                warn!(counter_key, amount, error = %e, "Failed to increment counter");
                Err(e)
            }
        }
    }

    /// Reads every stored event of one type for one agent.
    ///
    /// Fails only if the key listing fails. Individual values that cannot be
    /// fetched or decoded are skipped. No ordering guarantee.
    pub async fn read_events_for_agent(
        &self,
        agent_id: &str,
        event_type: &str,
    ) -> Result<Vec<RecordedEvent>> {
        metrics().agent_reads.inc();
        let pattern = keys::agent_event_pattern(agent_id, event_type);

        let matched = self.store.keys(&pattern).await.map_err(|e| {
            metrics().agent_read_failures.inc();
            warn!(pattern = %pattern, error = %e, "Failed to list agent event keys");
            e
        })?;

        let total = matched.len();
        let events: Vec<RecordedEvent> = stream::iter(matched)
            .map(|key| self.fetch_event(key))
            .buffer_unordered(self.fetch_concurrency)
            .filter_map(|event| async move { event })
            .collect()
            .await;

        metrics().events_read.inc_by(events.len() as u64);
        debug!(
            agent_id,
            event_type,
            matched = total,
            returned = events.len(),
            "Agent events read"
        );
        Ok(events)
    }

    async fn fetch_event(&self, key: String) -> Option<RecordedEvent> {
        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                metrics().events_skipped.inc();
                debug!(key = %key, "Event key vanished before fetch");
                return None;
            }
            Err(e) => {
                metrics().events_skipped.inc();
                warn!(key = %key, error = %e, "Failed to fetch event");
                return None;
            }
        };

        match serde_json::from_str::<RecordedEvent>(&raw) {
            Ok(event) => Some(event),
            Err(e) => {
                metrics().events_skipped.inc();
                warn!(key = %key, error = %e, "Skipping undecodable event");
                None
            }
        }
    }

    /// Counts events per agent and type from key names alone.
    pub async fn read_fleet_metrics(&self) -> Result<FleetMetrics> {
        metrics().fleet_scans.inc();

        let matched = self.store.keys(keys::FLEET_PATTERN).await.map_err(|e| {
            metrics().fleet_scan_failures.inc();
            warn!(error = %e, "Failed to list fleet event keys");
            e
        })?;

        let fleet = FleetMetrics::from_keys(&matched, Utc::now());
        debug!(
            total_agents = fleet.total_agents,
            total_events = fleet.total_events,
            "Fleet metrics aggregated"
        );
        Ok(fleet)
    }
}
