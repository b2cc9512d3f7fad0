//! Application state shared across handlers.

use fleet_store::{KeyValueStore, TelemetryStore};
use std::sync::Arc;

use crate::service::TelemetryService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Telemetry API layer
    pub telemetry: Arc<TelemetryService>,
}

impl AppState {
    pub fn new(telemetry: TelemetryStore) -> Self {
        Self {
            telemetry: Arc::new(TelemetryService::new(telemetry)),
        }
    }

    /// State over any store (the REST client in production, in-memory stores in tests).
    pub fn from_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(TelemetryStore::new(store))
    }
}
