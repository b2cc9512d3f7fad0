//! Store health checks.

use observability::health;
use tracing::{debug, error};

use crate::kv::KeyValueStore;

/// Pings the store and records the outcome in the health registry.
pub async fn check_connection(store: &dyn KeyValueStore) -> bool {
    match store.ping().await {
        Ok(()) => {
            health().store.set_healthy();
            debug!("Store connection healthy");
            true
        }
        Err(e) => {
            health().store.set_unhealthy(e.to_string());
            error!("Store health check failed: {}", e);
            false
        }
    }
}
