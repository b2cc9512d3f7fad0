//! Key-value store abstraction.

use async_trait::async_trait;
use fleet_core::Result;

/// The subset of store commands the telemetry facade needs.
///
/// Implemented by [`crate::RestStore`] in production and by in-memory
/// stores in tests.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// `SET key value`
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// `GET key`; `None` on a miss.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Atomic `INCRBY key amount`; returns the new value.
    async fn incr(&self, key: &str, amount: i64) -> Result<i64>;

    /// `KEYS pattern` with `*` globbing. Order is whatever the store returns.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// Round trip used by health checks.
    async fn ping(&self) -> Result<()>;
}
