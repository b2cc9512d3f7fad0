//! Mock implementations for testing.

use async_trait::async_trait;
use fleet_core::{Error, Result};
use fleet_store::KeyValueStore;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory store speaking the same command set as the REST client.
///
/// Keys live in one map like a real store, so `KEYS telemetry:*` sees
/// counters too if their names happen to match.
#[derive(Clone, Default)]
pub struct MockStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    /// Simulate a store outage if set.
    should_fail: Arc<Mutex<bool>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set failure mode for testing error handling.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }

    /// Raw value stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    /// Current counter value; 0 when never incremented.
    pub fn counter(&self, key: &str) -> i64 {
        self.raw(key).and_then(|v| v.parse().ok()).unwrap_or(0)
    }

    /// Number of keys with the given prefix.
    pub fn count_prefixed(&self, prefix: &str) -> usize {
        self.values
            .lock()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .count()
    }

    /// Writes a value directly, bypassing the API.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }

    fn check(&self) -> Result<()> {
        if *self.should_fail.lock() {
            return Err(Error::transport("Mock store failure"));
        }
        Ok(())
    }
}

/// Converts a `*` glob into an anchored regex.
fn glob_regex(pattern: &str) -> Regex {
    let escaped = regex::escape(pattern).replace(r"\*", ".*");
    Regex::new(&format!("^{escaped}$")).expect("escaped glob is a valid regex")
}

#[async_trait]
impl KeyValueStore for MockStore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.values.lock().get(key).cloned())
    }

    async fn incr(&self, key: &str, amount: i64) -> Result<i64> {
        self.check()?;
        let mut values = self.values.lock();
        let current = match values.get(key) {
            Some(v) => v
                .parse::<i64>()
                .map_err(|_| Error::transport("value is not an integer or out of range"))?,
            None => 0,
        };
        let next = current + amount;
        values.insert(key.to_string(), next.to_string());
        Ok(next)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.check()?;
        let re = glob_regex(pattern);
        Ok(self
            .values
            .lock()
            .keys()
            .filter(|k| re.is_match(k))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        self.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_store_glob_matches_prefix_only() {
        let store = MockStore::new();
        store.set("telemetry:a:x:1", "{}").await.unwrap();
        store.set("telemetry:b:x:1", "{}").await.unwrap();
        store.set("calls:total:a", "1").await.unwrap();

        let mut keys = store.keys("telemetry:a:x:*").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["telemetry:a:x:1"]);
        assert_eq!(store.keys("telemetry:*").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_store_incr_accumulates() {
        let store = MockStore::new();
        assert_eq!(store.incr("c", 1).await.unwrap(), 1);
        assert_eq!(store.incr("c", 4).await.unwrap(), 5);
        assert_eq!(store.incr("c", -2).await.unwrap(), 3);
        assert_eq!(store.counter("c"), 3);
    }

    #[tokio::test]
    async fn test_mock_store_failure_mode() {
        let store = MockStore::new();
        store.set_should_fail(true);

        assert!(store.set("k", "v").await.is_err());
        assert!(store.ping().await.is_err());
        assert!(store.keys("*").await.is_err());
    }
}
