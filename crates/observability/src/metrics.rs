//! In-process counters for telemetry traffic.
//!
//! These describe this service's own behavior (how many writes were
//! swallowed, how many stored values failed to parse), which the sentinel
//! results of the API cannot show.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Latency histogram for remote store round trips.
#[derive(Debug)]
pub struct Histogram {
    /// Upper bounds in ms; the final slot collects everything slower.
    buckets: [AtomicU64; 9],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 8] = [5, 10, 25, 50, 100, 250, 1000, 5000];

    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let slot = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len());
        self.buckets[slot].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum.load(Ordering::Relaxed) as f64 / count as f64
        }
    }

    /// `(upper bound, count)` pairs; the overflow slot reports `u64::MAX`.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .copied()
            .chain(std::iter::once(u64::MAX))
            .zip(self.buckets.iter())
            .map(|(bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct Metrics {
    // Writes
    pub events_written: Counter,
    pub event_write_failures: Counter,
    pub counter_increments: Counter,
    pub counter_failures: Counter,

    // Reads
    pub agent_reads: Counter,
    pub agent_read_failures: Counter,
    pub events_read: Counter,
    /// Individual values dropped during an agent read (fetch error, miss, or bad JSON).
    pub events_skipped: Counter,
    pub fleet_scans: Counter,
    pub fleet_scan_failures: Counter,

    // Transport
    pub store_requests: Counter,
    pub store_errors: Counter,
    pub store_latency_ms: Histogram,

    pub validation_failures: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            events_written: self.events_written.get(),
            event_write_failures: self.event_write_failures.get(),
            counter_increments: self.counter_increments.get(),
            counter_failures: self.counter_failures.get(),
            agent_reads: self.agent_reads.get(),
            events_read: self.events_read.get(),
            events_skipped: self.events_skipped.get(),
            agent_read_failures: self.agent_read_failures.get(),
            fleet_scans: self.fleet_scans.get(),
            fleet_scan_failures: self.fleet_scan_failures.get(),
            store_requests: self.store_requests.get(),
            store_errors: self.store_errors.get(),
            store_latency_mean_ms: self.store_latency_ms.mean(),
            store_latency_buckets_ms: self.store_latency_ms.buckets(),
            validation_failures: self.validation_failures.get(),
        }
    }
}

/// Point-in-time copy of [`Metrics`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub events_written: u64,
    pub event_write_failures: u64,
    pub counter_increments: u64,
    pub counter_failures: u64,
    pub agent_reads: u64,
    pub events_read: u64,
    pub events_skipped: u64,
    pub agent_read_failures: u64,
    pub fleet_scans: u64,
    pub fleet_scan_failures: u64,
    pub store_requests: u64,
    pub store_errors: u64,
    pub store_latency_mean_ms: f64,
    /// `(upper bound ms, count)` pairs
    pub store_latency_buckets_ms: Vec<(u64, u64)>,
    pub validation_failures: u64,
}

pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
