//! Request Metrics
//!
//! Per-endpoint request counters and latency tracking.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector shared by all request handlers
#[derive(Debug)]
pub struct Metrics {
    /// Total requests served
    total_requests: AtomicU64,

    /// Requests answered with an empty result
    empty_responses: AtomicU64,

    /// Requests per endpoint
    by_endpoint: RwLock<BTreeMap<String, u64>>,

    latency_sum_us: AtomicU64,
    latency_count: AtomicU64,
    latency_min_us: AtomicU64,
    latency_max_us: AtomicU64,
}

/// Point-in-time view of [`Metrics`], serialized by the stats endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub empty_responses: u64,
    pub by_endpoint: BTreeMap<String, u64>,
    pub avg_latency_us: f64,
    pub min_latency_us: u64,
    pub max_latency_us: u64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            empty_responses: AtomicU64::new(0),
            by_endpoint: RwLock::new(BTreeMap::new()),
            latency_sum_us: AtomicU64::new(0),
            latency_count: AtomicU64::new(0),
            latency_min_us: AtomicU64::new(u64::MAX),
            latency_max_us: AtomicU64::new(0),
        }
    }

    /// Record a served request. `empty` marks a request that fell back to
    /// an empty result.
    pub fn record_request(&self, endpoint: &str, latency: Duration, empty: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if empty {
            self.empty_responses.fetch_add(1, Ordering::Relaxed);
        }

        *self
            .by_endpoint
            .write()
            .entry(endpoint.to_string())
            .or_insert(0) += 1;

        let latency_us = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        self.latency_count.fetch_add(1, Ordering::Relaxed);
        self.latency_min_us.fetch_min(latency_us, Ordering::Relaxed);
        self.latency_max_us.fetch_max(latency_us, Ordering::Relaxed);
    }

    /// Get total request count
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Get count of empty-result responses
    pub fn empty_responses(&self) -> u64 {
        self.empty_responses.load(Ordering::Relaxed)
    }

    /// Get requests by endpoint
    pub fn by_endpoint(&self) -> BTreeMap<String, u64> {
        self.by_endpoint.read().clone()
    }

    /// Get average latency in microseconds
    pub fn avg_latency_us(&self) -> f64 {
        let count = self.latency_count.load(Ordering::Relaxed);
        if count == 0 {
            return 0.0;
        }
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        sum as f64 / count as f64
    }

    /// Get min latency in microseconds
    pub fn min_latency_us(&self) -> u64 {
        let min = self.latency_min_us.load(Ordering::Relaxed);
        if min == u64::MAX {
            0
        } else {
            min
        }
    }

    /// Get max latency in microseconds
    pub fn max_latency_us(&self) -> u64 {
        self.latency_max_us.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests(),
            empty_responses: self.empty_responses(),
            by_endpoint: self.by_endpoint(),
            avg_latency_us: self.avg_latency_us(),
            min_latency_us: self.min_latency_us(),
            max_latency_us: self.max_latency_us(),
        }
    }

    /// Get a summary of metrics
    pub fn summary(&self) -> String {
        format!(
            "Requests: {} ({} empty) | Latency (µs): avg={:.1}, min={}, max={}",
            self.total_requests(),
            self.empty_responses(),
            self.avg_latency_us(),
            self.min_latency_us(),
            self.max_latency_us()
        )
    }
}
