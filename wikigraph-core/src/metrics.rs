use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic event counter.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, delta: u64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Counters for one crawl run, created at startup and read whenever
/// progress gets reported.
#[derive(Debug)]
pub struct Metrics {
    started: Instant,
    pub scrape_success: Counter,
    pub scrape_failed: Counter,
    pub links_discovered: Counter,
    pub merged_pages: Counter,
    pub admission_hits: Counter,
    pub admission_misses: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            scrape_success: Counter::default(),
            scrape_failed: Counter::default(),
            links_discovered: Counter::default(),
            merged_pages: Counter::default(),
            admission_hits: Counter::default(),
            admission_misses: Counter::default(),
        }
    }

    pub fn snapshot(&self, frontier_size: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.started.elapsed().as_secs(),
            frontier_size,
            scrape_success: self.scrape_success.get(),
            scrape_failed: self.scrape_failed.get(),
            links_discovered: self.links_discovered.get(),
            merged_pages: self.merged_pages.get(),
            admission_hits: self.admission_hits.get(),
            admission_misses: self.admission_misses.get(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the counters, cheap to copy and serialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub frontier_size: usize,
    pub scrape_success: u64,
    pub scrape_failed: u64,
    pub links_discovered: u64,
    pub merged_pages: u64,
    pub admission_hits: u64,
    pub admission_misses: u64,
}
