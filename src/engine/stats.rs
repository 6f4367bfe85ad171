// Poller counters — cycles run, registry requests issued and failed, cycle timing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub cycles: u64,
    pub requests: u64,
    pub failed_requests: u64,
    pub last_cycle_ms: u64,
    pub failure_rate: f64,
}

pub struct StatsCollector {
    cycles: AtomicU64,
    requests: AtomicU64,
    failed_requests: AtomicU64,
    last_cycle_ms: AtomicU64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            cycles: AtomicU64::new(0),
            requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            last_cycle_ms: AtomicU64::new(0),
        }
    }

    /// Record a finished cycle: `requests` fetches were issued, `failed` of them failed.
    pub fn record_cycle(&self, requests: u64, failed: u64, elapsed: Duration) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.requests.fetch_add(requests, Ordering::Relaxed);
        self.failed_requests.fetch_add(failed, Ordering::Relaxed);
        self.last_cycle_ms
            .store(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let requests = self.requests.load(Ordering::Relaxed);
        let failed_requests = self.failed_requests.load(Ordering::Relaxed);
        let failure_rate = if requests > 0 {
            failed_requests as f64 / requests as f64
        } else {
            0.0
        };

        StatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            requests,
            failed_requests,
            last_cycle_ms: self.last_cycle_ms.load(Ordering::Relaxed),
            failure_rate,
        }
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_basic() {
        let stats = StatsCollector::new();
        assert_eq!(stats.snapshot().failure_rate, 0.0);

        stats.record_cycle(4, 1, Duration::from_millis(120));
        stats.record_cycle(4, 0, Duration::from_millis(80));

        let snap = stats.snapshot();
        assert_eq!(snap.cycles, 2);
        assert_eq!(snap.requests, 8);
        assert_eq!(snap.failed_requests, 1);
        assert_eq!(snap.last_cycle_ms, 80);
        assert!((snap.failure_rate - 0.125).abs() < f64::EPSILON);
    }
}
