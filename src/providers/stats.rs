/// Per-backend request statistics
///
/// Every backend client owns one tracker; all typed providers sharing that
/// client feed the same counters, so the numbers describe the backend, not
/// individual resources.
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct StatsInner {
    total_requests: u64,
    successes: u64,
    failures: u64,
    total_latency_ms: f64,
    last_error: Option<String>,
    last_success_at: Option<DateTime<Utc>>,
}

/// Snapshot of one backend's request statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProviderStats {
    pub total_requests: u64,
    pub successes: u64,
    pub failures: u64,
    pub avg_latency_ms: f64,
    pub last_error: Option<String>,
    pub last_success_at: Option<DateTime<Utc>>,
}

/// Thread-safe stats accumulator for one backend
#[derive(Debug, Default)]
pub struct ProviderStatsTracker {
    inner: RwLock<StatsInner>,
}

impl ProviderStatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_request(&self, success: bool, elapsed_ms: f64) {
        let mut inner = self.inner.write().await;
        inner.total_requests += 1;
        inner.total_latency_ms += elapsed_ms;
        if success {
            inner.successes += 1;
            inner.last_success_at = Some(Utc::now());
        } else {
            inner.failures += 1;
        }
    }

    pub async fn record_error(&self, message: String) {
        let mut inner = self.inner.write().await;
        inner.last_error = Some(message);
    }

    pub async fn get_stats(&self) -> ProviderStats {
        let inner = self.inner.read().await;
        let avg_latency_ms = if inner.total_requests == 0 {
            0.0
        } else {
            inner.total_latency_ms / inner.total_requests as f64
        };

        ProviderStats {
            total_requests: inner.total_requests,
            successes: inner.successes,
            failures: inner.failures,
            avg_latency_ms,
            last_error: inner.last_error.clone(),
            last_success_at: inner.last_success_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stats_accumulate() {
        let tracker = ProviderStatsTracker::new();

        tracker.record_request(true, 120.0).await;
        tracker.record_request(false, 80.0).await;
        tracker.record_error("HTTP 503".to_string()).await;

        let stats = tracker.get_stats().await;
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.successes, 1);
        assert_eq!(stats.failures, 1);
        assert!((stats.avg_latency_ms - 100.0).abs() < f64::EPSILON);
        assert_eq!(stats.last_error.as_deref(), Some("HTTP 503"));
        assert!(stats.last_success_at.is_some());
    }

    #[tokio::test]
    async fn test_empty_stats() {
        let tracker = ProviderStatsTracker::new();
        let stats = tracker.get_stats().await;
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.avg_latency_ms, 0.0);
    }
}
