/// Shared HTTP plumbing for backend clients: rate limiting + typed GET
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use url::Url;

use crate::errors::ProviderError;
use crate::logger::{self, LogTag};
use crate::providers::stats::ProviderStatsTracker;

/// Rate limiter pacing requests to a per-minute budget. One request at a
/// time per backend; the minimum interval between requests is derived from
/// the per-minute cap.
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    last_request: Arc<Mutex<Option<Instant>>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(max_per_minute: usize) -> Self {
        let min_interval = if max_per_minute > 0 {
            Duration::from_secs_f64(60.0 / max_per_minute as f64)
        } else {
            Duration::ZERO
        };

        Self {
            semaphore: Arc::new(Semaphore::new(1)),
            last_request: Arc::new(Mutex::new(None)),
            min_interval,
        }
    }

    /// Wait until a request may be issued.
    pub async fn acquire(&self) -> RateLimitGuard {
        // The semaphore is never closed, so acquire cannot fail.
        let permit = match self.semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => unreachable!("rate limiter semaphore is never closed"),
        };

        if !self.min_interval.is_zero() {
            let mut last = self.last_request.lock().await;
            let now = Instant::now();

            if let Some(last_time) = *last {
                let elapsed = last_time.elapsed();
                if elapsed < self.min_interval {
                    let sleep_duration = self.min_interval - elapsed;
                    drop(last);
                    tokio::time::sleep(sleep_duration).await;
                    let mut relocked = self.last_request.lock().await;
                    *relocked = Some(Instant::now());
                } else {
                    *last = Some(now);
                }
            } else {
                *last = Some(now);
            }
        }

        RateLimitGuard { _permit: permit }
    }
}

/// RAII guard returned by [`RateLimiter::acquire`]
pub struct RateLimitGuard {
    _permit: OwnedSemaphorePermit,
}

/// HTTP client for one backend: base URL, timeout, rate limiting, stats.
pub struct BackendClient {
    name: &'static str,
    client: Client,
    base_url: Url,
    timeout: Duration,
    limiter: RateLimiter,
    stats: Arc<ProviderStatsTracker>,
}

impl BackendClient {
    pub fn new(
        name: &'static str,
        base_url: Url,
        timeout: Duration,
        rate_limit_per_minute: usize,
    ) -> Self {
        Self {
            name,
            client: Client::new(),
            base_url,
            timeout,
            limiter: RateLimiter::new(rate_limit_per_minute),
            stats: Arc::new(ProviderStatsTracker::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn get_stats(&self) -> crate::providers::stats::ProviderStats {
        self.stats.get_stats().await
    }

    /// GET `path` (relative to the base URL) and deserialize the body.
    ///
    /// 404 and 204 mean "no answer" (`Ok(None)`), not an error; anything
    /// else non-success is a `ProviderError::Http`. Responses are parsed
    /// into the typed DTO here, at the boundary - malformed payloads never
    /// travel further into the system.
    pub async fn get_json<T>(&self, path: &str) -> Result<Option<T>, ProviderError>
    where
        T: DeserializeOwned,
    {
        let url = self.base_url.join(path).map_err(|e| ProviderError::Network {
            provider: self.name,
            message: format!("invalid request path '{}': {}", path, e),
        })?;

        let _guard = self.limiter.acquire().await;

        let start = Instant::now();
        let response_result = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await;
        let elapsed = start.elapsed().as_millis() as f64;

        let response = match response_result {
            Ok(response) => response,
            Err(err) => {
                self.stats.record_request(false, elapsed).await;
                self.stats
                    .record_error(format!("Request failed: {}", err))
                    .await;
                return Err(ProviderError::Network {
                    provider: self.name,
                    message: err.to_string(),
                });
            }
        };

        let status = response.status();

        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            self.stats.record_request(true, elapsed).await;
            logger::verbose(
                LogTag::Provider,
                &format!("{} has no data for {} ({})", self.name, path, status),
            );
            return Ok(None);
        }

        if !status.is_success() {
            self.stats.record_request(false, elapsed).await;
            self.stats
                .record_error(format!("HTTP {} on {}", status, path))
                .await;
            return Err(ProviderError::Http {
                provider: self.name,
                status: status.as_u16(),
            });
        }

        match response.json::<T>().await {
            Ok(value) => {
                self.stats.record_request(true, elapsed).await;
                Ok(Some(value))
            }
            Err(err) => {
                self.stats.record_request(false, elapsed).await;
                self.stats
                    .record_error(format!("Parse error on {}: {}", path, err))
                    .await;
                Err(ProviderError::Parse {
                    provider: self.name,
                    message: err.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter_paces_requests() {
        // 600/min = one request per 100ms
        let limiter = RateLimiter::new(600);

        let start = Instant::now();
        drop(limiter.acquire().await);
        drop(limiter.acquire().await);
        drop(limiter.acquire().await);

        // Two waits of ~100ms between three acquisitions
        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_unlimited_rate_limiter_does_not_sleep() {
        let limiter = RateLimiter::new(0);

        let start = Instant::now();
        for _ in 0..10 {
            drop(limiter.acquire().await);
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
