/// Fallback chain: cache-aside resolution over prioritized providers
///
/// One chain resolves one logical resource ("profile", "metrics", ...).
/// The cache is consulted first; on miss, providers are tried strictly in
/// declared priority order - higher-priority providers suppress lower ones
/// by design (warehouse > live query > static data), this is a trust
/// hierarchy, not a race. A provider that errors, times out, or has no
/// answer is logged and skipped. When every provider comes up empty a
/// deterministic synthetic value is served instead. `resolve` is total:
/// callers always receive a usable value and never see a provider failure.
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::cache::BoundedCache;
use crate::errors::ProviderError;
use crate::logger::{self, LogTag};
use crate::providers::Provider;
use crate::synthetic::{synthesize_or_placeholder, Synthesize};

/// The shared cache instance all chains resolve through. Values are stored
/// as validated JSON so differently-typed chains can share one bounded
/// keyspace (and one invalidation surface).
pub type SharedCache = Arc<BoundedCache<String, Value>>;

/// Where a resolved value came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Served from the bounded cache
    Cache,
    /// Fetched from the named provider on this call
    Provider(&'static str),
    /// Synthesized because every provider was exhausted
    Fallback,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Cache => write!(f, "cache"),
            Source::Provider(name) => write!(f, "{}", name),
            Source::Fallback => write!(f, "fallback"),
        }
    }
}

/// A value plus its provenance tag
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Resolved<T> {
    pub fn is_degraded(&self) -> bool {
        self.source == Source::Fallback
    }
}

/// The one place error-swallowing policy lives: how long each provider call
/// may take, and how long a synthesized stand-in may be cached.
#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    pub provider_timeout: Duration,
    pub synthetic_ttl: Duration,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_millis(2500),
            synthetic_ttl: Duration::from_secs(60),
        }
    }
}

/// A provider plus the TTL its answers are cached with
struct RankedProvider<T> {
    provider: Arc<dyn Provider<T>>,
    cache_ttl: Duration,
}

/// Ordered providers + cache-aside semantics for one logical resource
pub struct FallbackChain<T> {
    field: &'static str,
    providers: Vec<RankedProvider<T>>,
    cache: SharedCache,
    policy: FallbackPolicy,
}

impl<T> FallbackChain<T>
where
    T: DeserializeOwned + Serialize + Synthesize + Clone + Send + Sync + 'static,
{
    pub fn new(field: &'static str, cache: SharedCache, policy: FallbackPolicy) -> Self {
        Self {
            field,
            providers: Vec::new(),
            cache,
            policy,
        }
    }

    /// Append a provider at the lowest priority so far. Declaration order is
    /// resolution order.
    pub fn with_provider(mut self, provider: Arc<dyn Provider<T>>, cache_ttl: Duration) -> Self {
        self.providers.push(RankedProvider {
            provider,
            cache_ttl,
        });
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub async fn resolve(&self, key: &str) -> Resolved<T> {
        self.resolve_with_cancel(key, &CancellationToken::new())
            .await
    }

    /// Resolve with an externally owned cancellation token. Cancellation is
    /// observed between providers and around each provider call; a cancelled
    /// resolve still returns a value (the synthetic fallback) rather than an
    /// error, so abandoning callers never poison shared state.
    pub async fn resolve_with_cancel(&self, key: &str, cancel: &CancellationToken) -> Resolved<T> {
        let cache_key = key.to_string();

        if let Some(raw) = self.cache.get(&cache_key) {
            match serde_json::from_value::<T>(raw) {
                Ok(value) => {
                    return Resolved {
                        value,
                        source: Source::Cache,
                    }
                }
                Err(e) => {
                    // A cached entry that no longer matches the schema is
                    // treated as absent and re-resolved.
                    logger::warning(
                        LogTag::Chain,
                        &format!("Dropping undecodable cache entry for {}: {}", key, e),
                    );
                    self.cache.delete(&cache_key);
                }
            }
        }

        for ranked in &self.providers {
            if cancel.is_cancelled() {
                logger::debug(
                    LogTag::Chain,
                    &format!("Resolve of {} cancelled, serving fallback", key),
                );
                break;
            }

            match self.try_provider(ranked, key, cancel).await {
                Some(value) => {
                    self.store(&cache_key, &value, ranked.cache_ttl);
                    return Resolved {
                        value,
                        source: Source::Provider(ranked.provider.name()),
                    };
                }
                None => continue,
            }
        }

        if !self.providers.is_empty() && !cancel.is_cancelled() {
            logger::warning(
                LogTag::Chain,
                &format!(
                    "All {} providers exhausted for {}, synthesizing fallback",
                    self.providers.len(),
                    key
                ),
            );
        }

        let value: T = synthesize_or_placeholder(key);
        self.store(&cache_key, &value, self.policy.synthetic_ttl);
        Resolved {
            value,
            source: Source::Fallback,
        }
    }

    /// One provider attempt. Timeout, provider error, and "no answer" all
    /// collapse to `None` here - this is the single spot failures are
    /// swallowed.
    async fn try_provider(
        &self,
        ranked: &RankedProvider<T>,
        key: &str,
        cancel: &CancellationToken,
    ) -> Option<T> {
        let name = ranked.provider.name();

        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                logger::debug(
                    LogTag::Chain,
                    &format!("{} call for {} abandoned by caller", name, key),
                );
                return None;
            }
            outcome = tokio::time::timeout(
                self.policy.provider_timeout,
                ranked.provider.fetch(key),
            ) => outcome,
        };

        match outcome {
            Err(_elapsed) => {
                let err = ProviderError::Timeout {
                    provider: name,
                    timeout_ms: self.policy.provider_timeout.as_millis() as u64,
                };
                logger::warning(LogTag::Chain, &format!("{} for {}", err, key));
                None
            }
            Ok(Err(err)) => {
                logger::warning(LogTag::Chain, &format!("{} for {}", err, key));
                None
            }
            Ok(Ok(None)) => {
                logger::debug(
                    LogTag::Chain,
                    &format!("{} has no answer for {}", name, key),
                );
                None
            }
            Ok(Ok(Some(value))) => Some(value),
        }
    }

    fn store(&self, cache_key: &str, value: &T, ttl: Duration) {
        match serde_json::to_value(value) {
            Ok(raw) => self.cache.set_with_ttl(cache_key.to_string(), raw, ttl),
            Err(e) => {
                // Value still gets returned to the caller; it just is not
                // cached for the next one.
                logger::warning(
                    LogTag::Chain,
                    &format!("Failed to encode {} for caching: {}", cache_key, e),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
    struct TestDto {
        label: String,
    }

    impl Synthesize for TestDto {
        fn synthesize(key: &str) -> Self {
            Self {
                label: format!("synthetic:{}", crate::synthetic::seed_for_key(key)),
            }
        }

        fn placeholder() -> Self {
            Self {
                label: String::new(),
            }
        }
    }

    enum Behavior {
        Answer(&'static str),
        NoAnswer,
        Fail,
        Hang,
    }

    struct MockProvider {
        name: &'static str,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Provider<TestDto> for MockProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(&self, _key: &str) -> Result<Option<TestDto>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Answer(label) => Ok(Some(TestDto {
                    label: label.to_string(),
                })),
                Behavior::NoAnswer => Ok(None),
                Behavior::Fail => Err(ProviderError::Http {
                    provider: self.name,
                    status: 503,
                }),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(None)
                }
            }
        }
    }

    fn test_cache() -> SharedCache {
        Arc::new(BoundedCache::new(CacheConfig::custom(
            Duration::from_secs(60),
            100,
        )))
    }

    fn fast_policy() -> FallbackPolicy {
        FallbackPolicy {
            provider_timeout: Duration::from_millis(50),
            synthetic_ttl: Duration::from_secs(60),
        }
    }

    #[tokio::test]
    async fn test_short_circuits_on_first_answer() {
        let primary = MockProvider::new("primary", Behavior::Answer("from-primary"));
        let secondary = MockProvider::new("secondary", Behavior::Answer("from-secondary"));

        let chain = FallbackChain::new("profile", test_cache(), fast_policy())
            .with_provider(primary.clone(), Duration::from_secs(60))
            .with_provider(secondary.clone(), Duration::from_secs(60));

        let resolved = chain.resolve("contractor:X-1:profile").await;

        assert_eq!(resolved.value.label, "from-primary");
        assert_eq!(resolved.source, Source::Provider("primary"));
        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.call_count(), 0);
    }

    #[tokio::test]
    async fn test_falls_through_errors_and_no_answers() {
        let failing = MockProvider::new("failing", Behavior::Fail);
        let empty = MockProvider::new("empty", Behavior::NoAnswer);
        let answering = MockProvider::new("answering", Behavior::Answer("third-tier"));

        let chain = FallbackChain::new("profile", test_cache(), fast_policy())
            .with_provider(failing.clone(), Duration::from_secs(60))
            .with_provider(empty.clone(), Duration::from_secs(60))
            .with_provider(answering.clone(), Duration::from_secs(60));

        let resolved = chain.resolve("contractor:X-2:profile").await;

        assert_eq!(resolved.source, Source::Provider("answering"));
        assert_eq!(failing.call_count(), 1);
        assert_eq!(empty.call_count(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_treated_as_no_answer() {
        let hanging = MockProvider::new("hanging", Behavior::Hang);
        let answering = MockProvider::new("answering", Behavior::Answer("rescued"));

        let chain = FallbackChain::new("profile", test_cache(), fast_policy())
            .with_provider(hanging.clone(), Duration::from_secs(60))
            .with_provider(answering.clone(), Duration::from_secs(60));

        let resolved = chain.resolve("contractor:X-3:profile").await;

        assert_eq!(resolved.source, Source::Provider("answering"));
        assert_eq!(resolved.value.label, "rescued");
    }

    #[tokio::test]
    async fn test_exhausted_chain_synthesizes_deterministically() {
        let cache = test_cache();
        let chain = FallbackChain::new("profile", cache.clone(), fast_policy())
            .with_provider(MockProvider::new("a", Behavior::Fail), Duration::from_secs(60))
            .with_provider(MockProvider::new("b", Behavior::Hang), Duration::from_secs(60));

        let first = chain.resolve("contractor:X-4:profile").await;
        assert_eq!(first.source, Source::Fallback);
        assert!(first.is_degraded());

        // Drop the cached fallback so the generator runs again
        cache.clear(None);

        let second = chain.resolve("contractor:X-4:profile").await;
        assert_eq!(second.source, Source::Fallback);
        assert_eq!(first.value, second.value);
    }

    #[tokio::test]
    async fn test_second_resolve_hits_cache() {
        let provider = MockProvider::new("primary", Behavior::Answer("cached-later"));
        let chain = FallbackChain::new("profile", test_cache(), fast_policy())
            .with_provider(provider.clone(), Duration::from_secs(60));

        let first = chain.resolve("contractor:X-5:profile").await;
        assert_eq!(first.source, Source::Provider("primary"));

        let second = chain.resolve("contractor:X-5:profile").await;
        assert_eq!(second.source, Source::Cache);
        assert_eq!(second.value.label, "cached-later");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_synthetic_ttl_expires_quickly() {
        let cache = test_cache();
        let policy = FallbackPolicy {
            provider_timeout: Duration::from_millis(50),
            synthetic_ttl: Duration::from_millis(30),
        };
        let chain: FallbackChain<TestDto> =
            FallbackChain::new("profile", cache.clone(), policy);

        let resolved = chain.resolve("contractor:X-6:profile").await;
        assert_eq!(resolved.source, Source::Fallback);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!cache.has(&"contractor:X-6:profile".to_string()));
    }

    #[tokio::test]
    async fn test_cancelled_resolve_serves_fallback_without_provider_calls() {
        let provider = MockProvider::new("primary", Behavior::Answer("unused"));
        let chain = FallbackChain::new("profile", test_cache(), fast_policy())
            .with_provider(provider.clone(), Duration::from_secs(60));

        let token = CancellationToken::new();
        token.cancel();

        let resolved = chain
            .resolve_with_cancel("contractor:X-7:profile", &token)
            .await;

        assert_eq!(resolved.source, Source::Fallback);
        assert_eq!(provider.call_count(), 0);
    }
}
