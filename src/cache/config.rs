/// Cache configuration per data kind
///
/// TTLs tuned for how fast each kind of dashboard data actually changes:
/// - Profile / contact data: long TTL (changes rarely)
/// - Metrics / relationships: medium TTL (warehouse refreshes hourly)
/// - Activity feeds: short TTL (most volatile surface)
/// - Synthetic fallbacks: very short TTL (retry real providers soon)
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries (LRU eviction when exceeded)
    pub max_entries: usize,

    /// Default time-to-live for cached entries
    pub ttl: Duration,
}

impl CacheConfig {
    /// Contractor profile data (changes rarely)
    pub fn profile() -> Self {
        Self {
            max_entries: 5000,
            ttl: Duration::from_secs(3600), // 1 hour
        }
    }

    /// Performance metrics (warehouse refreshes hourly)
    pub fn metrics() -> Self {
        Self {
            max_entries: 5000,
            ttl: Duration::from_secs(900), // 15 minutes
        }
    }

    /// Agency relationship graphs (expensive to compute, fairly stable)
    pub fn relationships() -> Self {
        Self {
            max_entries: 3000,
            ttl: Duration::from_secs(1800), // 30 minutes
        }
    }

    /// Activity feeds (most volatile)
    pub fn activity() -> Self {
        Self {
            max_entries: 2000,
            ttl: Duration::from_secs(120), // 2 minutes
        }
    }

    /// Contact data (changes rarely, invalidated on edit)
    pub fn contacts() -> Self {
        Self {
            max_entries: 5000,
            ttl: Duration::from_secs(3600), // 1 hour
        }
    }

    /// Synthetic fallback values (short-lived so real providers get retried)
    pub fn synthetic_fallback() -> Self {
        Self {
            max_entries: 1000,
            ttl: Duration::from_secs(60),
        }
    }

    /// Custom configuration
    pub fn custom(ttl: Duration, max_entries: usize) -> Self {
        Self { max_entries, ttl }
    }
}
