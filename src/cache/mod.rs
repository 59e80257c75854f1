/// Generic in-memory cache with TTL and LRU eviction
///
/// Thread-safe, generic over key/value types. Eviction is true LRU by
/// recency of access: an intrusive doubly linked recency list lives in a
/// slot arena next to the key index, so get/set/evict are all O(1) instead
/// of scanning for the oldest entry. Tracks hit/miss statistics for
/// monitoring.
///
/// Entries expire `ttl` after insertion. Expiry is observed lazily on
/// `get`/`has` and proactively by `sweep` (see `sweeper` for the background
/// task); an expired entry is never returned.
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::logger::{self, LogTag};

pub mod config;
pub mod sweeper;

pub use config::CacheConfig;
pub use sweeper::{spawn_sweeper, SweeperHandle};

/// Sentinel index for the intrusive list
const NIL: usize = usize::MAX;

/// Cache entry with TTL tracking. Owned exclusively by the cache; callers
/// only ever see cloned values.
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    last_accessed_at: Instant,
    access_count: u64,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }

    fn touch(&mut self) {
        self.last_accessed_at = Instant::now();
        self.access_count += 1;
    }
}

/// Arena slot: entry plus intrusive recency-list links
struct Slot<K, V> {
    key: K,
    entry: CacheEntry<V>,
    prev: usize,
    next: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
    inserts: u64,
}

/// Snapshot of cache statistics, cumulative since instance creation
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub total_hits: u64,
    pub total_misses: u64,
    pub hit_rate: f64,
    pub evictions: u64,
    pub expirations: u64,
    pub inserts: u64,
}

struct Inner<K, V> {
    /// key -> slot index
    index: HashMap<K, usize>,
    slots: Vec<Slot<K, V>>,
    free: Vec<usize>,
    /// Most recently used
    head: usize,
    /// Least recently used
    tail: usize,
    counters: Counters,
}

/// Bounded LRU+TTL cache
pub struct BoundedCache<K, V>
where
    K: Clone + Eq + Hash + Display,
    V: Clone,
{
    config: CacheConfig,
    inner: RwLock<Inner<K, V>>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Clone + Eq + Hash + Display,
    V: Clone,
{
    /// Create a new cache. A zero `max_entries` is normalized to 1 so the
    /// capacity invariant holds without panicking on `set`.
    pub fn new(mut config: CacheConfig) -> Self {
        if config.max_entries == 0 {
            logger::warning(
                LogTag::Cache,
                "max_entries = 0 is not usable, normalizing to 1",
            );
            config.max_entries = 1;
        }

        Self {
            inner: RwLock::new(Inner {
                index: HashMap::with_capacity(config.max_entries.min(1024)),
                slots: Vec::new(),
                free: Vec::new(),
                head: NIL,
                tail: NIL,
                counters: Counters::default(),
            }),
            config,
        }
    }

    /// Get a value. Expired entries are deleted and count as misses; live
    /// entries are touched (recency + access count) and count as hits.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.write();

        let idx = match inner.index.get(key) {
            Some(&idx) => idx,
            None => {
                inner.counters.misses += 1;
                return None;
            }
        };

        if inner.slots[idx].entry.is_expired() {
            inner.remove_slot(idx);
            inner.counters.misses += 1;
            inner.counters.expirations += 1;
            return None;
        }

        inner.slots[idx].entry.touch();
        inner.move_to_front(idx);
        inner.counters.hits += 1;
        Some(inner.slots[idx].entry.value.clone())
    }

    /// Insert with the instance default TTL.
    pub fn set(&self, key: K, value: V) {
        self.set_with_ttl(key, value, self.config.ttl);
    }

    /// Insert with an explicit TTL (provider-associated TTLs and short-lived
    /// synthetic fallbacks share the cache with default-TTL entries).
    ///
    /// Overwriting an existing key replaces its value and resets bookkeeping.
    /// Inserting a new key at capacity evicts the least recently accessed
    /// entry first.
    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let mut inner = self.inner.write();

        if let Some(&idx) = inner.index.get(&key) {
            inner.slots[idx].entry = CacheEntry::new(value, ttl);
            inner.move_to_front(idx);
            inner.counters.inserts += 1;
            return;
        }

        if inner.index.len() >= self.config.max_entries {
            inner.evict_lru();
        }

        let entry = CacheEntry::new(value, ttl);
        let idx = match inner.free.pop() {
            Some(idx) => {
                inner.slots[idx] = Slot {
                    key: key.clone(),
                    entry,
                    prev: NIL,
                    next: NIL,
                };
                idx
            }
            None => {
                inner.slots.push(Slot {
                    key: key.clone(),
                    entry,
                    prev: NIL,
                    next: NIL,
                });
                inner.slots.len() - 1
            }
        };

        inner.index.insert(key, idx);
        inner.push_front(idx);
        inner.counters.inserts += 1;
    }

    /// Remove a key. Returns whether an entry was actually removed.
    pub fn delete(&self, key: &K) -> bool {
        let mut inner = self.inner.write();
        match inner.index.get(key) {
            Some(&idx) => {
                inner.remove_slot(idx);
                true
            }
            None => false,
        }
    }

    /// Clear entries. Without a pattern everything goes; with a pattern,
    /// every key whose string form matches is removed. Returns the number of
    /// removed entries.
    pub fn clear(&self, pattern: Option<&Regex>) -> usize {
        let mut inner = self.inner.write();

        match pattern {
            None => {
                let removed = inner.index.len();
                inner.index.clear();
                inner.slots.clear();
                inner.free.clear();
                inner.head = NIL;
                inner.tail = NIL;
                removed
            }
            Some(re) => {
                let matching: Vec<usize> = inner
                    .index
                    .iter()
                    .filter(|(key, _)| re.is_match(&key.to_string()))
                    .map(|(_, &idx)| idx)
                    .collect();

                let removed = matching.len();
                for idx in matching {
                    inner.remove_slot(idx);
                }
                removed
            }
        }
    }

    /// Freshness check without touching bookkeeping or hit/miss statistics.
    /// An expired entry observed here is deleted, same as on `get`.
    pub fn has(&self, key: &K) -> bool {
        let mut inner = self.inner.write();
        match inner.index.get(key) {
            Some(&idx) => {
                if inner.slots[idx].entry.is_expired() {
                    inner.remove_slot(idx);
                    false
                } else {
                    true
                }
            }
            None => false,
        }
    }

    /// Proactively remove every expired entry. Returns the number removed.
    pub fn sweep(&self) -> usize {
        let mut inner = self.inner.write();

        let expired: Vec<usize> = inner
            .index
            .values()
            .copied()
            .filter(|&idx| inner.slots[idx].entry.is_expired())
            .collect();

        let removed = expired.len();
        for idx in expired {
            inner.remove_slot(idx);
        }
        inner.counters.expirations += removed as u64;
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.read().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_entries(&self) -> usize {
        self.config.max_entries
    }

    /// Statistics snapshot. Hit rate is 0.0 (not NaN) before any access.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.read();
        let c = inner.counters;
        let total = c.hits + c.misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            c.hits as f64 / total as f64
        };

        CacheStats {
            size: inner.index.len(),
            total_hits: c.hits,
            total_misses: c.misses,
            hit_rate,
            evictions: c.evictions,
            expirations: c.expirations,
            inserts: c.inserts,
        }
    }
}

impl<K, V> Inner<K, V>
where
    K: Clone + Eq + Hash + Display,
{
    /// Unlink a slot from the recency list
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);

        if prev != NIL {
            self.slots[prev].next = next;
        } else {
            self.head = next;
        }

        if next != NIL {
            self.slots[next].prev = prev;
        } else {
            self.tail = prev;
        }

        self.slots[idx].prev = NIL;
        self.slots[idx].next = NIL;
    }

    /// Link a slot at the MRU end
    fn push_front(&mut self, idx: usize) {
        self.slots[idx].prev = NIL;
        self.slots[idx].next = self.head;

        if self.head != NIL {
            self.slots[self.head].prev = idx;
        }
        self.head = idx;

        if self.tail == NIL {
            self.tail = idx;
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == idx {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    /// Remove a slot entirely: recency list, key index, arena
    fn remove_slot(&mut self, idx: usize) {
        self.unlink(idx);
        let key = self.slots[idx].key.clone();
        self.index.remove(&key);
        self.free.push(idx);
    }

    /// Evict the least recently accessed entry
    fn evict_lru(&mut self) {
        if self.tail == NIL {
            return;
        }
        let idx = self.tail;
        self.remove_slot(idx);
        self.counters.evictions += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn small_cache(ttl_ms: u64, max_entries: usize) -> BoundedCache<String, String> {
        BoundedCache::new(CacheConfig::custom(Duration::from_millis(ttl_ms), max_entries))
    }

    #[test]
    fn test_basic_operations() {
        let cache = small_cache(60_000, 100);

        cache.set("key1".to_string(), "value1".to_string());
        assert_eq!(cache.get(&"key1".to_string()), Some("value1".to_string()));

        // Miss
        assert_eq!(cache.get(&"nonexistent".to_string()), None);

        let stats = cache.stats();
        assert_eq!(stats.total_hits, 1);
        assert_eq!(stats.total_misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_hit_rate_zero_without_accesses() {
        let cache = small_cache(60_000, 10);
        let stats = cache.stats();
        assert_eq!(stats.hit_rate, 0.0);
        assert!(!stats.hit_rate.is_nan());
    }

    #[test]
    fn test_hit_rate_math() {
        let cache = small_cache(60_000, 10);
        cache.set("a".to_string(), "1".to_string());

        cache.get(&"a".to_string()); // hit
        cache.get(&"a".to_string()); // hit
        cache.get(&"missing".to_string()); // miss

        let stats = cache.stats();
        assert_eq!(stats.total_hits, 2);
        assert_eq!(stats.total_misses, 1);
        assert!((stats.hit_rate - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lru_eviction_on_overflow() {
        let cache = small_cache(60_000, 2);

        cache.set("key1".to_string(), "value1".to_string());
        cache.set("key2".to_string(), "value2".to_string());
        cache.set("key3".to_string(), "value3".to_string()); // Should evict key1

        assert_eq!(cache.get(&"key1".to_string()), None); // Evicted
        assert_eq!(cache.get(&"key2".to_string()), Some("value2".to_string()));
        assert_eq!(cache.get(&"key3".to_string()), Some("value3".to_string()));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_lru_respects_access_recency() {
        // maxEntries=2: A,B,C => A evicted, {B,C}. Touch B, insert D =>
        // C evicted (B was touched more recently), {B,D}.
        let cache: BoundedCache<String, u32> =
            BoundedCache::new(CacheConfig::custom(Duration::from_secs(60), 2));

        cache.set("A".to_string(), 1);
        cache.set("B".to_string(), 2);
        cache.set("C".to_string(), 3);

        assert_eq!(cache.get(&"A".to_string()), None);
        assert!(cache.has(&"B".to_string()));
        assert!(cache.has(&"C".to_string()));

        cache.get(&"B".to_string()); // touch B
        cache.set("D".to_string(), 4);

        assert_eq!(cache.get(&"C".to_string()), None);
        assert_eq!(cache.get(&"B".to_string()), Some(2));
        assert_eq!(cache.get(&"D".to_string()), Some(4));
    }

    #[test]
    fn test_ttl_expiration() {
        let cache = small_cache(30, 100);

        cache.set("key".to_string(), "value".to_string());
        assert_eq!(cache.get(&"key".to_string()), Some("value".to_string()));

        thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.get(&"key".to_string()), None);
        assert!(!cache.has(&"key".to_string()));
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_has_does_not_touch_stats_or_recency() {
        let cache = small_cache(60_000, 2);
        cache.set("A".to_string(), "1".to_string());
        cache.set("B".to_string(), "2".to_string());

        // has() must not promote A to most-recently-used
        assert!(cache.has(&"A".to_string()));
        cache.set("C".to_string(), "3".to_string()); // still evicts A

        assert!(!cache.has(&"A".to_string()));
        let stats = cache.stats();
        assert_eq!(stats.total_hits, 0);
        assert_eq!(stats.total_misses, 0);
    }

    #[test]
    fn test_per_entry_ttl_override() {
        let cache = small_cache(60_000, 10);

        cache.set_with_ttl("short".to_string(), "v".to_string(), Duration::from_millis(30));
        cache.set("long".to_string(), "v".to_string());

        thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.get(&"short".to_string()), None);
        assert_eq!(cache.get(&"long".to_string()), Some("v".to_string()));
    }

    #[test]
    fn test_overwrite_resets_bookkeeping() {
        let cache = small_cache(100, 10);

        cache.set("key".to_string(), "old".to_string());
        thread::sleep(Duration::from_millis(60));

        // Overwrite restarts the TTL clock
        cache.set("key".to_string(), "new".to_string());
        thread::sleep(Duration::from_millis(60));

        assert_eq!(cache.get(&"key".to_string()), Some("new".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_delete() {
        let cache = small_cache(60_000, 10);
        cache.set("key".to_string(), "value".to_string());

        assert!(cache.delete(&"key".to_string()));
        assert!(!cache.delete(&"key".to_string()));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_clear_all() {
        let cache = small_cache(60_000, 10);
        cache.set("a".to_string(), "1".to_string());
        cache.set("b".to_string(), "2".to_string());

        assert_eq!(cache.clear(None), 2);
        assert!(cache.is_empty());

        // Cache stays usable after a full clear
        cache.set("c".to_string(), "3".to_string());
        assert_eq!(cache.get(&"c".to_string()), Some("3".to_string()));
    }

    #[test]
    fn test_clear_pattern_removes_only_matching() {
        let cache = small_cache(60_000, 10);
        cache.set("contractor:ACME-001:profile".to_string(), "p".to_string());
        cache.set("contractor:ACME-001:metrics".to_string(), "m".to_string());
        cache.set("contractor:NOVA-002:profile".to_string(), "p".to_string());
        cache.set("portfolio:PF-100:summary".to_string(), "s".to_string());

        let re = Regex::new(r"^contractor:ACME-001:").unwrap();
        assert_eq!(cache.clear(Some(&re)), 2);

        assert!(!cache.has(&"contractor:ACME-001:profile".to_string()));
        assert!(!cache.has(&"contractor:ACME-001:metrics".to_string()));
        assert_eq!(
            cache.get(&"contractor:NOVA-002:profile".to_string()),
            Some("p".to_string())
        );
        assert_eq!(
            cache.get(&"portfolio:PF-100:summary".to_string()),
            Some("s".to_string())
        );
    }

    #[test]
    fn test_sweep_removes_expired_without_reads() {
        let cache = small_cache(30, 10);
        cache.set("a".to_string(), "1".to_string());
        cache.set_with_ttl("b".to_string(), "2".to_string(), Duration::from_secs(60));

        thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.has(&"b".to_string()));
    }

    #[test]
    fn test_zero_capacity_normalized() {
        let cache: BoundedCache<String, String> =
            BoundedCache::new(CacheConfig::custom(Duration::from_secs(60), 0));
        cache.set("a".to_string(), "1".to_string());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.max_entries(), 1);

        cache.set("b".to_string(), "2".to_string());
        assert_eq!(cache.len(), 1); // a evicted
    }

    #[test]
    fn test_slot_reuse_after_delete() {
        let cache = small_cache(60_000, 3);
        for round in 0..5 {
            for i in 0..3 {
                cache.set(format!("k{}-{}", round, i), i.to_string());
            }
        }
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&"k4-2".to_string()), Some("2".to_string()));
    }
}
