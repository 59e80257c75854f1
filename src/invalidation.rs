/// Pattern- and key-based cache invalidation
///
/// Mutating operations elsewhere in the system (grouping assets, editing a
/// contact) call through here to drop now-stale entries. Thin wrappers over
/// the cache's delete/clear; the `{kind}:{id}:{field}` key convention is
/// what makes the pattern form useful.
use regex::Regex;

use crate::chain::SharedCache;
use crate::errors::BoardResult;
use crate::keys::EntityKind;
use crate::logger::{self, LogTag};

#[derive(Clone)]
pub struct InvalidationBus {
    cache: SharedCache,
}

impl InvalidationBus {
    pub fn new(cache: SharedCache) -> Self {
        Self { cache }
    }

    /// Remove one exact key. Returns whether an entry was removed.
    pub fn invalidate_key(&self, key: &str) -> bool {
        let removed = self.cache.delete(&key.to_string());
        if removed {
            logger::debug(LogTag::Cache, &format!("Invalidated {}", key));
        }
        removed
    }

    /// Remove every key matching the pattern. Returns how many were removed.
    pub fn invalidate_pattern(&self, pattern: &Regex) -> usize {
        let removed = self.cache.clear(Some(pattern));
        logger::info(
            LogTag::Cache,
            &format!("Invalidated {} entries matching {}", removed, pattern),
        );
        removed
    }

    /// Remove every cached field of one logical entity.
    pub fn invalidate_entity(&self, kind: EntityKind, id: &str) -> BoardResult<usize> {
        let pattern = Regex::new(&format!("^{}:{}:", kind.as_str(), regex::escape(id)))?;
        Ok(self.invalidate_pattern(&pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{BoundedCache, CacheConfig};
    use std::sync::Arc;
    use std::time::Duration;

    fn seeded_bus() -> (SharedCache, InvalidationBus) {
        let cache: SharedCache = Arc::new(BoundedCache::new(CacheConfig::custom(
            Duration::from_secs(60),
            100,
        )));

        for key in [
            "contractor:ACME-001:profile",
            "contractor:ACME-001:metrics",
            "contractor:NOVA-002:profile",
            "portfolio:PF-100:summary",
        ] {
            cache.set(key.to_string(), serde_json::json!({ "k": key }));
        }

        (cache.clone(), InvalidationBus::new(cache))
    }

    #[test]
    fn test_invalidate_key() {
        let (cache, bus) = seeded_bus();

        assert!(bus.invalidate_key("contractor:ACME-001:profile"));
        assert!(!bus.invalidate_key("contractor:ACME-001:profile"));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_invalidate_pattern_leaves_non_matching_keys() {
        let (cache, bus) = seeded_bus();

        let pattern = Regex::new(r"^contractor:").unwrap();
        assert_eq!(bus.invalidate_pattern(&pattern), 3);

        assert_eq!(cache.len(), 1);
        assert!(cache.has(&"portfolio:PF-100:summary".to_string()));
    }

    #[test]
    fn test_invalidate_entity_is_anchored_and_escaped() {
        let (cache, bus) = seeded_bus();

        let removed = bus
            .invalidate_entity(EntityKind::Contractor, "ACME-001")
            .unwrap();
        assert_eq!(removed, 2);

        // Other contractor untouched
        assert!(cache.has(&"contractor:NOVA-002:profile".to_string()));

        // An id full of regex metacharacters must not blow up or over-match
        let removed = bus
            .invalidate_entity(EntityKind::Contractor, "A.C*E+?")
            .unwrap();
        assert_eq!(removed, 0);
        assert_eq!(cache.len(), 2);
    }
}
