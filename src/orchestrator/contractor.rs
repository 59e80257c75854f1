/// Contractor detail orchestrator
///
/// Composes the five independent sub-resources of a contractor detail page.
/// Each sub-resource has its own fallback chain and therefore its own
/// independent degradation behavior; the view is returned once all five
/// complete.
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheConfig, CacheStats};
use crate::chain::{FallbackChain, FallbackPolicy, Resolved, SharedCache};
use crate::config::AppConfig;
use crate::errors::BoardResult;
use crate::invalidation::InvalidationBus;
use crate::keys::{EntityKey, EntityKind};
use crate::logger::{self, LogTag};
use crate::orchestrator::views::{
    ActivityFeed, AgencyRelationships, ContactInfo, ContractorProfile, PerformanceMetrics,
};
use crate::orchestrator::{ttl_for, Backends};
use crate::providers::{LiveQueryProvider, StaticProvider, WarehouseProvider};
use crate::synthetic::Synthesize;

/// Fully-resolved contractor detail view with per-field provenance
#[derive(Debug, Clone, Serialize)]
pub struct ContractorView {
    pub id: String,
    pub generated_at: DateTime<Utc>,
    pub profile: Resolved<ContractorProfile>,
    pub metrics: Resolved<PerformanceMetrics>,
    pub relationships: Resolved<AgencyRelationships>,
    pub activity: Resolved<ActivityFeed>,
    pub contacts: Resolved<ContactInfo>,
}

impl ContractorView {
    /// Field name / provenance pairs, for display and diagnostics.
    pub fn provenance(&self) -> Vec<(&'static str, String)> {
        vec![
            ("profile", self.profile.source.to_string()),
            ("metrics", self.metrics.source.to_string()),
            ("relationships", self.relationships.source.to_string()),
            ("activity", self.activity.source.to_string()),
            ("contacts", self.contacts.source.to_string()),
        ]
    }

    /// Whether any field had to be synthesized.
    pub fn is_partially_degraded(&self) -> bool {
        self.profile.is_degraded()
            || self.metrics.is_degraded()
            || self.relationships.is_degraded()
            || self.activity.is_degraded()
            || self.contacts.is_degraded()
    }
}

pub struct ContractorOrchestrator {
    profile: FallbackChain<ContractorProfile>,
    metrics: FallbackChain<PerformanceMetrics>,
    relationships: FallbackChain<AgencyRelationships>,
    activity: FallbackChain<ActivityFeed>,
    contacts: FallbackChain<ContactInfo>,
    cache: SharedCache,
    bus: InvalidationBus,
}

impl ContractorOrchestrator {
    pub fn new(cache: SharedCache, backends: &Backends, config: &AppConfig) -> Self {
        let policy = FallbackPolicy {
            provider_timeout: config.provider_timeout(),
            synthetic_ttl: config.synthetic_ttl(),
        };

        Self {
            profile: build_chain(
                "profile",
                ttl_for(config.ttl.profile_secs, CacheConfig::profile().ttl),
                cache.clone(),
                policy.clone(),
                backends,
            ),
            metrics: build_chain(
                "metrics",
                ttl_for(config.ttl.metrics_secs, CacheConfig::metrics().ttl),
                cache.clone(),
                policy.clone(),
                backends,
            ),
            relationships: build_chain(
                "relationships",
                ttl_for(
                    config.ttl.relationships_secs,
                    CacheConfig::relationships().ttl,
                ),
                cache.clone(),
                policy.clone(),
                backends,
            ),
            activity: build_chain(
                "activity",
                ttl_for(config.ttl.activity_secs, CacheConfig::activity().ttl),
                cache.clone(),
                policy.clone(),
                backends,
            ),
            contacts: build_chain(
                "contacts",
                ttl_for(config.ttl.contacts_secs, CacheConfig::contacts().ttl),
                cache.clone(),
                policy,
                backends,
            ),
            bus: InvalidationBus::new(cache.clone()),
            cache,
        }
    }

    /// Resolve the composite contractor view. Never fails; individual fields
    /// degrade independently.
    pub async fn contractor_view(&self, id: &str) -> ContractorView {
        self.contractor_view_with_cancel(id, &CancellationToken::new())
            .await
    }

    pub async fn contractor_view_with_cancel(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> ContractorView {
        logger::debug(
            LogTag::Orchestrator,
            &format!("Resolving contractor view for {}", id),
        );

        let profile_key = contractor_key(id, "profile");
        let metrics_key = contractor_key(id, "metrics");
        let relationships_key = contractor_key(id, "relationships");
        let activity_key = contractor_key(id, "activity");
        let contacts_key = contractor_key(id, "contacts");
        let (profile, metrics, relationships, activity, contacts) = tokio::join!(
            self.profile.resolve_with_cancel(&profile_key, cancel),
            self.metrics.resolve_with_cancel(&metrics_key, cancel),
            self.relationships
                .resolve_with_cancel(&relationships_key, cancel),
            self.activity.resolve_with_cancel(&activity_key, cancel),
            self.contacts.resolve_with_cancel(&contacts_key, cancel),
        );

        ContractorView {
            id: id.to_string(),
            generated_at: Utc::now(),
            profile,
            metrics,
            relationships,
            activity,
            contacts,
        }
    }

    /// Drop every cached field for one contractor (call after a mutation).
    pub fn invalidate_contractor(&self, id: &str) -> BoardResult<usize> {
        self.bus.invalidate_entity(EntityKind::Contractor, id)
    }

    /// Drop one exact cache key.
    pub fn invalidate_key(&self, key: &str) -> bool {
        self.bus.invalidate_key(key)
    }

    /// Drop every key matching a pattern.
    pub fn invalidate_pattern(&self, pattern: &Regex) -> usize {
        self.bus.invalidate_pattern(pattern)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

fn contractor_key(id: &str, field: &str) -> String {
    EntityKey::contractor(id, field).to_string()
}

/// Assemble one chain with the standard provider priority: warehouse, then
/// live query, then static data. Disabled backends simply drop out.
pub(crate) fn build_chain<T>(
    field: &'static str,
    cache_ttl: Duration,
    cache: SharedCache,
    policy: FallbackPolicy,
    backends: &Backends,
) -> FallbackChain<T>
where
    T: DeserializeOwned + Serialize + Synthesize + Clone + Send + Sync + 'static,
{
    let mut chain = FallbackChain::new(field, cache, policy);

    if let Some(warehouse) = &backends.warehouse {
        chain = chain.with_provider(
            Arc::new(WarehouseProvider::<T>::new(warehouse.clone(), field)),
            cache_ttl,
        );
    }
    if let Some(live_query) = &backends.live_query {
        chain = chain.with_provider(
            Arc::new(LiveQueryProvider::<T>::new(live_query.clone(), field)),
            cache_ttl,
        );
    }
    if let Some(static_data) = &backends.static_data {
        chain = chain.with_provider(
            Arc::new(StaticProvider::<T>::new(static_data.clone())),
            cache_ttl,
        );
    }

    chain
}
