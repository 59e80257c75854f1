/// Portfolio orchestrator
///
/// Same fan-out pattern as the contractor detail view, over the three
/// sub-resources of a portfolio page.
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheConfig, CacheStats};
use crate::chain::{FallbackChain, FallbackPolicy, Resolved, SharedCache};
use crate::config::AppConfig;
use crate::errors::BoardResult;
use crate::invalidation::InvalidationBus;
use crate::keys::{EntityKey, EntityKind};
use crate::logger::{self, LogTag};
use crate::orchestrator::contractor::build_chain;
use crate::orchestrator::views::{PortfolioHoldings, PortfolioPerformance, PortfolioSummary};
use crate::orchestrator::{ttl_for, Backends};

/// Fully-resolved portfolio view with per-field provenance
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioView {
    pub id: String,
    pub generated_at: DateTime<Utc>,
    pub summary: Resolved<PortfolioSummary>,
    pub holdings: Resolved<PortfolioHoldings>,
    pub performance: Resolved<PortfolioPerformance>,
}

impl PortfolioView {
    pub fn provenance(&self) -> Vec<(&'static str, String)> {
        vec![
            ("summary", self.summary.source.to_string()),
            ("holdings", self.holdings.source.to_string()),
            ("performance", self.performance.source.to_string()),
        ]
    }

    pub fn is_partially_degraded(&self) -> bool {
        self.summary.is_degraded()
            || self.holdings.is_degraded()
            || self.performance.is_degraded()
    }
}

pub struct PortfolioOrchestrator {
    summary: FallbackChain<PortfolioSummary>,
    holdings: FallbackChain<PortfolioHoldings>,
    performance: FallbackChain<PortfolioPerformance>,
    cache: SharedCache,
    bus: InvalidationBus,
}

impl PortfolioOrchestrator {
    pub fn new(cache: SharedCache, backends: &Backends, config: &AppConfig) -> Self {
        let policy = FallbackPolicy {
            provider_timeout: config.provider_timeout(),
            synthetic_ttl: config.synthetic_ttl(),
        };

        // Portfolios reuse the profile/metrics cadences: summary and
        // holdings change on edit, performance with the warehouse refresh.
        Self {
            summary: build_chain(
                "summary",
                ttl_for(config.ttl.profile_secs, CacheConfig::profile().ttl),
                cache.clone(),
                policy.clone(),
                backends,
            ),
            holdings: build_chain(
                "holdings",
                ttl_for(config.ttl.profile_secs, CacheConfig::profile().ttl),
                cache.clone(),
                policy.clone(),
                backends,
            ),
            performance: build_chain(
                "performance",
                ttl_for(config.ttl.metrics_secs, CacheConfig::metrics().ttl),
                cache.clone(),
                policy,
                backends,
            ),
            bus: InvalidationBus::new(cache.clone()),
            cache,
        }
    }

    /// Resolve the composite portfolio view. Never fails.
    pub async fn portfolio_view(&self, id: &str) -> PortfolioView {
        self.portfolio_view_with_cancel(id, &CancellationToken::new())
            .await
    }

    pub async fn portfolio_view_with_cancel(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> PortfolioView {
        logger::debug(
            LogTag::Orchestrator,
            &format!("Resolving portfolio view for {}", id),
        );

        let summary_key = portfolio_key(id, "summary");
        let holdings_key = portfolio_key(id, "holdings");
        let performance_key = portfolio_key(id, "performance");
        let (summary, holdings, performance) = tokio::join!(
            self.summary.resolve_with_cancel(&summary_key, cancel),
            self.holdings.resolve_with_cancel(&holdings_key, cancel),
            self.performance
                .resolve_with_cancel(&performance_key, cancel),
        );

        PortfolioView {
            id: id.to_string(),
            generated_at: Utc::now(),
            summary,
            holdings,
            performance,
        }
    }

    /// Drop every cached field for one portfolio (call after grouping
    /// assets or similar mutations).
    pub fn invalidate_portfolio(&self, id: &str) -> BoardResult<usize> {
        self.bus.invalidate_entity(EntityKind::Portfolio, id)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

fn portfolio_key(id: &str, field: &str) -> String {
    EntityKey::portfolio(id, field).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::BoundedCache;
    use crate::chain::Source;
    use std::sync::Arc;
    use std::time::Duration;

    fn static_only_orchestrator() -> PortfolioOrchestrator {
        let cache: SharedCache = Arc::new(BoundedCache::new(CacheConfig::custom(
            Duration::from_secs(60),
            100,
        )));
        let backends = Backends::static_only();
        PortfolioOrchestrator::new(cache, &backends, &AppConfig::default())
    }

    #[tokio::test]
    async fn test_known_portfolio_resolves() {
        let orchestrator = static_only_orchestrator();
        let view = orchestrator.portfolio_view("PF-100").await;

        assert_eq!(view.summary.source, Source::Provider("static"));
        assert_eq!(view.summary.value.name, "Core Infrastructure Holdings");
        assert_eq!(view.holdings.value.holdings.len(), 3);
        assert!(!view.is_partially_degraded());
    }

    #[tokio::test]
    async fn test_unknown_portfolio_synthesizes() {
        let orchestrator = static_only_orchestrator();
        let view = orchestrator.portfolio_view("PF-999").await;

        assert_eq!(view.summary.source, Source::Fallback);
        assert!(view.is_partially_degraded());
        // Synthetic holdings are still usable data
        assert!(!view.holdings.value.holdings.is_empty());
    }

    #[tokio::test]
    async fn test_portfolio_invalidation_scopes_to_one_entity() {
        let orchestrator = static_only_orchestrator();

        orchestrator.portfolio_view("PF-100").await;
        orchestrator.portfolio_view("PF-999").await;

        let removed = orchestrator.invalidate_portfolio("PF-100").unwrap();
        assert_eq!(removed, 3);

        // The other portfolio stays cached
        let view = orchestrator.portfolio_view("PF-999").await;
        assert_eq!(view.summary.source, Source::Cache);
    }
}
