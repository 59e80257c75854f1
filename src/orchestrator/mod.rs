/// Domain orchestrators
///
/// One orchestrator per composite UI surface. Each fans out to several
/// fallback chains concurrently, merges the results into a single view, and
/// tags every field with its provenance so the presentation layer can
/// distinguish authoritative data from degraded fallbacks. A failure in one
/// field never blocks or degrades another.
///
/// Construction is explicit: the process builds one shared cache and one
/// set of backends at startup and passes them in. No global instances.
pub mod contractor;
pub mod portfolio;
pub mod views;

pub use contractor::{ContractorOrchestrator, ContractorView};
pub use portfolio::{PortfolioOrchestrator, PortfolioView};

use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::{AppConfig, SourceSettings};
use crate::errors::{BoardError, BoardResult};
use crate::logger::{self, LogTag};
use crate::providers::{
    LiveQueryClient, ProviderStats, StaticDataSet, WarehouseClient,
};

/// The backend clients shared by every chain. A disabled source is simply
/// absent - its tier drops out of every fallback chain.
pub struct Backends {
    pub warehouse: Option<Arc<WarehouseClient>>,
    pub live_query: Option<Arc<LiveQueryClient>>,
    pub static_data: Option<Arc<StaticDataSet>>,
}

impl Backends {
    pub fn from_config(config: &AppConfig) -> BoardResult<Self> {
        let warehouse = if config.sources.warehouse.enabled {
            let base_url = parse_base_url(&config.sources.warehouse)?;
            Some(Arc::new(WarehouseClient::new(
                true,
                base_url,
                config.sources.warehouse.timeout_seconds,
                config.sources.warehouse.rate_limit_per_minute,
            )))
        } else {
            logger::info(LogTag::Provider, "Warehouse source disabled");
            None
        };

        let live_query = if config.sources.live_query.enabled {
            let base_url = parse_base_url(&config.sources.live_query)?;
            Some(Arc::new(LiveQueryClient::new(
                true,
                base_url,
                config.sources.live_query.timeout_seconds,
                config.sources.live_query.rate_limit_per_minute,
            )))
        } else {
            logger::info(LogTag::Provider, "Live query source disabled");
            None
        };

        let static_data = if config.sources.static_data.enabled {
            let dataset = match &config.sources.static_data.snapshot_path {
                Some(path) => StaticDataSet::from_file(path)?,
                None => StaticDataSet::bundled(),
            };
            Some(Arc::new(dataset))
        } else {
            logger::info(LogTag::Provider, "Static data source disabled");
            None
        };

        Ok(Self {
            warehouse,
            live_query,
            static_data,
        })
    }

    /// Backends with only the bundled static tier - used by tests and the
    /// offline demo.
    pub fn static_only() -> Self {
        Self {
            warehouse: None,
            live_query: None,
            static_data: Some(Arc::new(StaticDataSet::bundled())),
        }
    }

    /// Per-backend request statistics, in priority order.
    pub async fn stats(&self) -> Vec<(&'static str, ProviderStats)> {
        let mut all = Vec::new();
        if let Some(warehouse) = &self.warehouse {
            all.push(("warehouse", warehouse.get_stats().await));
        }
        if let Some(live_query) = &self.live_query {
            all.push(("live-query", live_query.get_stats().await));
        }
        all
    }
}

fn parse_base_url(settings: &SourceSettings) -> BoardResult<Url> {
    Url::parse(&settings.base_url).map_err(|e| BoardError::InvalidUrl {
        url: settings.base_url.clone(),
        message: e.to_string(),
    })
}

/// Per-kind TTL: config override first, tuned preset otherwise.
pub(crate) fn ttl_for(override_secs: Option<u64>, preset: Duration) -> Duration {
    match override_secs {
        Some(secs) => Duration::from_secs(secs),
        None => preset,
    }
}
