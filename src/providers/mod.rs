/// Backend data providers
///
/// Each provider is one async data source behind the same minimal contract:
/// fetch a key, return a validated, typed DTO or "no answer". Providers
/// report their own failures as `ProviderError` - swallowing them is the
/// fallback chain's job, in exactly one place.
///
/// Priority order across the system: warehouse (materialized analytical
/// store) > live query service > bundled static data. The chain consults
/// them in that order; this is a trust hierarchy, not a race.
pub mod client;
pub mod live_query;
pub mod static_data;
pub mod stats;
pub mod warehouse;

pub use client::{BackendClient, RateLimiter};
pub use live_query::{LiveQueryClient, LiveQueryProvider};
pub use static_data::{StaticDataSet, StaticProvider};
pub use stats::{ProviderStats, ProviderStatsTracker};
pub use warehouse::{WarehouseClient, WarehouseProvider};

use async_trait::async_trait;

use crate::errors::ProviderError;

/// One async data source for DTOs of type `T`.
///
/// `fetch` must be idempotent (repeated reads have no side effects) and must
/// not panic; failures are returned, never thrown. `Ok(None)` means the
/// provider has no answer for this key, which is not an error. Responses are
/// parsed into `T` at this boundary; raw wire payloads never travel further.
#[async_trait]
pub trait Provider<T>: Send + Sync {
    /// Stable provider name used in provenance tags and logs.
    fn name(&self) -> &'static str;

    async fn fetch(&self, key: &str) -> Result<Option<T>, ProviderError>;
}
