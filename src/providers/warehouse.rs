/// Warehouse provider - the materialized analytical store
///
/// Highest-priority backend: precomputed, authoritative aggregates exposed
/// as a REST API. Resource layout:
///
///   GET /api/v1/{kind}s/{id}/{resource}
///
/// 404 means the store has not materialized that entity yet, which is a
/// normal "no answer" for the fallback chain.
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use crate::keys::EntityKey;
use crate::providers::client::BackendClient;
use crate::providers::stats::ProviderStats;
use crate::providers::Provider;

pub const PROVIDER_NAME: &str = "warehouse";

/// Request timeout in seconds - the warehouse serves precomputed rows, 10s
/// is generous.
pub const TIMEOUT_SECS: u64 = 10;

/// Default rate limit (requests per minute)
pub const RATE_LIMIT_PER_MINUTE: usize = 300;

/// Shared client for the warehouse API. All typed warehouse providers hold
/// the same client, so rate limiting and stats are per-backend.
pub struct WarehouseClient {
    client: BackendClient,
    enabled: bool,
}

impl WarehouseClient {
    pub fn new(
        enabled: bool,
        base_url: Url,
        timeout_seconds: u64,
        rate_limit_per_minute: usize,
    ) -> Self {
        let timeout = if timeout_seconds == 0 {
            TIMEOUT_SECS
        } else {
            timeout_seconds
        };
        let rate_limit = if rate_limit_per_minute == 0 {
            RATE_LIMIT_PER_MINUTE
        } else {
            rate_limit_per_minute
        };

        Self {
            client: BackendClient::new(
                PROVIDER_NAME,
                base_url,
                Duration::from_secs(timeout),
                rate_limit,
            ),
            enabled,
        }
    }

    pub async fn get_stats(&self) -> ProviderStats {
        self.client.get_stats().await
    }

    async fn fetch_resource<T>(&self, key: &str, resource: &str) -> Result<Option<T>, ProviderError>
    where
        T: DeserializeOwned,
    {
        if !self.enabled {
            return Err(ProviderError::Disabled {
                provider: PROVIDER_NAME,
            });
        }

        let entity = match EntityKey::parse(key) {
            Some(entity) => entity,
            None => {
                return Err(ProviderError::Parse {
                    provider: PROVIDER_NAME,
                    message: format!("unrecognized cache key '{}'", key),
                })
            }
        };

        let path = format!(
            "api/v1/{}s/{}/{}",
            entity.kind.as_str(),
            entity.id,
            resource
        );
        self.client.get_json(&path).await
    }
}

/// Typed provider for one warehouse resource ("profile", "metrics", ...)
pub struct WarehouseProvider<T> {
    client: Arc<WarehouseClient>,
    resource: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> WarehouseProvider<T> {
    pub fn new(client: Arc<WarehouseClient>, resource: &'static str) -> Self {
        Self {
            client,
            resource,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T> Provider<T> for WarehouseProvider<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch(&self, key: &str) -> Result<Option<T>, ProviderError> {
        self.client.fetch_resource(key, self.resource).await
    }
}
