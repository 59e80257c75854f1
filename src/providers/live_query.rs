/// Live query provider - on-demand computation against the primary store
///
/// Second in the trust hierarchy: slower and more load-sensitive than the
/// warehouse, but not limited to what has been materialized. The service
/// wraps results in an envelope; an envelope with no row is "no answer".
///
///   GET /v2/query?entity={kind}&id={id}&section={resource}
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use crate::keys::EntityKey;
use crate::providers::client::BackendClient;
use crate::providers::stats::ProviderStats;
use crate::providers::Provider;

pub const PROVIDER_NAME: &str = "live-query";

/// Request timeout in seconds - live queries compute on demand, allow more
/// headroom than the warehouse.
pub const TIMEOUT_SECS: u64 = 20;

/// Default rate limit (requests per minute) - the query service is the
/// scarce resource here.
pub const RATE_LIMIT_PER_MINUTE: usize = 60;

/// Response envelope returned by the query service
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct QueryEnvelope<T> {
    #[serde(default)]
    row: Option<T>,
}

/// Shared client for the live query service
pub struct LiveQueryClient {
    client: BackendClient,
    enabled: bool,
}

impl LiveQueryClient {
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

    async fn query<T>(&self, key: &str, section: &str) -> Result<Option<T>, ProviderError>
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
            "v2/query?entity={}&id={}&section={}",
            entity.kind.as_str(),
            entity.id,
            section
        );

        let envelope: Option<QueryEnvelope<T>> = self.client.get_json(&path).await?;
        Ok(envelope.and_then(|e| e.row))
    }
}

/// Typed provider for one live-query section
pub struct LiveQueryProvider<T> {
    client: Arc<LiveQueryClient>,
    section: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> LiveQueryProvider<T> {
    pub fn new(client: Arc<LiveQueryClient>, section: &'static str) -> Self {
        Self {
            client,
            section,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T> Provider<T> for LiveQueryProvider<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch(&self, key: &str) -> Result<Option<T>, ProviderError> {
        self.client.query(key, self.section).await
    }
}
