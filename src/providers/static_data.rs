/// Static data provider - bundled snapshot fallback
///
/// Last tier before synthetic generation: a snapshot of known entities
/// shipped with the binary (or loaded from a file), keyed by full cache
/// key. Serves demos, offline development, and the freshly-deployed case
/// where neither backend is reachable. Unknown keys are "no answer".
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use crate::errors::{BoardResult, ProviderError};
use crate::logger::{self, LogTag};
use crate::providers::Provider;

pub const PROVIDER_NAME: &str = "static";

const BUNDLED_SNAPSHOT: &str = include_str!("../../data/static_snapshot.json");

/// Snapshot of entity data keyed by cache key
pub struct StaticDataSet {
    snapshot: HashMap<String, Value>,
}

impl StaticDataSet {
    /// The snapshot bundled into the binary.
    pub fn bundled() -> Self {
        // The bundled file is validated by tests; a broken build asset still
        // must not take the process down.
        let snapshot: HashMap<String, Value> = match serde_json::from_str(BUNDLED_SNAPSHOT) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                logger::error(
                    LogTag::Provider,
                    &format!("Bundled static snapshot is invalid: {}", e),
                );
                HashMap::new()
            }
        };

        Self { snapshot }
    }

    /// Load a snapshot from a JSON file (same key -> object layout as the
    /// bundled one).
    pub fn from_file(path: &Path) -> BoardResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot: HashMap<String, Value> = serde_json::from_str(&raw)?;
        logger::info(
            LogTag::Provider,
            &format!("Loaded static snapshot with {} keys from {}", snapshot.len(), path.display()),
        );
        Ok(Self { snapshot })
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Keys present in the snapshot.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.snapshot.keys()
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        self.snapshot.get(key)
    }
}

/// Typed provider over a shared static dataset
pub struct StaticProvider<T> {
    data: Arc<StaticDataSet>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StaticProvider<T> {
    pub fn new(data: Arc<StaticDataSet>) -> Self {
        Self {
            data,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T> Provider<T> for StaticProvider<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch(&self, key: &str) -> Result<Option<T>, ProviderError> {
        match self.data.lookup(key) {
            None => Ok(None),
            Some(raw) => match serde_json::from_value::<T>(raw.clone()) {
                Ok(value) => Ok(Some(value)),
                Err(e) => Err(ProviderError::Parse {
                    provider: PROVIDER_NAME,
                    message: format!("snapshot entry '{}' does not match schema: {}", key, e),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::views::ContractorProfile;

    #[test]
    fn test_bundled_snapshot_parses() {
        let data = StaticDataSet::bundled();
        assert!(!data.is_empty());
    }

    #[tokio::test]
    async fn test_bundled_profile_matches_schema() {
        let data = Arc::new(StaticDataSet::bundled());
        let provider: StaticProvider<ContractorProfile> = StaticProvider::new(data);

        let profile = provider
            .fetch("contractor:ACME-001:profile")
            .await
            .expect("bundled entry deserializes")
            .expect("bundled entry exists");
        assert_eq!(profile.id, "ACME-001");
    }

    #[tokio::test]
    async fn test_unknown_key_is_no_answer() {
        let data = Arc::new(StaticDataSet::bundled());
        let provider: StaticProvider<ContractorProfile> = StaticProvider::new(data);

        let result = provider.fetch("contractor:NOPE-999:profile").await.unwrap();
        assert!(result.is_none());
    }
}
