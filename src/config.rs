/// Application configuration
///
/// Loaded from TOML with full defaults so the binary runs with no config
/// file at all. Every section is optional; unset provider timeouts and rate
/// limits (0) fall back to the per-provider constants.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::logger::{self, LogTag};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub ttl: TtlSettings,
    #[serde(default)]
    pub fallback: FallbackSettings,
    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Capacity of the shared cache (LRU eviction beyond this)
    pub max_entries: usize,
    /// Default TTL for entries set without an explicit one
    pub ttl_secs: u64,
    /// Background sweep cadence
    pub sweep_interval_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: 5000,
            ttl_secs: 300,
            sweep_interval_secs: 300, // 5 minutes
        }
    }
}

/// Optional per-data-kind TTL overrides (seconds). Unset kinds use the
/// tuned presets in `cache::config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TtlSettings {
    #[serde(default)]
    pub profile_secs: Option<u64>,
    #[serde(default)]
    pub metrics_secs: Option<u64>,
    #[serde(default)]
    pub relationships_secs: Option<u64>,
    #[serde(default)]
    pub activity_secs: Option<u64>,
    #[serde(default)]
    pub contacts_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackSettings {
    /// Per-provider-call timeout
    pub provider_timeout_ms: u64,
    /// How long synthesized stand-ins stay cached
    pub synthetic_ttl_secs: u64,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            provider_timeout_ms: 2500,
            synthetic_ttl_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub warehouse: SourceSettings,
    #[serde(default = "SourceSettings::live_query_default")]
    pub live_query: SourceSettings,
    #[serde(default)]
    pub static_data: StaticSettings,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            warehouse: SourceSettings::default(),
            live_query: SourceSettings::live_query_default(),
            static_data: StaticSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    pub enabled: bool,
    pub base_url: String,
    /// 0 = use the provider's built-in default
    pub timeout_seconds: u64,
    /// 0 = use the provider's built-in default
    pub rate_limit_per_minute: usize,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:8095/".to_string(),
            timeout_seconds: 0,
            rate_limit_per_minute: 0,
        }
    }
}

impl SourceSettings {
    fn live_query_default() -> Self {
        Self {
            base_url: "http://localhost:8096/".to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticSettings {
    pub enabled: bool,
    /// Override the bundled snapshot with a file
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

impl Default for StaticSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            snapshot_path: None,
        }
    }
}

impl AppConfig {
    /// Load from an explicit path (hard error if unreadable), from the
    /// default location if one exists there, or fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default_path = Self::default_path();
        if default_path.exists() {
            return Self::load(&default_path);
        }

        logger::info(
            LogTag::Config,
            "No config file found, using built-in defaults",
        );
        Ok(Self::default())
    }

    fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        logger::info(
            LogTag::Config,
            &format!("Loaded configuration from {}", path.display()),
        );
        Ok(config)
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vendorboard")
            .join("config.toml")
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache.sweep_interval_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.fallback.provider_timeout_ms)
    }

    pub fn synthetic_ttl(&self) -> Duration {
        Duration::from_secs(self.fallback.synthetic_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.cache.max_entries, 5000);
        assert_eq!(config.cache.sweep_interval_secs, 300);
        assert_eq!(config.fallback.provider_timeout_ms, 2500);
        assert!(config.sources.warehouse.enabled);
        assert!(config.sources.static_data.enabled);
        assert_eq!(config.ttl.profile_secs, None);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[cache]
max_entries = 64
ttl_secs = 30
sweep_interval_secs = 10

[sources.warehouse]
enabled = false
base_url = "http://warehouse.internal/"
timeout_seconds = 5
rate_limit_per_minute = 120

[ttl]
activity_secs = 15
"#
        )
        .unwrap();

        let config = AppConfig::load_or_default(Some(file.path())).unwrap();
        assert_eq!(config.cache.max_entries, 64);
        assert!(!config.sources.warehouse.enabled);
        assert_eq!(
            config.sources.warehouse.base_url,
            "http://warehouse.internal/"
        );
        assert_eq!(config.ttl.activity_secs, Some(15));
        // Untouched sections keep their defaults
        assert_eq!(config.fallback.synthetic_ttl_secs, 60);
        assert!(config.sources.live_query.enabled);
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let result = AppConfig::load_or_default(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
    }
}
