/// Structured error types for the vendorboard data layer
///
/// Two layers:
/// - `BoardError`: application-level failures (config, IO, setup). These can
///   surface to the operator.
/// - `ProviderError`: failures of a single backend data source. These are
///   caught and logged by the fallback chain and never reach view consumers.
///
/// A cache miss is control flow (`Option`), not an error.
use thiserror::Error;

pub type BoardResult<T> = Result<T, BoardError>;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Configuration error: {0}")] Config(String),

    #[error("Cache error: {0}")] Cache(String),

    #[error("Invalid invalidation pattern: {0}")] InvalidPattern(#[from] regex::Error),

    #[error("Serialization error: {0}")] Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")] Io(#[from] std::io::Error),

    #[error("Invalid base URL '{url}': {message}")] InvalidUrl {
        url: String,
        message: String,
    },
}

/// Failure of one provider call. Produced at the provider boundary, consumed
/// (logged, swallowed) by the fallback chain.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("{provider} timed out after {timeout_ms}ms")] Timeout {
        provider: &'static str,
        timeout_ms: u64,
    },

    #[error("{provider} returned HTTP {status}")] Http {
        provider: &'static str,
        status: u16,
    },

    #[error("{provider} network error: {message}")] Network {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} response parse error: {message}")] Parse {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} is disabled via configuration")] Disabled {
        provider: &'static str,
    },
}

impl ProviderError {
    /// Which provider produced this error.
    pub fn provider(&self) -> &'static str {
        match self {
            ProviderError::Timeout { provider, .. } => provider,
            ProviderError::Http { provider, .. } => provider,
            ProviderError::Network { provider, .. } => provider,
            ProviderError::Parse { provider, .. } => provider,
            ProviderError::Disabled { provider } => provider,
        }
    }

    /// Whether a later retry of the same provider could plausibly succeed.
    /// Parse failures and disabled providers are deterministic; the rest are
    /// environmental.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ProviderError::Timeout { .. } => true,
            ProviderError::Http { .. } => true,
            ProviderError::Network { .. } => true,
            ProviderError::Parse { .. } => false,
            ProviderError::Disabled { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_recoverability() {
        let timeout = ProviderError::Timeout {
            provider: "warehouse",
            timeout_ms: 2500,
        };
        let parse = ProviderError::Parse {
            provider: "live-query",
            message: "missing field `id`".to_string(),
        };

        assert!(timeout.is_recoverable());
        assert!(!parse.is_recoverable());
        assert_eq!(timeout.provider(), "warehouse");
        assert_eq!(parse.provider(), "live-query");
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::Http {
            provider: "warehouse",
            status: 503,
        };
        assert_eq!(err.to_string(), "warehouse returned HTTP 503");
    }
}
