//! Alpha Vantage client configuration.

use std::fmt;
use std::time::Duration;

use earnings_core::API_KEY_ENV_VAR;
use tracing::warn;

/// Alpha Vantage query endpoint.
pub const ALPHAVANTAGE_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Default bound on a single provider call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Overrides the query endpoint (used for proxies and tests).
pub const BASE_URL_ENV_VAR: &str = "ALPHAVANTAGE_BASE_URL";

/// Overrides the per-call timeout, in whole seconds.
pub const TIMEOUT_ENV_VAR: &str = "ALPHAVANTAGE_TIMEOUT_SECS";

/// Settings for [`AlphaVantageProvider`](crate::AlphaVantageProvider).
///
/// The API key is optional here so that a provider can always be built; a
/// lookup without a key fails with `MissingCredential` before any network
/// call is made.
#[derive(Clone, PartialEq, Eq)]
pub struct AlphaVantageConfig {
    /// API key sent as the `apikey` query parameter.
    pub api_key: Option<String>,
    /// Query endpoint.
    pub base_url: String,
    /// Bound on each HTTP call, connect through body.
    pub timeout: Duration,
}

impl fmt::Debug for AlphaVantageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaVantageConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: ALPHAVANTAGE_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AlphaVantageConfig {
    /// Create a configuration with the given API key and default settings.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Read the configuration from the process environment.
    ///
    /// Empty values count as unset. An unparseable timeout is logged and the
    /// default kept.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut config = Self {
            api_key: read(API_KEY_ENV_VAR).map(|k| k.trim().to_string()),
            ..Self::default()
        };

        if let Some(url) = read(BASE_URL_ENV_VAR) {
            config.base_url = url;
        }

        if let Some(raw) = read(TIMEOUT_ENV_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!(
                    variable = TIMEOUT_ENV_VAR,
                    value = %raw,
                    "Ignoring invalid timeout, using default"
                ),
            }
        }

        config
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the query endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the API key if one is configured and non-empty.
    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}
