//! Remote store configuration.
//!
//! Credentials are resolved once at startup and injected into the client.

use fleet_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Environment variable holding the store's REST endpoint.
pub const URL_ENV: &str = "UPSTASH_REDIS_REST_URL";

/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "UPSTASH_REDIS_REST_TOKEN";

/// Client tuning, layered through the application config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum concurrent value fetches during an agent read
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_fetch_concurrency() -> usize {
    8
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

/// Resolved store endpoint and credentials.
#[derive(Clone)]
pub struct StoreConfig {
    pub url: Url,
    pub token: String,
    pub settings: StoreSettings,
}

impl StoreConfig {
    /// Builds a config without the HTTPS check. Used for local stores and tests.
    pub fn new(url: &str, token: impl Into<String>) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| Error::configuration(format!("{URL_ENV} is not a valid URL: {e}")))?;

        if url.cannot_be_a_base() {
            return Err(Error::configuration(format!(
                "{URL_ENV} must be an absolute http(s) URL"
            )));
        }

        Ok(Self {
            url,
            token: token.into(),
            settings: StoreSettings::default(),
        })
    }

    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`.
    ///
    /// Both variables are required and the URL must use HTTPS.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = lookup(URL_ENV).filter(|v| !v.trim().is_empty());
        let token = lookup(TOKEN_ENV).filter(|v| !v.trim().is_empty());

        let (Some(url), Some(token)) = (url, token) else {
            return Err(Error::configuration(format!(
                "Store configuration missing. Set {URL_ENV} and {TOKEN_ENV}"
            )));
        };

        let config = Self::new(url.trim(), token.trim())?;

        if config.url.scheme() != "https" {
            return Err(Error::configuration(format!(
                "{URL_ENV} must be an HTTPS URL, got scheme '{}'",
                config.url.scheme()
            )));
        }

        Ok(config)
    }

    pub fn with_settings(mut self, settings: StoreSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url.as_str())
            .field("token", &"<redacted>")
            .field("settings", &self.settings)
            .finish()
    }
}
