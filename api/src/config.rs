//! Client configuration.
//!
//! Loaded from environment variables with defaults suitable for a local
//! backend.

use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default backend address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// API client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL (scheme, host and port, no trailing path).
    ///
    /// Default: `http://localhost:8080`
    pub base_url: String,

    /// Per-request timeout.
    ///
    /// Default: 30 seconds
    pub request_timeout: Duration,

    /// File holding the persisted bearer token. `None` keeps it in memory
    /// only.
    pub credentials_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Configuration for the given backend with default settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            credentials_path: None,
        }
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Persist the bearer token in `path`.
    #[must_use]
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    /// Load configuration from environment variables.
    ///
    /// - `ROOST_API_BASE_URL` (default `http://localhost:8080`)
    /// - `ROOST_REQUEST_TIMEOUT_SECS` (default 30; unparseable values fall
    ///   back to the default)
    /// - `ROOST_CREDENTIALS_PATH` (unset keeps the token in memory)
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("ROOST_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            request_timeout: env::var("ROOST_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs),
            credentials_path: env::var_os("ROOST_CREDENTIALS_PATH").map(PathBuf::from),
        }
    }

    /// Check that the base URL is an absolute `http(s)` URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(format!("{}: {e}", self.base_url)))?;

        if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() {
            Ok(())
        } else {
            Err(ConfigError::InvalidBaseUrl(self.base_url.clone()))
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
