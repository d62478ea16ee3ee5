//! Backend connection settings loaded from environment variables.
//!
//! # Environment variables
//!
//! - `KB_BACKEND_URL`       = API origin (default `http://localhost:8000`)
//! - `KB_HTTP_TIMEOUT_SECS` = per-request timeout in seconds (default `60`)

use crate::errors::{ApiClientResult, ConfigError};

/// Origin used when `KB_BACKEND_URL` is unset or empty.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Timeout used when `KB_HTTP_TIMEOUT_SECS` is unset or empty.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for [`crate::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// API origin without trailing slash, e.g. `"http://localhost:8000"`.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// Builds a config for an explicit origin with the default timeout.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidFormat`] if `base_url` is not http(s).
    pub fn with_base_url(base_url: impl Into<String>) -> ApiClientResult<Self> {
        let base_url = base_url.into();
        validate_http_endpoint("KB_BACKEND_URL", &base_url)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Loads the config from the process environment.
    pub fn from_env() -> ApiClientResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the config through an arbitrary variable lookup.
    ///
    /// Empty or whitespace-only values count as unset.
    pub fn from_lookup<F>(lookup: F) -> ApiClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut cfg = match read("KB_BACKEND_URL") {
            Some(url) => Self::with_base_url(url.trim())?,
            None => Self::default(),
        };

        if let Some(raw) = read("KB_HTTP_TIMEOUT_SECS") {
            cfg.timeout_secs =
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidNumber {
                        var: "KB_HTTP_TIMEOUT_SECS",
                        reason: "expected u64",
                    })?;
        }

        Ok(cfg)
    }
}

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
fn validate_http_endpoint(var: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        })
    }
}
