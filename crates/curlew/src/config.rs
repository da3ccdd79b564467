//! Client configuration: TOML-backed settings for the transport and the
//! optional retry layer, convertible into the runtime policy objects.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::retry::{DefaultShouldRetry, ExponentialBackoff, RetryConfig};
use crate::transport::CurlOptions;

/// Retry policy parameters (optional `[retry]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Base backoff delay in seconds (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Backoff growth factor per attempt. 0 means a constant delay.
    pub multiplier: f64,
    /// Backoff randomization factor, ideally < 1.
    pub jitter: f64,
    /// Upper bound on the backoff delay in seconds. 0 means no bound.
    pub max_delay_secs: u64,
    /// Read the whole response body before treating an attempt as done.
    #[serde(default)]
    pub read_response: bool,
    /// Bytes to drain from an abandoned response body before dropping it.
    #[serde(default = "default_drain_limit")]
    pub drain_limit: u64,
}

fn default_drain_limit() -> u64 {
    4096
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
            multiplier: 1.6,
            jitter: 0.2,
            max_delay_secs: 120,
            read_response: false,
            drain_limit: default_drain_limit(),
        }
    }
}

impl RetrySettings {
    /// Build the runtime retry configuration: exponential backoff from these
    /// settings plus the default retry predicate.
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            should_retry: Arc::new(DefaultShouldRetry),
            backoff: Arc::new(ExponentialBackoff {
                base_delay: Duration::try_from_secs_f64(self.base_delay_secs)
                    .unwrap_or(Duration::ZERO),
                multiplier: self.multiplier,
                jitter: self.jitter,
                max_delay: Duration::from_secs(self.max_delay_secs),
            }),
            read_response: self.read_response,
            drain_limit: self.drain_limit,
        }
    }
}

/// Transport parameters (`[http]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Connection timeout in seconds. 0 disables the limit.
    pub connect_timeout_secs: u64,
    /// Hard timeout for a whole transfer in seconds. 0 disables it.
    pub timeout_secs: u64,
    /// Follow 3xx redirects.
    pub follow_redirects: bool,
    /// Optional User-Agent override.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        let defaults = CurlOptions::default();
        Self {
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            timeout_secs: defaults.timeout.as_secs(),
            follow_redirects: defaults.follow_redirects,
            user_agent: None,
        }
    }
}

impl HttpSettings {
    pub fn to_curl_options(&self) -> CurlOptions {
        CurlOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            follow_redirects: self.follow_redirects,
            user_agent: self
                .user_agent
                .clone()
                .or_else(|| CurlOptions::default().user_agent),
        }
    }
}

/// Full client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Transport settings.
    #[serde(default)]
    pub http: HttpSettings,
    /// Optional retry policy; absent means no retry layer is installed.
    #[serde(default)]
    pub retry: Option<RetrySettings>,
}

/// Load configuration from a TOML file.
pub fn load(path: &Path) -> Result<ClientConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: ClientConfig = toml::from_str(&data)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
