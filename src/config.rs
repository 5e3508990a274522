//! Feed configuration
//!
//! Describes which contract view to poll and how, loaded from YAML or JSON.
//!
//! ```yaml
//! rpc_url: https://rpc.testnet.near.org
//! contract: feedback.testnet
//! family: company:3
//! page_size: 3
//! interval_ms: 1000
//! http:
//!   timeout_secs: 10
//!   max_retries: 2
//! ```

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::poller::PaginatorConfig;
use crate::source::{Finality, RecordFamily};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

// ============================================================================
// Top-Level Feed Config
// ============================================================================

/// Everything needed to poll one feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,

    /// Account id of the feedback contract
    pub contract: String,

    /// Which paged view to read
    #[serde(default)]
    pub family: RecordFamily,

    /// Block finality for view calls
    #[serde(default)]
    pub finality: Finality,

    /// Records per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Polling period in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Per-fetch timeout in milliseconds (default: two intervals)
    #[serde(default)]
    pub fetch_timeout_ms: Option<u64>,

    /// Page shown first
    #[serde(default = "default_initial_page")]
    pub initial_page: u64,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_page_size() -> u32 {
    3
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_initial_page() -> u64 {
    1
}

impl FeedConfig {
    /// Create a config with defaults for everything but the endpoint
    pub fn new(rpc_url: impl Into<String>, contract: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            contract: contract.into(),
            family: RecordFamily::default(),
            finality: Finality::default(),
            page_size: default_page_size(),
            interval_ms: default_interval_ms(),
            fetch_timeout_ms: None,
            initial_page: default_initial_page(),
            http: HttpConfig::default(),
        }
    }

    /// Load from a file; `.json` is parsed as JSON, anything else as YAML
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            }
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values make sense before anything is started
    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.trim().is_empty() {
            return Err(Error::missing_field("rpc_url"));
        }
        let url = Url::parse(&self.rpc_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "rpc_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if self.contract.trim().is_empty() {
            return Err(Error::missing_field("contract"));
        }
        if self.initial_page == 0 {
            return Err(Error::invalid_value("initial_page", "pages start at 1"));
        }
        self.paginator_config().validate()?;
        self.http.validate()
    }

    /// Poller settings
    pub fn paginator_config(&self) -> PaginatorConfig {
        let mut config = PaginatorConfig::new(self.page_size)
            .interval(Duration::from_millis(self.interval_ms))
            .initial_page(self.initial_page);
        if let Some(timeout) = self.fetch_timeout_ms {
            config = config.fetch_timeout(Duration::from_millis(timeout));
        }
        config
    }

    /// HTTP client settings
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .max_retries(self.http.max_retries)
            .backoff(
                self.http.backoff,
                Duration::from_millis(self.http.initial_backoff_ms),
                Duration::from_millis(self.http.max_backoff_ms),
            );
        if let Some(rate_limit) = &self.http.rate_limit {
            builder = builder.rate_limit(rate_limit.clone());
        }
        for (key, value) in &self.http.headers {
            builder = builder.header(key, value);
        }
        builder.build()
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff strategy
    #[serde(default)]
    pub backoff: BackoffType,

    /// First backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Optional client-side rate limit
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    1
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    1000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            rate_limit: None,
            headers: HashMap::new(),
        }
    }
}

impl HttpConfig {
    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value(
                "http.timeout_secs",
                "must be greater than 0",
            ));
        }
        if self.max_backoff_ms < self.initial_backoff_ms {
            return Err(Error::invalid_value(
                "http.max_backoff_ms",
                "must not be below http.initial_backoff_ms",
            ));
        }
        if let Some(rate_limit) = &self.rate_limit {
            if rate_limit.requests_per_second == 0 || rate_limit.burst_size == 0 {
                return Err(Error::invalid_value(
                    "http.rate_limit",
                    "requests_per_second and burst_size must be greater than 0",
                ));
            }
        }
        Ok(())
    }
}
