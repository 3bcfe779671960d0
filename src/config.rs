//! Configuration file support
//!
//! All sections are optional; anything missing falls back to the defaults
//! below. Example:
//!
//! ```toml
//! [http]
//! timeout_secs = 10
//! retries = 2
//!
//! [batch]
//! concurrency = 16
//!
//! [registries]
//! npm = "https://registry.npmmirror.com"
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// Default HTTP timeout (30 seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of lookups in flight at once
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub http: HttpConfig,
    pub batch: BatchConfig,
    pub registries: RegistryUrls,
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Retries for transient failures (transport errors, 429, 5xx)
    pub retries: u32,
    /// Overrides the default `depstatus/<version>` User-Agent
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retries: 0,
            user_agent: None,
        }
    }
}

/// Batch orchestration configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Maximum lookups in flight
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Registry base URLs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryUrls {
    pub npm: String,
    /// Packagist metadata mirror (`/p2/...`)
    pub packagist_repo: String,
    /// Packagist website, which serves `search.json`
    pub packagist_site: String,
    pub pypi: String,
}

impl Default for RegistryUrls {
    fn default() -> Self {
        Self {
            npm: "https://registry.npmjs.org".to_string(),
            packagist_repo: "https://repo.packagist.org".to_string(),
            packagist_site: "https://packagist.org".to_string(),
            pypi: "https://pypi.org".to_string(),
        }
    }
}

impl Config {
    /// Parses and validates a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch.concurrency",
                message: "must be at least 1".to_string(),
            });
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.timeout_secs",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
