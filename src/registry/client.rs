//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout, User-Agent and retry count
//! - Exponential backoff for transport errors, 429 and 5xx responses
//! - Mapping of HTTP outcomes onto [`RegistryError`] kinds

use crate::config::HttpConfig;
use crate::error::RegistryError;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
pub const DEFAULT_USER_AGENT: &str = concat!("depstatus/", env!("CARGO_PKG_VERSION"));

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with default settings (no retries)
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom timeout and User-Agent
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                RegistryError::unreachable(
                    "",
                    "HTTP client",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            max_retries: 0,
        })
    }

    /// Create a client from the `[http]` config section
    pub fn from_config(config: &HttpConfig) -> Result<Self, RegistryError> {
        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        Ok(Self::with_config(Duration::from_secs(config.timeout_secs), user_agent)?
            .with_max_retries(config.retries))
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Perform a GET request with retry logic and error context
    pub async fn get_with_context(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<reqwest::Response, RegistryError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(url, attempt, delay_ms = delay, "retrying registry request");
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay *= 2;
            }

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::NOT_FOUND {
                        return Err(RegistryError::not_found(package, registry));
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        last_error = Some(RegistryError::unreachable(
                            package,
                            registry,
                            format!("HTTP {}", status),
                        ));
                        continue;
                    }

                    if !status.is_success() {
                        return Err(RegistryError::unreachable(
                            package,
                            registry,
                            format!("HTTP {}", status),
                        ));
                    }

                    return Ok(response);
                }
                Err(e) => {
                    let message = if e.is_timeout() {
                        "request timed out".to_string()
                    } else {
                        e.to_string()
                    };
                    last_error = Some(RegistryError::unreachable(package, registry, message));
                }
            }
        }

        let err = last_error
            .unwrap_or_else(|| RegistryError::unreachable(package, registry, "unknown error"));
        warn!(%err, "registry request failed");
        Err(err)
    }

    /// Perform a GET request and parse the JSON response
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<T, RegistryError> {
        debug!(url, package, registry, "fetching");
        let response = self.get_with_context(url, package, registry).await?;

        response.json::<T>().await.map_err(|e| {
            RegistryError::bad_response(package, registry, format!("failed to parse JSON: {}", e))
        })
    }

    /// GET `base` with URL-encoded query parameters and parse the JSON response
    pub async fn get_json_with_query<T: serde::de::DeserializeOwned>(
        &self,
        base: &str,
        query: &[(&str, &str)],
        package: &str,
        registry: &str,
    ) -> Result<T, RegistryError> {
        let url = Url::parse_with_params(base, query).map_err(|e| {
            RegistryError::unreachable(package, registry, format!("invalid URL {}: {}", base, e))
        })?;
        self.get_json(url.as_str(), package, registry).await
    }
}
