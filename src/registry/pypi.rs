//! PyPI JSON API client
//!
//! Fetches package version information from PyPI.
//! API endpoint: https://pypi.org/pypi/{package}/json
//!
//! PyPI has no JSON search endpoint, so a search is an exact-name lookup.

use crate::domain::Ecosystem;
use crate::error::{RegistryError, RegistryErrorKind};
use crate::registry::{trim_base, HttpClient, RegistryClient, RegistryVersionSet, SearchHit};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// PyPI base URL
const PYPI_URL: &str = "https://pypi.org";

/// PyPI client
pub struct PyPIClient {
    client: HttpClient,
    base_url: String,
}

/// PyPI package metadata response
#[derive(Debug, Deserialize)]
struct PyPIResponse {
    info: PyPIInfo,
    /// Release files keyed by version
    #[serde(default)]
    releases: HashMap<String, Vec<ReleaseFile>>,
}

#[derive(Debug, Deserialize)]
struct PyPIInfo {
    name: String,
    version: Option<String>,
    summary: Option<String>,
    package_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReleaseFile {
    #[serde(default)]
    yanked: bool,
}

impl PyPIClient {
    /// Create a new PyPI client
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: PYPI_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = trim_base(base_url);
        self
    }

    /// Build the URL for a package
    fn build_url(&self, package: &str) -> String {
        format!("{}/pypi/{}/json", self.base_url, package)
    }

    async fn fetch(&self, package: &str) -> Result<PyPIResponse, RegistryError> {
        let url = self.build_url(package);
        self.client
            .get_json(&url, package, self.registry_name())
            .await
    }
}

/// A release counts as published unless every one of its files is yanked
fn is_published(files: &[ReleaseFile]) -> bool {
    files.is_empty() || files.iter().any(|file| !file.yanked)
}

#[async_trait]
impl RegistryClient for PyPIClient {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::PyPI
    }

    async fn fetch_versions(&self, package: &str) -> Result<RegistryVersionSet, RegistryError> {
        let response = self.fetch(package).await?;

        let published = response
            .releases
            .into_iter()
            .filter(|(_, files)| is_published(files))
            .map(|(version, _)| version)
            .collect();
        let declared_latest = response.info.version.filter(|v| !v.is_empty());

        Ok(RegistryVersionSet::new(published, declared_latest))
    }

    async fn search(&self, term: &str, limit: usize) -> Result<Vec<SearchHit>, RegistryError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let info = match self.fetch(term).await {
            Ok(response) => response.info,
            Err(e) if e.kind() == RegistryErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let url = info
            .package_url
            .unwrap_or_else(|| Ecosystem::PyPI.package_url(&info.name));
        Ok(vec![SearchHit {
            name: info.name,
            version: info.version,
            description: info.summary.filter(|s| !s.is_empty()),
            url,
            ecosystem: Ecosystem::PyPI,
        }])
    }
}
