//! Packagist Registry client
//!
//! Fetches package version information from the Packagist registry.
//! API endpoints:
//! - https://repo.packagist.org/p2/{vendor}/{package}.json
//! - https://packagist.org/search.json?q={term}

use crate::domain::Ecosystem;
use crate::error::RegistryError;
use crate::registry::{trim_base, HttpClient, RegistryClient, RegistryVersionSet, SearchHit};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// Packagist metadata repository URL
const PACKAGIST_REPO_URL: &str = "https://repo.packagist.org";

/// Packagist website URL (hosts the search API)
const PACKAGIST_SITE_URL: &str = "https://packagist.org";

/// Packagist Registry client
pub struct PackagistClient {
    client: HttpClient,
    repo_url: String,
    site_url: String,
}

/// p2 metadata response: package name to its version entries
#[derive(Debug, Deserialize)]
struct PackagistResponse {
    #[serde(default)]
    packages: HashMap<String, Vec<PackagistVersion>>,
}

#[derive(Debug, Deserialize)]
struct PackagistVersion {
    version: String,
}

#[derive(Debug, Deserialize)]
struct PackagistSearchResponse {
    #[serde(default)]
    results: Vec<PackagistSearchResult>,
}

#[derive(Debug, Deserialize)]
struct PackagistSearchResult {
    name: String,
    description: Option<String>,
    url: Option<String>,
}

impl PackagistClient {
    /// Create a new Packagist client
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            repo_url: PACKAGIST_REPO_URL.to_string(),
            site_url: PACKAGIST_SITE_URL.to_string(),
        }
    }

    pub fn with_repo_url(mut self, repo_url: &str) -> Self {
        self.repo_url = trim_base(repo_url);
        self
    }

    pub fn with_site_url(mut self, site_url: &str) -> Self {
        self.site_url = trim_base(site_url);
        self
    }

    /// Build the URL for a package
    /// Package names are in the format vendor/package; p2 paths are lowercase
    fn build_url(&self, package: &str) -> String {
        format!(
            "{}/p2/{}.json",
            self.repo_url,
            package.to_ascii_lowercase()
        )
    }

    fn build_search_url(&self) -> String {
        format!("{}/search.json", self.site_url)
    }
}

#[async_trait]
impl RegistryClient for PackagistClient {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Composer
    }

    async fn fetch_versions(&self, package: &str) -> Result<RegistryVersionSet, RegistryError> {
        let url = self.build_url(package);
        let mut response: PackagistResponse = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        // p2 keys are lowercase while manifests may not be
        let entries = response
            .packages
            .remove(package)
            .or_else(|| response.packages.remove(&package.to_ascii_lowercase()))
            .ok_or_else(|| {
                RegistryError::bad_response(
                    package,
                    self.registry_name(),
                    "response does not list the requested package",
                )
            })?;

        let published = entries.into_iter().map(|entry| entry.version).collect();
        Ok(RegistryVersionSet::new(published, None))
    }

    async fn search(&self, term: &str, limit: usize) -> Result<Vec<SearchHit>, RegistryError> {
        let per_page = limit.to_string();
        let response: PackagistSearchResponse = self
            .client
            .get_json_with_query(
                &self.build_search_url(),
                &[("q", term), ("per_page", per_page.as_str())],
                term,
                self.registry_name(),
            )
            .await?;

        Ok(response
            .results
            .into_iter()
            .take(limit)
            .map(|result| {
                let url = result
                    .url
                    .unwrap_or_else(|| Ecosystem::Composer.package_url(&result.name));
                SearchHit {
                    name: result.name,
                    version: None,
                    description: result.description.filter(|d| !d.is_empty()),
                    url,
                    ecosystem: Ecosystem::Composer,
                }
            })
            .collect())
    }
}
