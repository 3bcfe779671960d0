//! Registry clients for fetching package version information
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - npm registry client
//! - Packagist (Composer) client
//! - PyPI JSON API client
//! - Version sets and package search

mod client;
mod npm;
mod packagist;
mod pypi;
mod search;
mod version_set;

pub use client::{HttpClient, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use npm::NpmClient;
pub use packagist::PackagistClient;
pub use pypi::PyPIClient;
pub use search::{search_packages, SearchHit};
pub use version_set::RegistryVersionSet;

use crate::config::RegistryUrls;
use crate::domain::Ecosystem;
use crate::error::RegistryError;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for registry clients
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Get the ecosystem this client serves
    fn ecosystem(&self) -> Ecosystem;

    /// Get the registry name used in errors and logs
    fn registry_name(&self) -> &'static str {
        self.ecosystem().registry_name()
    }

    /// Fetch every published version of a package
    async fn fetch_versions(&self, package: &str) -> Result<RegistryVersionSet, RegistryError>;

    /// Search the registry by free-text term, returning at most `limit` hits
    async fn search(&self, term: &str, limit: usize) -> Result<Vec<SearchHit>, RegistryError>;
}

/// Create a registry client for the given ecosystem
pub fn create_client(
    ecosystem: Ecosystem,
    client: HttpClient,
    urls: &RegistryUrls,
) -> Arc<dyn RegistryClient> {
    match ecosystem {
        Ecosystem::Npm => Arc::new(NpmClient::new(client).with_base_url(&urls.npm)),
        Ecosystem::Composer => Arc::new(
            PackagistClient::new(client)
                .with_repo_url(&urls.packagist_repo)
                .with_site_url(&urls.packagist_site),
        ),
        Ecosystem::PyPI => Arc::new(PyPIClient::new(client).with_base_url(&urls.pypi)),
    }
}

/// Strips trailing slashes so URL joins never produce `//`
fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_per_ecosystem() {
        let urls = RegistryUrls::default();
        for ecosystem in Ecosystem::all() {
            let client = create_client(*ecosystem, HttpClient::new().unwrap(), &urls);
            assert_eq!(client.ecosystem(), *ecosystem);
            assert_eq!(client.registry_name(), ecosystem.registry_name());
        }
    }

    #[test]
    fn test_trim_base() {
        assert_eq!(trim_base("http://localhost:1234/"), "http://localhost:1234");
        assert_eq!(trim_base("https://pypi.org"), "https://pypi.org");
    }
}
