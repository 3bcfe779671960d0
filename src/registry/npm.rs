//! npm Registry client
//!
//! Fetches package version information from the npm registry.
//! API endpoints:
//! - https://registry.npmjs.org/{package}
//! - https://registry.npmjs.org/-/v1/search?text={term}&size={limit}

use crate::domain::Ecosystem;
use crate::error::RegistryError;
use crate::registry::{trim_base, HttpClient, RegistryClient, RegistryVersionSet, SearchHit};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// npm registry base URL
const NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// npm Registry client
pub struct NpmClient {
    client: HttpClient,
    base_url: String,
}

/// npm package metadata response (packument)
#[derive(Debug, Deserialize)]
struct NpmPackageResponse {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    /// Available versions; the manifests themselves are not needed
    #[serde(default)]
    versions: HashMap<String, serde::de::IgnoredAny>,
}

#[derive(Debug, Deserialize)]
struct NpmSearchResponse {
    #[serde(default)]
    objects: Vec<NpmSearchObject>,
}

#[derive(Debug, Deserialize)]
struct NpmSearchObject {
    package: NpmSearchPackage,
}

#[derive(Debug, Deserialize)]
struct NpmSearchPackage {
    name: String,
    version: Option<String>,
    description: Option<String>,
    #[serde(default)]
    links: HashMap<String, String>,
}

impl NpmClient {
    /// Create a new npm client against the public registry
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: NPM_REGISTRY_URL.to_string(),
        }
    }

    /// Point the client at another registry (mirrors, tests)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = trim_base(base_url);
        self
    }

    /// Build the URL for a package; the scope separator is percent-encoded
    fn build_url(&self, package: &str) -> String {
        if package.starts_with('@') {
            format!("{}/{}", self.base_url, package.replacen('/', "%2F", 1))
        } else {
            format!("{}/{}", self.base_url, package)
        }
    }

    fn build_search_url(&self) -> String {
        format!("{}/-/v1/search", self.base_url)
    }
}

#[async_trait]
impl RegistryClient for NpmClient {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    async fn fetch_versions(&self, package: &str) -> Result<RegistryVersionSet, RegistryError> {
        let url = self.build_url(package);
        let mut response: NpmPackageResponse = self
            .client
            .get_json(&url, package, self.registry_name())
            .await?;

        let declared_latest = response.dist_tags.remove("latest");
        let published = response.versions.into_keys().collect();

        Ok(RegistryVersionSet::new(published, declared_latest))
    }

    async fn search(&self, term: &str, limit: usize) -> Result<Vec<SearchHit>, RegistryError> {
        let size = limit.to_string();
        let response: NpmSearchResponse = self
            .client
            .get_json_with_query(
                &self.build_search_url(),
                &[("text", term), ("size", size.as_str())],
                term,
                self.registry_name(),
            )
            .await?;

        Ok(response
            .objects
            .into_iter()
            .take(limit)
            .map(|object| {
                let package = object.package;
                let url = package
                    .links
                    .get("npm")
                    .cloned()
                    .unwrap_or_else(|| Ecosystem::Npm.package_url(&package.name));
                SearchHit {
                    name: package.name,
                    version: package.version,
                    description: package.description,
                    url,
                    ecosystem: Ecosystem::Npm,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryErrorKind;

    fn client_for(server: &mockito::ServerGuard) -> NpmClient {
        NpmClient::new(HttpClient::new().unwrap()).with_base_url(&server.url())
    }

    #[test]
    fn test_npm_client_ecosystem() {
        let client = NpmClient::new(HttpClient::new().unwrap());
        assert_eq!(client.ecosystem(), Ecosystem::Npm);
        assert_eq!(client.registry_name(), "npm");
    }

    #[test]
    fn test_build_url() {
        let client = NpmClient::new(HttpClient::new().unwrap());
        assert_eq!(
            client.build_url("lodash"),
            "https://registry.npmjs.org/lodash"
        );
    }

    #[test]
    fn test_build_url_scoped_package() {
        let client = NpmClient::new(HttpClient::new().unwrap());
        assert_eq!(
            client.build_url("@types/node"),
            "https://registry.npmjs.org/@types%2Fnode"
        );
    }

    #[test]
    fn test_with_base_url_trims_slash() {
        let client = NpmClient::new(HttpClient::new().unwrap()).with_base_url("http://mirror/");
        assert_eq!(client.build_url("react"), "http://mirror/react");
    }

    #[tokio::test]
    async fn test_fetch_versions() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/lodash")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "name": "lodash",
                    "dist-tags": {"latest": "4.17.21", "next": "5.0.0-beta.1"},
                    "versions": {
                        "4.17.20": {"name": "lodash"},
                        "4.17.21": {"name": "lodash"},
                        "5.0.0-beta.1": {"name": "lodash"}
                    }
                }"#,
            )
            .create_async()
            .await;

        let versions = client_for(&server).fetch_versions("lodash").await.unwrap();

        mock.assert_async().await;
        assert_eq!(versions.declared_latest.as_deref(), Some("4.17.21"));
        assert_eq!(versions.published.len(), 3);
        assert_eq!(versions.stable().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_versions_unpublished_package() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone")
            .with_status(200)
            .with_body(r#"{"name": "gone", "time": {"unpublished": {}}}"#)
            .create_async()
            .await;

        let versions = client_for(&server).fetch_versions("gone").await.unwrap();
        assert!(versions.is_empty());
        assert_eq!(versions.latest(), None);
    }

    #[tokio::test]
    async fn test_fetch_versions_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/left-pad-xyz")
            .with_status(404)
            .with_body(r#"{"error": "Not found"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .fetch_versions("left-pad-xyz")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), RegistryErrorKind::NotFound);
        assert_eq!(err.package(), "left-pad-xyz");
    }

    #[tokio::test]
    async fn test_search() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/-/v1/search")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("text".into(), "react".into()),
                mockito::Matcher::UrlEncoded("size".into(), "2".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"objects": [
                    {"package": {"name": "react", "version": "18.2.0",
                                 "description": "UI library",
                                 "links": {"npm": "https://www.npmjs.com/package/react"}}},
                    {"package": {"name": "react-dom", "version": "18.2.0"}}
                ], "total": 2}"#,
            )
            .create_async()
            .await;

        let hits = client_for(&server).search("react", 2).await.unwrap();

        mock.assert_async().await;
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "react");
        assert_eq!(hits[0].description.as_deref(), Some("UI library"));
        assert_eq!(hits[1].url, "https://www.npmjs.com/package/react-dom");
        assert_eq!(hits[1].description, None);
    }
}
