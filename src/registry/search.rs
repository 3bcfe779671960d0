//! Package search across registries

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::RegistryClient;
use crate::cancel::CancellationToken;
use crate::domain::Ecosystem;
use crate::error::{RegistryError, RegistryErrorKind};

/// One package matching a search term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Latest version when the registry reports it in search results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub url: String,
    pub ecosystem: Ecosystem,
}

/// Searches one registry for `term`.
///
/// A blank term returns no hits without touching the network, as do an
/// unknown package (`NotFound`) and a cancelled token.
pub async fn search_packages(
    client: &dyn RegistryClient,
    term: &str,
    limit: usize,
    cancel: &CancellationToken,
) -> Result<Vec<SearchHit>, RegistryError> {
    let term = term.trim();
    if term.is_empty() || cancel.is_cancelled() {
        return Ok(Vec::new());
    }

    debug!(term, limit, registry = client.registry_name(), "searching");

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(term, "search cancelled");
            return Ok(Vec::new());
        }
        outcome = client.search(term, limit) => outcome,
    };

    match outcome {
        Ok(hits) => Ok(hits),
        Err(e) if e.kind() == RegistryErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}
