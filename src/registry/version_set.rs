//! Version lists returned by registries

use crate::version::PublishedVersion;

/// All versions a registry lists for one package.
///
/// Stable/prerelease partitioning happens on canonical versions, so entries
/// that do not normalize (`dev-master`, branch aliases) are never stable and
/// never picked as a derived latest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryVersionSet {
    /// Every published version string, as listed by the registry
    pub published: Vec<String>,
    /// Latest version the registry names explicitly, when it has that notion
    pub declared_latest: Option<String>,
}

impl RegistryVersionSet {
    pub fn new(published: Vec<String>, declared_latest: Option<String>) -> Self {
        Self {
            published,
            declared_latest,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.published.is_empty() && self.declared_latest.is_none()
    }

    /// Published versions that normalize, paired with their raw strings
    pub fn normalized(&self) -> Vec<PublishedVersion> {
        self.published
            .iter()
            .filter_map(|raw| PublishedVersion::parse(raw.as_str()))
            .collect()
    }

    /// Published versions without a prerelease tag
    pub fn stable(&self) -> Vec<PublishedVersion> {
        self.normalized()
            .into_iter()
            .filter(|p| p.version.is_stable())
            .collect()
    }

    /// The registry's latest version.
    ///
    /// Uses the declared latest when present, otherwise the highest stable
    /// published version, otherwise the highest published version of any kind.
    pub fn latest(&self) -> Option<String> {
        if let Some(declared) = &self.declared_latest {
            return Some(declared.clone());
        }

        let normalized = self.normalized();
        let newest = |stable_only: bool| {
            normalized
                .iter()
                .filter(|p| !stable_only || p.version.is_stable())
                .max_by(|a, b| a.version.cmp(&b.version))
                .map(|p| p.raw.clone())
        };

        newest(true).or_else(|| newest(false))
    }
}
