//! composer.json parser for PHP projects
//!
//! Handles:
//! - require
//! - require-dev
//!
//! Platform requirements (`php`, `ext-*`, `lib-*`, composer plugin APIs)
//! are not Packagist packages and are skipped.

use crate::domain::{DeclaredDependency, ManifestKind};
use crate::error::ManifestError;
use crate::manifest::{json_group, merge_declarations, update_json_entry, ManifestParser};
use serde_json::Value;

/// Parser for composer.json files
pub struct ComposerJsonParser;

const DEPENDENCY_GROUPS: &[&str] = &["require", "require-dev"];

/// Exact platform package names
const PLATFORM_PACKAGES: &[&str] = &[
    "php",
    "php-64bit",
    "php-ipv6",
    "php-zts",
    "php-debug",
    "hhvm",
    "composer",
    "composer-plugin-api",
    "composer-runtime-api",
];

/// Whether a require entry is a platform package rather than a Packagist one
fn is_platform_package(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    PLATFORM_PACKAGES.contains(&lower.as_str())
        || lower.starts_with("ext-")
        || lower.starts_with("lib-")
}

impl ManifestParser for ComposerJsonParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::ComposerJson
    }

    fn extract(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let json: Value = serde_json::from_str(content)
            .map_err(|e| ManifestError::parse(self.kind(), e.to_string()))?;

        let entries = json_group(&json, "require", false)
            .into_iter()
            .chain(json_group(&json, "require-dev", true))
            .filter(|(name, _, _)| !is_platform_package(name));

        Ok(merge_declarations(entries))
    }

    fn update_version(
        &self,
        content: &str,
        package: &str,
        new_version: &str,
    ) -> Result<String, ManifestError> {
        update_json_entry(content, self.kind(), DEPENDENCY_GROUPS, package, new_version)
    }
}
