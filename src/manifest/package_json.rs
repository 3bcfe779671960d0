//! package.json parser for npm projects
//!
//! Handles:
//! - dependencies
//! - devDependencies (a name in both keeps the devDependencies value)

use crate::domain::{DeclaredDependency, ManifestKind};
use crate::error::ManifestError;
use crate::manifest::{json_group, merge_declarations, update_json_entry, ManifestParser};
use serde_json::Value;

/// Parser for package.json files
pub struct PackageJsonParser;

const DEPENDENCY_GROUPS: &[&str] = &["dependencies", "devDependencies"];

impl ManifestParser for PackageJsonParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::PackageJson
    }

    fn extract(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let json: Value = serde_json::from_str(content)
            .map_err(|e| ManifestError::parse(self.kind(), e.to_string()))?;

        let mut entries = json_group(&json, "dependencies", false);
        entries.extend(json_group(&json, "devDependencies", true));

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
