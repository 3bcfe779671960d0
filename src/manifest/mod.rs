//! Manifest reading, dependency extraction and rewriting
//!
//! This module provides functionality to:
//! - Read a manifest and detect its kind from the file name
//! - Extract declared dependencies (last declaration of a name wins,
//!   first-seen order is kept)
//! - Render an updated manifest text with new versions, preserving formatting

mod composer_json;
mod package_json;
mod pyproject_toml;
mod requirements_txt;

pub use composer_json::ComposerJsonParser;
pub use package_json::PackageJsonParser;
pub use pyproject_toml::PyprojectTomlParser;
pub use requirements_txt::RequirementsTxtParser;

use crate::domain::{DeclaredDependency, ManifestKind, PackageResult};
use crate::error::ManifestError;
use crate::version::{normalize, split_constraint};
use indexmap::IndexMap;
use regex::Regex;
use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::str::FromStr;

/// A new version to write for one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyUpdate {
    pub name: String,
    pub version: String,
}

impl DependencyUpdate {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Which column of a result drives a rewrite
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpgradeTarget {
    /// Registry latest, possibly crossing a major version
    #[default]
    Latest,
    /// Newest stable release in the current major line
    Recommended,
}

impl fmt::Display for UpgradeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeTarget::Latest => write!(f, "latest"),
            UpgradeTarget::Recommended => write!(f, "recommended"),
        }
    }
}

impl FromStr for UpgradeTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "latest" => Ok(UpgradeTarget::Latest),
            "recommended" => Ok(UpgradeTarget::Recommended),
            other => Err(format!(
                "invalid upgrade target '{}': expected 'latest' or 'recommended'",
                other
            )),
        }
    }
}

/// Trait for manifest formats
pub trait ManifestParser {
    /// Returns the manifest kind this parser handles
    fn kind(&self) -> ManifestKind;

    /// Extract declared dependencies, possibly empty
    fn extract(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError>;

    /// Rewrite every declaration of `package` to `new_version`, keeping each
    /// constraint's operator. Content without the package comes back unchanged.
    fn update_version(
        &self,
        content: &str,
        package: &str,
        new_version: &str,
    ) -> Result<String, ManifestError>;

    /// Apply a list of updates in order
    fn render_updated(
        &self,
        content: &str,
        updates: &[DependencyUpdate],
    ) -> Result<String, ManifestError> {
        updates.iter().try_fold(content.to_string(), |text, update| {
            self.update_version(&text, &update.name, &update.version)
        })
    }
}

/// Get a manifest parser for the specified kind
pub fn get_parser(kind: ManifestKind) -> Box<dyn ManifestParser> {
    match kind {
        ManifestKind::PackageJson => Box::new(PackageJsonParser),
        ManifestKind::ComposerJson => Box::new(ComposerJsonParser),
        ManifestKind::RequirementsTxt => Box::new(RequirementsTxtParser),
        ManifestKind::PyprojectToml => Box::new(PyprojectTomlParser),
    }
}

/// Extracts the dependency list of a manifest.
///
/// A manifest that parses but declares nothing analyzable is reported as
/// [`ManifestError::NoDependencies`].
pub fn extract(content: &str, kind: ManifestKind) -> Result<Vec<DeclaredDependency>, ManifestError> {
    let dependencies = get_parser(kind).extract(content)?;
    if dependencies.is_empty() {
        return Err(ManifestError::NoDependencies { kind });
    }
    Ok(dependencies)
}

/// Renders the manifest with versions taken from analyzed results.
///
/// Failed results are never written.
pub fn render_updated(
    content: &str,
    kind: ManifestKind,
    results: &[PackageResult],
    target: UpgradeTarget,
) -> Result<String, ManifestError> {
    let updates: Vec<DependencyUpdate> = results
        .iter()
        .filter_map(|result| {
            result
                .upgrade_version(target == UpgradeTarget::Latest)
                .map(|version| DependencyUpdate::new(&result.name, version))
        })
        .collect();

    get_parser(kind).render_updated(content, &updates)
}

/// Reads a manifest file, detecting its kind from the file name unless given
pub fn read_manifest(
    path: &Path,
    kind: Option<ManifestKind>,
) -> Result<(ManifestKind, String), ManifestError> {
    let kind = match kind {
        Some(kind) => kind,
        None => path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(ManifestKind::from_filename)
            .ok_or_else(|| ManifestError::UnsupportedFormat {
                path: path.to_path_buf(),
            })?,
    };

    let content =
        std::fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))?;
    Ok((kind, content))
}

/// Keeps the old constraint's operator in front of the new version.
///
/// `^4.17.20` + `4.18.0` gives `^4.18.0`; `==2.28.0` + `2.31.0` gives `==2.31.0`.
pub(crate) fn rewrite_constraint(old: &str, new_version: &str) -> String {
    let (operator, _) = split_constraint(old);
    format!("{}{}", operator, new_version)
}

/// Builds the ordered, de-duplicated dependency list from `(name, constraint, is_dev)`
/// entries. A repeated name replaces the earlier value but keeps its position.
pub(crate) fn merge_declarations<I>(entries: I) -> Vec<DeclaredDependency>
where
    I: IntoIterator<Item = (String, String, bool)>,
{
    let mut merged: IndexMap<String, (String, bool)> = IndexMap::new();
    for (name, constraint, is_dev) in entries {
        merged.insert(name, (constraint, is_dev));
    }

    merged
        .into_iter()
        .map(|(name, (constraint, is_dev))| DeclaredDependency::new(name, constraint, is_dev))
        .collect()
}

/// String-valued entries of a JSON object member such as `dependencies`
pub(crate) fn json_group(
    json: &serde_json::Value,
    key: &str,
    is_dev: bool,
) -> Vec<(String, String, bool)> {
    json.get(key)
        .and_then(|v| v.as_object())
        .map(|deps| {
            deps.iter()
                .filter_map(|(name, value)| {
                    value
                        .as_str()
                        .map(|constraint| (name.clone(), constraint.to_string(), is_dev))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Byte ranges of the top-level object members named in `keys`, braces included.
///
/// Walks the JSON text directly so the ranges index into the original content.
pub(crate) fn json_member_spans(content: &str, keys: &[&str]) -> Vec<Range<usize>> {
    let bytes = content.as_bytes();
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut string_start = 0;
    let mut last_key: Option<&str> = None;
    let mut open: Option<usize> = None;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
                if depth == 1 {
                    last_key = Some(&content[string_start..i]);
                }
            }
            continue;
        }

        match b {
            b'"' => {
                in_string = true;
                string_start = i + 1;
            }
            b'{' | b'[' => {
                if depth == 1 && b == b'{' && last_key.is_some_and(|k| keys.contains(&k)) {
                    open = Some(i);
                }
                depth += 1;
            }
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                if depth == 1 {
                    if let Some(start) = open.take() {
                        spans.push(start..i + 1);
                    }
                }
            }
            b',' if depth == 1 => last_key = None,
            _ => {}
        }
    }

    spans
}

/// Rewrites `"package": "constraint"` pairs inside the given dependency objects
/// without reformatting the JSON text. Values that are not versions are left alone.
pub(crate) fn update_json_entry(
    content: &str,
    kind: ManifestKind,
    groups: &[&str],
    package: &str,
    new_version: &str,
) -> Result<String, ManifestError> {
    // Escape special characters in package name (e.g., @scope/package)
    let pattern = format!(r#"("{}"\s*:\s*)"([^"]*)""#, regex::escape(package));
    let re = Regex::new(&pattern)
        .map_err(|e| ManifestError::parse(kind, format!("invalid pattern for {}: {}", package, e)))?;

    let mut result = content.to_string();
    // Back to front so earlier ranges stay valid
    for span in json_member_spans(content, groups).into_iter().rev() {
        let section = &content[span.clone()];
        let updated = re.replace(section, |caps: &regex::Captures| {
            if normalize(&caps[2]).is_err() {
                return caps[0].to_string();
            }
            format!(
                r#"{}"{}""#,
                &caps[1],
                rewrite_constraint(&caps[2], new_version)
            )
        });
        result.replace_range(span, &updated);
    }

    Ok(result)
}
