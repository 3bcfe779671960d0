//! Ecosystem and manifest kind definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Package ecosystems with a registry we can query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// JavaScript packages on the npm registry
    Npm,
    /// PHP packages on Packagist
    Composer,
    /// Python packages on PyPI
    PyPI,
}

impl Ecosystem {
    /// Returns the display name for this ecosystem
    pub fn display_name(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::Composer => "Composer",
            Ecosystem::PyPI => "Python",
        }
    }

    /// Returns the name of the registry serving this ecosystem
    pub fn registry_name(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::Composer => "Packagist",
            Ecosystem::PyPI => "PyPI",
        }
    }

    /// Public web page for a package on this ecosystem's registry
    pub fn package_url(&self, name: &str) -> String {
        match self {
            Ecosystem::Npm => format!("https://www.npmjs.com/package/{}", name),
            Ecosystem::Composer => format!("https://packagist.org/packages/{}", name),
            Ecosystem::PyPI => format!("https://pypi.org/project/{}/", name),
        }
    }

    /// Returns all supported ecosystems
    pub fn all() -> &'static [Ecosystem] {
        &[Ecosystem::Npm, Ecosystem::Composer, Ecosystem::PyPI]
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Ecosystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "npm" | "node" | "js" => Ok(Ecosystem::Npm),
            "composer" | "php" | "packagist" => Ok(Ecosystem::Composer),
            "pypi" | "python" | "pip" => Ok(Ecosystem::PyPI),
            other => Err(format!(
                "unknown ecosystem '{}': expected 'npm', 'composer' or 'pypi'",
                other
            )),
        }
    }
}

/// Manifest file formats we can extract dependencies from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestKind {
    PackageJson,
    ComposerJson,
    RequirementsTxt,
    PyprojectToml,
}

impl ManifestKind {
    /// Canonical file name for this manifest kind
    pub fn filename(&self) -> &'static str {
        match self {
            ManifestKind::PackageJson => "package.json",
            ManifestKind::ComposerJson => "composer.json",
            ManifestKind::RequirementsTxt => "requirements.txt",
            ManifestKind::PyprojectToml => "pyproject.toml",
        }
    }

    /// Ecosystem whose registry resolves this manifest's packages
    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            ManifestKind::PackageJson => Ecosystem::Npm,
            ManifestKind::ComposerJson => Ecosystem::Composer,
            ManifestKind::RequirementsTxt | ManifestKind::PyprojectToml => Ecosystem::PyPI,
        }
    }

    /// Detects the manifest kind from a file name (not a full path).
    ///
    /// Besides the canonical names, `requirements-*.txt` and
    /// `requirements_*.txt` variants are recognized.
    pub fn from_filename(filename: &str) -> Option<Self> {
        match filename {
            "package.json" => return Some(ManifestKind::PackageJson),
            "composer.json" => return Some(ManifestKind::ComposerJson),
            "pyproject.toml" => return Some(ManifestKind::PyprojectToml),
            "requirements.txt" => return Some(ManifestKind::RequirementsTxt),
            _ => {}
        }

        let lower = filename.to_ascii_lowercase();
        if lower.starts_with("requirements") && lower.ends_with(".txt") {
            return Some(ManifestKind::RequirementsTxt);
        }
        None
    }

    /// Returns all supported manifest kinds
    pub fn all() -> &'static [ManifestKind] {
        &[
            ManifestKind::PackageJson,
            ManifestKind::ComposerJson,
            ManifestKind::RequirementsTxt,
            ManifestKind::PyprojectToml,
        ]
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filename())
    }
}

impl FromStr for ManifestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "package-json" | "package.json" | "npm" => Ok(ManifestKind::PackageJson),
            "composer-json" | "composer.json" | "composer" => Ok(ManifestKind::ComposerJson),
            "requirements-txt" | "requirements.txt" | "requirements" => {
                Ok(ManifestKind::RequirementsTxt)
            }
            "pyproject-toml" | "pyproject.toml" | "pyproject" => Ok(ManifestKind::PyprojectToml),
            other => Err(format!(
                "unknown manifest kind '{}': expected one of package.json, composer.json, requirements.txt, pyproject.toml",
                other
            )),
        }
    }
}
