//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: manifest reading, parsing and rewriting failures
//! - RegistryError: package registry communication failures
//! - InvalidVersion: a constraint or registry string with no numeric core
//! - ConfigError: configuration file and CLI option problems

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ManifestKind;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Package registry related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the updated manifest
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest text is not valid for its kind
    #[error("failed to parse {kind}: {message}")]
    Parse { kind: ManifestKind, message: String },

    /// Manifest parsed but declares nothing to analyze
    #[error("no dependencies found in {kind}")]
    NoDependencies { kind: ManifestKind },

    /// File name does not map to a supported manifest kind
    #[error("unsupported manifest format: {path}")]
    UnsupportedFormat { path: PathBuf },
}

/// Coarse classification of a registry failure, carried into results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistryErrorKind {
    /// The registry answered that the package does not exist
    NotFound,
    /// Transport failure, timeout or a non-success status
    Unreachable,
    /// The registry answered with a body we could not interpret
    BadResponse,
}

impl std::fmt::Display for RegistryErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RegistryErrorKind::NotFound => "not found",
            RegistryErrorKind::Unreachable => "unreachable",
            RegistryErrorKind::BadResponse => "bad response",
        };
        write!(f, "{}", s)
    }
}

/// Errors related to package registry communication
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    NotFound { package: String, registry: String },

    /// Network request failed or the registry returned an error status
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    Unreachable {
        package: String,
        registry: String,
        message: String,
    },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    BadResponse {
        package: String,
        registry: String,
        message: String,
    },
}

impl RegistryError {
    /// Creates a new NotFound error
    pub fn not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::NotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new Unreachable error
    pub fn unreachable(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::Unreachable {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new BadResponse error
    pub fn bad_response(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::BadResponse {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> RegistryErrorKind {
        match self {
            RegistryError::NotFound { .. } => RegistryErrorKind::NotFound,
            RegistryError::Unreachable { .. } => RegistryErrorKind::Unreachable,
            RegistryError::BadResponse { .. } => RegistryErrorKind::BadResponse,
        }
    }

    /// Package (or search term) the failed request was about
    pub fn package(&self) -> &str {
        match self {
            RegistryError::NotFound { package, .. }
            | RegistryError::Unreachable { package, .. }
            | RegistryError::BadResponse { package, .. } => package,
        }
    }
}

/// A version string without a usable numeric core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid version '{raw}': {reason}")]
pub struct InvalidVersion {
    pub raw: String,
    pub reason: &'static str,
}

impl InvalidVersion {
    pub fn new(raw: impl Into<String>, reason: &'static str) -> Self {
        Self {
            raw: raw.into(),
            reason,
        }
    }
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for our schema
    #[error("failed to parse config: {message}")]
    ParseError { message: String },

    /// A value parsed but is out of range
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

impl ManifestError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Parse error
    pub fn parse(kind: ManifestKind, message: impl Into<String>) -> Self {
        ManifestError::Parse {
            kind,
            message: message.into(),
        }
    }
}
