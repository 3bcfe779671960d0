//! Per-dependency analysis results

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Status;
use crate::error::{InvalidVersion, RegistryError, RegistryErrorKind};

/// Why a dependency could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum LookupFailure {
    /// The registry lookup itself failed
    Registry {
        kind: RegistryErrorKind,
        message: String,
    },
    /// A version string (declared or published) has no numeric core
    InvalidVersion { raw: String },
    /// The registry knows the package but lists no usable versions
    NoPublishedVersions,
    /// The batch was cancelled before this lookup finished
    Cancelled,
}

impl From<&RegistryError> for LookupFailure {
    fn from(err: &RegistryError) -> Self {
        LookupFailure::Registry {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<InvalidVersion> for LookupFailure {
    fn from(err: InvalidVersion) -> Self {
        LookupFailure::InvalidVersion { raw: err.raw }
    }
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupFailure::Registry { kind, .. } => write!(f, "registry {}", kind),
            LookupFailure::InvalidVersion { raw } => write!(f, "invalid version '{}'", raw),
            LookupFailure::NoPublishedVersions => write!(f, "no published versions"),
            LookupFailure::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Analysis outcome for one declared dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageResult {
    /// Package name as declared
    pub name: String,
    /// Cleaned current constraint (operators stripped)
    pub current: String,
    /// Registry's latest version; `None` serializes as `"unknown"`
    #[serde(with = "latest_or_unknown")]
    pub latest: Option<String>,
    /// Newest stable release in the current major line
    pub recommended: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<LookupFailure>,
}

impl PackageResult {
    /// Latest version for display, `"unknown"` when it could not be determined
    pub fn latest_display(&self) -> &str {
        self.latest.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn is_failed(&self) -> bool {
        self.status == Status::Failed
    }

    /// Version an upgrade would move to for the given preference.
    /// Returns `None` for failed results.
    pub fn upgrade_version(&self, prefer_latest: bool) -> Option<&str> {
        if self.is_failed() {
            return None;
        }
        if prefer_latest {
            self.latest.as_deref()
        } else {
            Some(&self.recommended)
        }
    }
}

const UNKNOWN: &str = "unknown";

mod latest_or_unknown {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::UNKNOWN;

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(UNKNOWN))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|v| v != UNKNOWN))
    }
}
