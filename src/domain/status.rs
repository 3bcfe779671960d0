//! Freshness status of a single dependency

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome class for one analyzed dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Current version equals the registry's latest
    UpToDate,
    /// Behind latest without crossing a major version
    Outdated,
    /// Latest is in a higher major version
    MajorUpdate,
    /// Either side could not be determined
    Failed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::UpToDate => "up-to-date",
            Status::Outdated => "outdated",
            Status::MajorUpdate => "major-update",
            Status::Failed => "failed",
        }
    }

    pub fn all() -> &'static [Status] {
        &[
            Status::UpToDate,
            Status::Outdated,
            Status::MajorUpdate,
            Status::Failed,
        ]
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
