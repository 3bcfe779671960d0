//! Canonical, totally ordered version values

use semver::Prerelease;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::normalize;
use crate::error::InvalidVersion;

/// A version reduced to `major.minor.patch` plus an optional prerelease tag.
///
/// Ordering compares the numeric triple first; for equal triples a release
/// sorts above any of its prereleases (`1.0.0-rc.1 < 1.0.0`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Prerelease,
}

impl CanonicalVersion {
    /// Creates a stable version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: Prerelease::EMPTY,
        }
    }

    /// Sets the prerelease tag (builder pattern)
    pub fn with_pre(mut self, pre: Prerelease) -> Self {
        self.pre = pre;
        self
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    pub fn is_stable(&self) -> bool {
        self.pre.is_empty()
    }
}

impl fmt::Display for CanonicalVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre)?;
        }
        Ok(())
    }
}

impl FromStr for CanonicalVersion {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

impl Serialize for CanonicalVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanonicalVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A registry version string paired with its canonical form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedVersion {
    /// Version exactly as the registry lists it
    pub raw: String,
    pub version: CanonicalVersion,
}

impl PublishedVersion {
    /// Normalizes a registry string, returning `None` when it has no numeric core
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let version = normalize(&raw).ok()?;
        Some(Self { raw, version })
    }
}
