//! Dependency information structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dependency as declared in a manifest, before any registry lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredDependency {
    /// Package name as written in the manifest
    pub name: String,
    /// Raw version constraint text, e.g. `^4.17.20` or `>=2.0,<3`
    pub constraint: String,
    /// Whether the entry came from a development/optional group
    #[serde(default)]
    pub is_dev: bool,
}

impl DeclaredDependency {
    /// Creates a new dependency
    pub fn new(name: impl Into<String>, constraint: impl Into<String>, is_dev: bool) -> Self {
        Self {
            name: name.into(),
            constraint: constraint.into(),
            is_dev,
        }
    }

    /// Creates a new production dependency
    pub fn production(name: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self::new(name, constraint, false)
    }

    /// Creates a new development dependency
    pub fn development(name: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self::new(name, constraint, true)
    }
}

impl fmt::Display for DeclaredDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dev_marker = if self.is_dev { " (dev)" } else { "" };
        write!(f, "{}@{}{}", self.name, self.constraint, dev_marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_production() {
        let dep = DeclaredDependency::production("react", "^18.2.0");
        assert_eq!(dep.name, "react");
        assert_eq!(dep.constraint, "^18.2.0");
        assert!(!dep.is_dev);
    }

    #[test]
    fn test_dependency_development() {
        let dep = DeclaredDependency::development("jest", "^29.0.0");
        assert!(dep.is_dev);
    }

    #[test]
    fn test_dependency_display() {
        let dep = DeclaredDependency::production("lodash", "^4.17.20");
        assert_eq!(dep.to_string(), "lodash@^4.17.20");

        let dev = DeclaredDependency::development("phpunit/phpunit", "^9.5");
        assert_eq!(dev.to_string(), "phpunit/phpunit@^9.5 (dev)");
    }

    #[test]
    fn test_dependency_deserialize_without_dev_flag() {
        let dep: DeclaredDependency =
            serde_json::from_str(r#"{"name":"requests","constraint":"==2.28.0"}"#).unwrap();
        assert_eq!(dep, DeclaredDependency::production("requests", "==2.28.0"));
    }
}
