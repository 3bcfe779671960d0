//! depstatus - Dependency freshness checker library
//!
//! This library provides the core functionality for checking how the
//! dependencies declared in a manifest relate to their registries:
//! - npm (package.json)
//! - Packagist (composer.json)
//! - PyPI (requirements.txt, pyproject.toml)

pub mod cancel;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod registry;
pub mod version;
