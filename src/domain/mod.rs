//! Core domain models for depstatus
//!
//! This module contains the fundamental types used throughout the application:
//! - Ecosystem and manifest kinds
//! - Declared dependency entries
//! - Per-package results and failure reasons
//! - Status tallies, progress events and batch summaries

mod dependency;
mod ecosystem;
mod package_result;
mod status;
mod summary;

pub use dependency::DeclaredDependency;
pub use ecosystem::{Ecosystem, ManifestKind};
pub use package_result::{LookupFailure, PackageResult};
pub use status::Status;
pub use summary::{BatchSummary, ProgressEvent, StatusTallies};
