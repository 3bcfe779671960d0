//! CLI argument parsing module for depstatus

use crate::config::Config;
use crate::domain::{Ecosystem, ManifestKind};
use crate::manifest::UpgradeTarget;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Dependency freshness checker
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depstatus",
    version,
    about = "Dependency freshness checker for npm, Composer and Python manifests"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output and debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable quiet mode - summary only, no progress bar
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Registry request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check every dependency of a manifest against its registry
    Scan(ScanArgs),
    /// Search a registry for packages
    Search(SearchArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Manifest file (package.json, composer.json, requirements.txt, pyproject.toml)
    pub file: PathBuf,

    /// Manifest kind, when the file name does not tell
    #[arg(long, value_name = "KIND")]
    pub kind: Option<ManifestKind>,

    /// Maximum registry lookups in flight
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Write an updated manifest using the latest or recommended versions
    #[arg(long, value_name = "TARGET", requires = "output")]
    pub rewrite: Option<UpgradeTarget>,

    /// Where to write the updated manifest
    #[arg(long, value_name = "PATH", requires = "rewrite")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Registry to search (npm, composer, pypi)
    pub ecosystem: Ecosystem,

    /// Search term
    pub term: String,

    /// Maximum number of results
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

impl CliArgs {
    /// Apply command-line overrides on top of file configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(timeout) = self.timeout {
            config.http.timeout_secs = timeout;
        }
        if let Command::Scan(scan) = &self.command {
            if let Some(concurrency) = scan.concurrency {
                config.batch.concurrency = concurrency;
            }
        }
    }

    /// Default log filter when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "depstatus=debug"
        } else {
            "warn"
        }
    }

    /// Whether to draw a progress bar
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}
