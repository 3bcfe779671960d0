//! Output formatting for scan reports and search results
//!
//! This module provides:
//! - Text output for human-readable display
//! - JSON output for machine processing

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::domain::{Ecosystem, ManifestKind};
use crate::orchestrator::BatchReport;
use crate::registry::SearchHit;
use std::io::Write;
use std::path::Path;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Summary only
    Quiet,
    #[default]
    Normal,
    /// Also show full failure messages
    Verbose,
}

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub verbosity: Verbosity,
    /// Whether to use colors (when supported)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            verbosity: Verbosity::default(),
            color: true,
        }
    }
}

impl OutputConfig {
    /// Create configuration from CLI flags; color follows the terminal and `NO_COLOR`
    pub fn from_cli(json: bool, verbose: bool, quiet: bool) -> Self {
        let format = if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        Self {
            format,
            verbosity,
            color: colored::control::SHOULD_COLORIZE.should_colorize(),
        }
    }
}

/// Which manifest a report belongs to
#[derive(Debug, Clone, Copy)]
pub struct ReportSource<'a> {
    pub path: &'a Path,
    pub kind: ManifestKind,
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write a scan report
    fn format_report(
        &self,
        source: ReportSource<'_>,
        report: &BatchReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    /// Format and write search hits
    fn format_search(
        &self,
        ecosystem: Ecosystem,
        term: &str,
        hits: &[SearchHit],
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(config.verbosity, config.color)),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_config_default() {
        let config = OutputConfig::default();
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.verbosity, Verbosity::Normal);
        assert!(config.color);
    }

    #[test]
    fn test_output_config_from_cli_json() {
        let config = OutputConfig::from_cli(true, false, false);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.verbosity, Verbosity::Normal);
    }

    #[test]
    fn test_output_config_quiet_wins_over_verbose() {
        let config = OutputConfig::from_cli(false, true, true);
        assert_eq!(config.verbosity, Verbosity::Quiet);

        let config = OutputConfig::from_cli(false, true, false);
        assert_eq!(config.verbosity, Verbosity::Verbose);
    }
}
