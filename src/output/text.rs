//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One aligned line per package with a colored status
//! - Failure reasons for packages that could not be analyzed
//! - Summary counts per status
//! - Search hit listing

use crate::domain::{BatchSummary, Ecosystem, LookupFailure, PackageResult, Status};
use crate::orchestrator::BatchReport;
use crate::output::{OutputFormatter, ReportSource, Verbosity};
use crate::registry::SearchHit;
use colored::{ColoredString, Colorize};
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    /// Paint text in the color of a status
    fn paint(text: &str, status: Status) -> ColoredString {
        match status {
            Status::UpToDate => text.green(),
            Status::Outdated => text.yellow(),
            Status::MajorUpdate => text.red().bold(),
            Status::Failed => text.red().dimmed(),
        }
    }

    /// Calculate the maximum package name length for alignment
    fn max_name_length(results: &[PackageResult]) -> usize {
        results.iter().map(|r| r.name.len()).max().unwrap_or(0)
    }

    /// Short reason shown after a failed line
    fn failure_note(&self, result: &PackageResult) -> String {
        let Some(failure) = &result.failure else {
            return String::new();
        };
        match (self.verbosity, failure) {
            (Verbosity::Verbose, LookupFailure::Registry { message, .. }) => {
                format!(" ({})", message)
            }
            _ => format!(" ({})", failure),
        }
    }

    /// Format a single package line
    fn format_package_line(
        &self,
        result: &PackageResult,
        max_name_len: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let note = self.failure_note(result);
        let recommended = if !result.is_failed() && result.recommended != result.current {
            format!(" recommended {}", result.recommended)
        } else {
            String::new()
        };

        if self.color {
            let name_display = format!("{:width$}", result.name, width = max_name_len);
            writeln!(
                writer,
                "  {} {} {} {} [{}]{}{}",
                name_display,
                result.current.dimmed(),
                "→".dimmed(),
                result.latest_display().bright_white().bold(),
                Self::paint(result.status.as_str(), result.status),
                recommended.dimmed(),
                note.dimmed()
            )
        } else {
            writeln!(
                writer,
                "  {:width$} {} -> {} [{}]{}{}",
                result.name,
                result.current,
                result.latest_display(),
                result.status,
                recommended,
                note,
                width = max_name_len
            )
        }
    }

    fn format_summary(&self, summary: &BatchSummary, writer: &mut dyn Write) -> std::io::Result<()> {
        let counts = [
            (summary.up_to_date, Status::UpToDate),
            (summary.outdated, Status::Outdated),
            (summary.major_update, Status::MajorUpdate),
            (summary.failed, Status::Failed),
        ];

        if self.color {
            let parts: Vec<String> = counts
                .iter()
                .map(|(count, status)| {
                    let count = count.to_string();
                    let count = if count == "0" {
                        count.dimmed()
                    } else {
                        Self::paint(&count, *status)
                    };
                    format!("{} {}", count, status)
                })
                .collect();
            writeln!(
                writer,
                "{}: {} packages: {}",
                "Summary".bold(),
                summary.total,
                parts.join(", ")
            )
        } else {
            let parts: Vec<String> = counts
                .iter()
                .map(|(count, status)| format!("{} {}", count, status))
                .collect();
            writeln!(
                writer,
                "Summary: {} packages: {}",
                summary.total,
                parts.join(", ")
            )
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format_report(
        &self,
        source: ReportSource<'_>,
        report: &BatchReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        // In quiet mode, only show summary
        if self.verbosity == Verbosity::Quiet {
            return self.format_summary(&report.summary, writer);
        }

        let path_display = source.path.display().to_string();
        let ecosystem = source.kind.ecosystem();
        if self.color {
            writeln!(
                writer,
                "{} {} — {} {}",
                path_display.bold(),
                format!("({})", ecosystem).dimmed(),
                report.summary.total.to_string().bold(),
                if report.summary.total == 1 {
                    "package"
                } else {
                    "packages"
                }
            )?;
        } else {
            writeln!(
                writer,
                "{} ({}) — {} packages",
                path_display, ecosystem, report.summary.total
            )?;
        }

        let max_name_len = Self::max_name_length(&report.results).max(20);
        for result in &report.results {
            self.format_package_line(result, max_name_len, writer)?;
        }

        writeln!(writer)?;
        self.format_summary(&report.summary, writer)
    }

    fn format_search(
        &self,
        ecosystem: Ecosystem,
        term: &str,
        hits: &[SearchHit],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if hits.is_empty() {
            return writeln!(
                writer,
                "No {} packages found for '{}'",
                ecosystem.registry_name(),
                term
            );
        }

        let max_name_len = hits.iter().map(|h| h.name.len()).max().unwrap_or(0);
        for hit in hits {
            let version = hit.version.as_deref().unwrap_or("-");
            let description = hit.description.as_deref().unwrap_or("");
            if self.color {
                writeln!(
                    writer,
                    "  {} {} {}",
                    format!("{:width$}", hit.name, width = max_name_len).bold(),
                    version.green(),
                    description.dimmed()
                )?;
            } else {
                writeln!(
                    writer,
                    "  {:width$} {} {}",
                    hit.name,
                    version,
                    description,
                    width = max_name_len
                )?;
            }
            if self.verbosity == Verbosity::Verbose {
                writeln!(writer, "    {}", hit.url)?;
            }
        }
        Ok(())
    }
}
