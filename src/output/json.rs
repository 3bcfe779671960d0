//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of scan reports (`{ manifest, summary, packages }`)
//! - JSON serialization of search hits

use crate::domain::{BatchSummary, Ecosystem, ManifestKind, PackageResult};
use crate::orchestrator::BatchReport;
use crate::output::{OutputFormatter, ReportSource};
use crate::registry::SearchHit;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of a scan report
#[derive(Serialize)]
struct JsonReport<'a> {
    manifest: JsonManifest,
    summary: &'a BatchSummary,
    packages: &'a [PackageResult],
}

#[derive(Serialize)]
struct JsonManifest {
    path: String,
    kind: ManifestKind,
    ecosystem: Ecosystem,
}

/// JSON representation of a search
#[derive(Serialize)]
struct JsonSearch<'a> {
    ecosystem: Ecosystem,
    term: &'a str,
    hits: &'a [SearchHit],
}

fn write_json<T: Serialize>(value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    writeln!(writer, "{}", json)
}

impl OutputFormatter for JsonFormatter {
    fn format_report(
        &self,
        source: ReportSource<'_>,
        report: &BatchReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let output = JsonReport {
            manifest: JsonManifest {
                path: source.path.display().to_string(),
                kind: source.kind,
                ecosystem: source.kind.ecosystem(),
            },
            summary: &report.summary,
            packages: &report.results,
        };
        write_json(&output, writer)
    }

    fn format_search(
        &self,
        ecosystem: Ecosystem,
        term: &str,
        hits: &[SearchHit],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        write_json(
            &JsonSearch {
                ecosystem,
                term,
                hits,
            },
            writer,
        )
    }
}
