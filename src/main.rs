//! depstatus - Dependency freshness checker CLI tool
//!
//! Reports, for every dependency of a manifest, how its declared version
//! relates to the newest release on its registry:
//! - npm (package.json)
//! - Packagist (composer.json)
//! - PyPI (requirements.txt, pyproject.toml)

use clap::Parser;
use depstatus::cancel::CancellationToken;
use depstatus::cli::{CliArgs, Command, ScanArgs, SearchArgs};
use depstatus::config::Config;
use depstatus::error::{AppError, ManifestError};
use depstatus::manifest::{read_manifest, render_updated};
use depstatus::orchestrator::scan_manifest;
use depstatus::output::{create_formatter, OutputConfig, OutputFormatter, ReportSource};
use depstatus::progress::Progress;
use depstatus::registry::{create_client, search_packages, HttpClient};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Exit code when the report is complete but some packages failed
const EXIT_PARTIAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.default_log_filter());

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays clean for reports
fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Loads the configuration file, applies CLI overrides and builds the HTTP client
fn prepare(args: &CliArgs) -> Result<(Config, HttpClient), AppError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    args.apply_overrides(&mut config);
    config.validate()?;

    let client = HttpClient::from_config(&config.http)?;
    Ok((config, client))
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let (config, http) = prepare(&args)?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling remaining lookups");
            trigger.cancel();
        }
    });

    let formatter = create_formatter(OutputConfig::from_cli(args.json, args.verbose, args.quiet));

    match &args.command {
        Command::Scan(scan) => {
            run_scan(&args, scan, &config, http, &cancel, formatter.as_ref()).await
        }
        Command::Search(search) => {
            run_search(search, &config, http, &cancel, formatter.as_ref()).await
        }
    }
}

async fn run_scan(
    args: &CliArgs,
    scan: &ScanArgs,
    config: &Config,
    http: HttpClient,
    cancel: &CancellationToken,
    formatter: &dyn OutputFormatter,
) -> anyhow::Result<ExitCode> {
    let (kind, content) = read_manifest(&scan.file, scan.kind)?;
    info!(path = %scan.file.display(), %kind, "scanning manifest");

    let client = create_client(kind.ecosystem(), http, &config.registries);
    let mut progress = Progress::new(args.show_progress(), 0, "Checking dependencies");

    let outcome = scan_manifest(
        &content,
        kind,
        client,
        config.batch.clone(),
        cancel,
        &progress,
    )
    .await;
    progress.finish_and_clear();

    let report = match outcome {
        Ok(report) => report,
        Err(ManifestError::NoDependencies { kind }) => {
            if !args.quiet {
                eprintln!("No dependencies found in {} ({})", scan.file.display(), kind);
            }
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => return Err(e.into()),
    };

    let mut stdout = io::stdout().lock();
    formatter.format_report(
        ReportSource {
            path: &scan.file,
            kind,
        },
        &report,
        &mut stdout,
    )?;
    stdout.flush()?;

    if let (Some(target), Some(output)) = (scan.rewrite, &scan.output) {
        let updated = render_updated(&content, kind, &report.results, target)?;
        std::fs::write(output, updated).map_err(|e| ManifestError::write_error(output, e))?;
        if !args.quiet {
            eprintln!("Wrote {} versions to {}", target, output.display());
        }
    }

    if report.summary.has_failures() {
        Ok(ExitCode::from(EXIT_PARTIAL))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

async fn run_search(
    search: &SearchArgs,
    config: &Config,
    http: HttpClient,
    cancel: &CancellationToken,
    formatter: &dyn OutputFormatter,
) -> anyhow::Result<ExitCode> {
    let client = create_client(search.ecosystem, http, &config.registries);
    let hits = search_packages(client.as_ref(), &search.term, search.limit, cancel).await?;

    let mut stdout = io::stdout().lock();
    formatter.format_search(search.ecosystem, search.term.trim(), &hits, &mut stdout)?;
    stdout.flush()?;

    Ok(ExitCode::SUCCESS)
}
