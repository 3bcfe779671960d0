//! Batch orchestrator for analyzing a manifest's dependencies
//!
//! This module provides:
//! - Per-dependency pipeline: normalize → fetch → select → classify
//! - Bounded concurrent registry lookups with results kept in input order
//! - Progress events after every completed dependency
//! - Cooperative cancellation that still yields a full-length result list

use crate::cancel::CancellationToken;
use crate::config::BatchConfig;
use crate::domain::{
    BatchSummary, DeclaredDependency, LookupFailure, ManifestKind, PackageResult, ProgressEvent,
    StatusTallies,
};
use crate::error::{InvalidVersion, ManifestError};
use crate::manifest;
use crate::registry::RegistryClient;
use crate::version::{classify, clean_constraint, newest_in_major, normalize, CanonicalVersion};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Receives a [`ProgressEvent`] after each completed dependency
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Sink that ignores progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

/// Outcome of one batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// One result per input dependency, in input order
    pub results: Vec<PackageResult>,
    pub summary: BatchSummary,
}

/// Runs the per-dependency pipeline over a whole manifest
pub struct BatchOrchestrator {
    client: Arc<dyn RegistryClient>,
    config: BatchConfig,
}

impl BatchOrchestrator {
    pub fn new(client: Arc<dyn RegistryClient>, config: BatchConfig) -> Self {
        Self { client, config }
    }

    /// Analyze every dependency.
    ///
    /// Lookups overlap up to the configured concurrency; the result list
    /// always has one entry per dependency, at the dependency's index.
    pub async fn run(
        &self,
        dependencies: Vec<DeclaredDependency>,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> BatchReport {
        let total = dependencies.len();
        let concurrency = self.config.concurrency.max(1);
        info!(
            total,
            concurrency,
            registry = self.client.registry_name(),
            "starting batch"
        );

        let mut slots: Vec<Option<PackageResult>> = vec![None; total];
        let mut tallies = StatusTallies::default();

        let mut completions = stream::iter(dependencies.into_iter().enumerate())
            .map(|(index, dependency)| async move {
                (index, self.analyze(&dependency, cancel).await)
            })
            .buffer_unordered(concurrency);

        // Single consumer: re-sequencing and tallies are never touched concurrently
        while let Some((index, result)) = completions.next().await {
            tallies.record(result.status);
            slots[index] = Some(result);
            progress.on_progress(&ProgressEvent {
                analyzed: tallies.analyzed(),
                total,
                tallies,
            });
        }

        let results: Vec<PackageResult> = slots.into_iter().flatten().collect();
        let summary = BatchSummary::from_tallies(total, tallies);
        info!(
            total = summary.total,
            up_to_date = summary.up_to_date,
            outdated = summary.outdated,
            major_update = summary.major_update,
            failed = summary.failed,
            "batch finished"
        );

        BatchReport { results, summary }
    }

    /// Full pipeline for one dependency; failures become `Failed` results
    async fn analyze(
        &self,
        dependency: &DeclaredDependency,
        cancel: &CancellationToken,
    ) -> PackageResult {
        let cleaned = clean_constraint(&dependency.constraint);

        let current = match normalize(&dependency.constraint) {
            Ok(current) => current,
            Err(e) => {
                warn!(package = %dependency.name, error = %e, "cannot normalize current version");
                let current: Result<CanonicalVersion, InvalidVersion> = Err(e.clone());
                return failed_result(dependency, cleaned, &current, e.into());
            }
        };
        let current_ok: Result<CanonicalVersion, InvalidVersion> = Ok(current.clone());

        match self.lookup(&dependency.name, &current, cancel).await {
            Ok((latest_raw, latest, recommended)) => {
                let latest_ok: Result<CanonicalVersion, LookupFailure> = Ok(latest);
                let status = classify(&current_ok, &latest_ok);
                debug!(package = %dependency.name, current = %cleaned, latest = %latest_raw, %status, "analyzed");
                PackageResult {
                    name: dependency.name.clone(),
                    current: cleaned.clone(),
                    latest: Some(latest_raw),
                    recommended: recommended.unwrap_or(cleaned),
                    status,
                    failure: None,
                }
            }
            Err(failure) => {
                warn!(package = %dependency.name, %failure, "lookup failed");
                failed_result(dependency, cleaned, &current_ok, failure)
            }
        }
    }

    /// Registry part of the pipeline: `(latest raw, latest canonical, recommended raw)`
    async fn lookup(
        &self,
        package: &str,
        current: &CanonicalVersion,
        cancel: &CancellationToken,
    ) -> Result<(String, CanonicalVersion, Option<String>), LookupFailure> {
        if cancel.is_cancelled() {
            return Err(LookupFailure::Cancelled);
        }

        debug!(package, registry = self.client.registry_name(), "fetching versions");
        let versions = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LookupFailure::Cancelled),
            fetched = self.client.fetch_versions(package) => {
                fetched.map_err(|e| LookupFailure::from(&e))?
            }
        };

        let latest_raw = versions.latest().ok_or(LookupFailure::NoPublishedVersions)?;
        let latest = normalize(&latest_raw)?;
        let recommended =
            newest_in_major(current, &versions.stable()).map(|p| p.raw.clone());

        Ok((latest_raw, latest, recommended))
    }
}

fn failed_result(
    dependency: &DeclaredDependency,
    cleaned: String,
    current: &Result<CanonicalVersion, InvalidVersion>,
    failure: LookupFailure,
) -> PackageResult {
    let latest: Result<CanonicalVersion, LookupFailure> = Err(failure.clone());
    PackageResult {
        name: dependency.name.clone(),
        current: cleaned.clone(),
        latest: None,
        recommended: cleaned,
        status: classify(current, &latest),
        failure: Some(failure),
    }
}

/// Extracts a manifest's dependencies and analyzes them.
///
/// Fails only for manifest problems, including a manifest with nothing to
/// analyze; registry problems show up as `Failed` results.
pub async fn scan_manifest(
    content: &str,
    kind: ManifestKind,
    client: Arc<dyn RegistryClient>,
    config: BatchConfig,
    cancel: &CancellationToken,
    progress: &dyn ProgressSink,
) -> Result<BatchReport, ManifestError> {
    let dependencies = manifest::extract(content, kind)?;
    debug!(%kind, count = dependencies.len(), "extracted dependencies");

    let orchestrator = BatchOrchestrator::new(client, config);
    Ok(orchestrator.run(dependencies, cancel, progress).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Ecosystem, Status};
    use crate::error::{RegistryError, RegistryErrorKind};
    use crate::registry::{RegistryVersionSet, SearchHit};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory registry with per-package latency
    #[derive(Default)]
    struct FakeRegistry {
        packages: HashMap<String, RegistryVersionSet>,
        delays: HashMap<String, Duration>,
        fetches: AtomicUsize,
    }

    impl FakeRegistry {
        fn with(mut self, name: &str, published: &[&str], declared: Option<&str>) -> Self {
            self.packages.insert(
                name.to_string(),
                RegistryVersionSet::new(
                    published.iter().map(|v| v.to_string()).collect(),
                    declared.map(String::from),
                ),
            );
            self
        }

        fn delayed(mut self, name: &str, millis: u64) -> Self {
            self.delays
                .insert(name.to_string(), Duration::from_millis(millis));
            self
        }
    }

    #[async_trait]
    impl RegistryClient for FakeRegistry {
        fn ecosystem(&self) -> Ecosystem {
            Ecosystem::Npm
        }

        async fn fetch_versions(&self, package: &str) -> Result<RegistryVersionSet, RegistryError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(package) {
                tokio::time::sleep(*delay).await;
            }
            self.packages
                .get(package)
                .cloned()
                .ok_or_else(|| RegistryError::not_found(package, "npm"))
        }

        async fn search(&self, _term: &str, _limit: usize) -> Result<Vec<SearchHit>, RegistryError> {
            Ok(Vec::new())
        }
    }

    fn orchestrator(registry: Arc<FakeRegistry>, concurrency: usize) -> BatchOrchestrator {
        BatchOrchestrator::new(registry, BatchConfig { concurrency })
    }

    fn deps(entries: &[(&str, &str)]) -> Vec<DeclaredDependency> {
        entries
            .iter()
            .map(|(name, constraint)| DeclaredDependency::production(*name, *constraint))
            .collect()
    }

    #[tokio::test]
    async fn test_major_update_with_recommended_in_current_major() {
        let registry = Arc::new(FakeRegistry::default().with(
            "webpack",
            &["8.5.0", "9.1.0", "9.2.3", "10.0.0", "10.1.0-beta.1"],
            Some("10.0.0"),
        ));

        let report = orchestrator(registry, 4)
            .run(deps(&[("webpack", "^9")]), &CancellationToken::new(), &NoProgress)
            .await;

        let result = &report.results[0];
        assert_eq!(result.current, "9");
        assert_eq!(result.latest.as_deref(), Some("10.0.0"));
        assert_eq!(result.recommended, "9.2.3");
        assert_eq!(result.status, Status::MajorUpdate);
        assert!(result.failure.is_none());
    }

    #[tokio::test]
    async fn test_up_to_date() {
        let registry = Arc::new(FakeRegistry::default().with(
            "lodash",
            &["1.2.2", "1.2.3"],
            Some("1.2.3"),
        ));

        let report = orchestrator(registry, 4)
            .run(deps(&[("lodash", "1.2.3")]), &CancellationToken::new(), &NoProgress)
            .await;

        assert_eq!(report.results[0].status, Status::UpToDate);
        assert_eq!(report.results[0].recommended, "1.2.3");
        assert_eq!(report.summary.up_to_date, 1);
    }

    #[tokio::test]
    async fn test_results_keep_input_order_despite_completion_order() {
        let registry = Arc::new(
            FakeRegistry::default()
                .with("slow", &["1.0.0"], Some("1.0.0"))
                .with("medium", &["2.0.0"], Some("2.0.0"))
                .with("fast", &["3.0.0"], Some("3.0.0"))
                .delayed("slow", 120)
                .delayed("medium", 40),
        );

        let report = orchestrator(registry, 3)
            .run(
                deps(&[("slow", "1.0.0"), ("medium", "1.0.0"), ("fast", "3.0.0")]),
                &CancellationToken::new(),
                &NoProgress,
            )
            .await;

        let names: Vec<&str> = report.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["slow", "medium", "fast"]);
        assert_eq!(report.results[1].status, Status::MajorUpdate);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_batch() {
        let registry = Arc::new(
            FakeRegistry::default()
                .with("react", &["18.2.0"], Some("18.2.0"))
                .with("vue", &["3.4.0", "3.3.0"], Some("3.4.0")),
        );

        let report = orchestrator(registry, 2)
            .run(
                deps(&[
                    ("react", "^17.0.0"),
                    ("left-pad-doesnotexist", "^1.0.0"),
                    ("vue", "^3.3.0"),
                ]),
                &CancellationToken::new(),
                &NoProgress,
            )
            .await;

        assert_eq!(report.results.len(), 3);
        let missing = &report.results[1];
        assert_eq!(missing.status, Status::Failed);
        assert_eq!(missing.latest_display(), "unknown");
        assert_eq!(missing.recommended, "1.0.0");
        assert!(matches!(
            missing.failure,
            Some(LookupFailure::Registry {
                kind: RegistryErrorKind::NotFound,
                ..
            })
        ));

        assert_eq!(
            report.summary,
            BatchSummary {
                total: 3,
                up_to_date: 0,
                outdated: 1,
                major_update: 1,
                failed: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_current_is_failed_without_fetch() {
        let registry = Arc::new(FakeRegistry::default().with("acme/tool", &["1.0.0"], None));

        let report = orchestrator(registry.clone(), 2)
            .run(
                deps(&[("acme/tool", "dev-main")]),
                &CancellationToken::new(),
                &NoProgress,
            )
            .await;

        let result = &report.results[0];
        assert_eq!(result.status, Status::Failed);
        assert_eq!(result.latest, None);
        assert_eq!(result.recommended, "dev-main");
        assert_eq!(
            result.failure,
            Some(LookupFailure::InvalidVersion {
                raw: "dev-main".to_string()
            })
        );
        assert_eq!(registry.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_published_versions() {
        let registry = Arc::new(FakeRegistry::default().with("ghost", &[], None));

        let report = orchestrator(registry, 2)
            .run(deps(&[("ghost", "1.0.0")]), &CancellationToken::new(), &NoProgress)
            .await;

        assert_eq!(report.results[0].status, Status::Failed);
        assert_eq!(
            report.results[0].failure,
            Some(LookupFailure::NoPublishedVersions)
        );
    }

    #[tokio::test]
    async fn test_derived_latest_ignores_unparseable_versions() {
        let registry = Arc::new(FakeRegistry::default().with(
            "monolog/monolog",
            &["dev-main", "2.9.1", "3.5.0", "3.6.0-RC1"],
            None,
        ));

        let report = orchestrator(registry, 2)
            .run(
                deps(&[("monolog/monolog", "^2.9")]),
                &CancellationToken::new(),
                &NoProgress,
            )
            .await;

        let result = &report.results[0];
        assert_eq!(result.latest.as_deref(), Some("3.5.0"));
        assert_eq!(result.recommended, "2.9.1");
        assert_eq!(result.status, Status::MajorUpdate);
    }

    #[tokio::test]
    async fn test_progress_event_per_completion() {
        let registry = Arc::new(
            FakeRegistry::default()
                .with("a", &["1.0.0"], Some("1.0.0"))
                .with("b", &["2.0.0"], Some("2.0.0")),
        );
        let events = Mutex::new(Vec::new());
        let sink = |event: &ProgressEvent| events.lock().unwrap().push(*event);

        let report = orchestrator(registry, 2)
            .run(
                deps(&[("a", "1.0.0"), ("b", "1.0.0"), ("c", "1.0.0")]),
                &CancellationToken::new(),
                &sink,
            )
            .await;

        let events = events.into_inner().unwrap();
        assert_eq!(events.len(), 3);
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.analyzed, i + 1);
            assert_eq!(event.total, 3);
            assert_eq!(event.tallies.analyzed(), i + 1);
        }
        let last = events.last().unwrap();
        assert_eq!(last.tallies.up_to_date, 1);
        assert_eq!(last.tallies.major_update, 1);
        assert_eq!(last.tallies.failed, 1);
        assert_eq!(BatchSummary::from_tallies(3, last.tallies), report.summary);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_fetches_nothing() {
        let registry = Arc::new(FakeRegistry::default().with("a", &["1.0.0"], Some("1.0.0")));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = orchestrator(registry.clone(), 2)
            .run(deps(&[("a", "1.0.0"), ("b", "2.0.0")]), &cancel, &NoProgress)
            .await;

        assert_eq!(report.results.len(), 2);
        assert!(report
            .results
            .iter()
            .all(|r| r.failure == Some(LookupFailure::Cancelled)));
        assert_eq!(report.summary.failed, 2);
        assert_eq!(registry.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_resolves_in_flight_and_pending() {
        let registry = Arc::new(
            FakeRegistry::default()
                .with("done", &["1.0.0"], Some("1.0.0"))
                .with("stuck", &["1.0.0"], Some("1.0.0"))
                .with("pending", &["1.0.0"], Some("1.0.0"))
                .delayed("stuck", 30_000),
        );
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let batch = orchestrator(registry.clone(), 1);
        let run = batch.run(
            deps(&[("done", "1.0.0"), ("stuck", "1.0.0"), ("pending", "1.0.0")]),
            &cancel,
            &NoProgress,
        );
        let report = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .expect("cancelled batch should finish promptly");

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.results[0].status, Status::UpToDate);
        assert_eq!(report.results[1].failure, Some(LookupFailure::Cancelled));
        assert_eq!(report.results[2].failure, Some(LookupFailure::Cancelled));
        assert_eq!(registry.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let report = orchestrator(Arc::new(FakeRegistry::default()), 2)
            .run(Vec::new(), &CancellationToken::new(), &NoProgress)
            .await;
        assert!(report.results.is_empty());
        assert_eq!(report.summary, BatchSummary::default());
    }

    #[tokio::test]
    async fn test_scan_manifest() {
        let registry = Arc::new(FakeRegistry::default().with(
            "lodash",
            &["4.17.20", "4.17.21"],
            Some("4.17.21"),
        ));
        let content = r#"{"dependencies": {"lodash": "^4.17.20"}}"#;

        let report = scan_manifest(
            content,
            ManifestKind::PackageJson,
            registry,
            BatchConfig::default(),
            &CancellationToken::new(),
            &NoProgress,
        )
        .await
        .unwrap();

        assert_eq!(report.results[0].status, Status::Outdated);
        assert_eq!(report.results[0].recommended, "4.17.21");
    }

    #[tokio::test]
    async fn test_scan_manifest_without_dependencies() {
        let err = scan_manifest(
            r#"{"name": "app"}"#,
            ManifestKind::PackageJson,
            Arc::new(FakeRegistry::default()),
            BatchConfig::default(),
            &CancellationToken::new(),
            &NoProgress,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ManifestError::NoDependencies { .. }));
    }
}
