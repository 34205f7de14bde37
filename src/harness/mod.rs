// src/harness/mod.rs
mod summary;

pub use summary::RunSummary;

use crate::config::Config;
use crate::health::{CheckTarget, Checker, HealthCheckRunner};
use crate::metrics::ReportMetrics;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("Environment setup failed: {0}")]
    Setup(String),
}

type Cleanup = Box<dyn FnOnce() + Send>;

/// Owns everything a batch of checks needs. Setup happens in the
/// constructor; teardown runs exactly once, either through
/// [`Harness::teardown`] or when the harness is dropped.
pub struct Harness {
    config: Config,
    targets: Vec<CheckTarget>,
    checker: Arc<dyn Checker>,
    metrics: Option<ReportMetrics>,
    cleanups: Vec<Cleanup>,
    torn_down: bool,
}

impl Harness {
    pub fn setup(config: Config) -> Result<Self, HarnessError> {
        let runner = HealthCheckRunner::new(&config.http)
            .map_err(|e| HarnessError::Setup(format!("Failed to create HTTP client: {}", e)))?;
        Self::with_checker(config, Arc::new(runner))
    }

    pub fn with_checker(config: Config, checker: Arc<dyn Checker>) -> Result<Self, HarnessError> {
        info!("Setting up pre-check configuration...");

        config
            .validate()
            .map_err(|e| HarnessError::Setup(format!("{:#}", e)))?;

        let metrics = match config.report.metrics_path {
            Some(_) => Some(
                ReportMetrics::new()
                    .map_err(|e| HarnessError::Setup(format!("Failed to create metrics: {:#}", e)))?,
            ),
            None => None,
        };

        let targets: Vec<CheckTarget> = config.targets.iter().map(CheckTarget::from).collect();

        info!(
            "Harness ready: {} targets, {} checker, default timeout {:?}",
            targets.len(),
            checker.name(),
            config.http.timeout()
        );

        Ok(Self {
            config,
            targets,
            checker,
            metrics,
            cleanups: Vec::new(),
            torn_down: false,
        })
    }

    pub fn targets(&self) -> &[CheckTarget] {
        &self.targets
    }

    /// Register an action to run at teardown. Actions run in reverse order.
    pub fn on_teardown<F>(&mut self, cleanup: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cleanups.push(Box::new(cleanup));
    }

    /// Check every target concurrently. A failing target never stops the others.
    pub async fn run(&self) -> RunSummary {
        let run_id = Uuid::new_v4();
        let span = info_span!("health_run", %run_id);

        async {
            info!("Starting health check run for {} targets", self.targets.len());

            let checks = self
                .targets
                .iter()
                .map(|target| self.checker.check(target));
            let results = futures::future::join_all(checks).await;

            for result in &results {
                if result.passed {
                    info!("{}", result);
                } else {
                    warn!("{}", result);
                }

                if let Some(metrics) = &self.metrics {
                    metrics.record(result);
                }
            }

            let summary = RunSummary { run_id, results };
            info!(
                "Health check run complete: {} passed, {} failed",
                summary.passed_count(),
                summary.failed_count()
            );
            summary
        }
        .instrument(span)
        .await
    }

    /// Write the metrics report, if one is configured.
    pub async fn write_report(&self) -> anyhow::Result<()> {
        if let (Some(metrics), Some(path)) = (&self.metrics, &self.config.report.metrics_path) {
            metrics.write_textfile(path).await?;
            info!("Wrote metrics report to {}", path.display());
        }
        Ok(())
    }

    pub fn teardown(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        info!("Cleaning up post-check state...");
        while let Some(cleanup) = self.cleanups.pop() {
            cleanup();
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.finish();
    }
}
