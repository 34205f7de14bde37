// src/metrics/collector.rs
use crate::health::CheckResult;
use anyhow::{Context, Result};
use prometheus::{
    Encoder, GaugeVec, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::path::Path;

pub struct ReportMetrics {
    registry: Registry,

    // Per-target verdicts
    pub check_passed: IntGaugeVec,
    pub check_status_code: IntGaugeVec,
    pub check_duration_seconds: GaugeVec,

    // Check totals
    pub checks_total: IntCounterVec,
}

impl ReportMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let check_passed = IntGaugeVec::new(
            Opts::new("health_check_passed", "1 if the last check passed, 0 otherwise"),
            &["target"],
        )?;
        registry.register(Box::new(check_passed.clone()))?;

        let check_status_code = IntGaugeVec::new(
            Opts::new(
                "health_check_status_code",
                "Observed HTTP status code (0 when no response)",
            ),
            &["target"],
        )?;
        registry.register(Box::new(check_status_code.clone()))?;

        let check_duration_seconds = GaugeVec::new(
            Opts::new("health_check_duration_seconds", "Duration of the check"),
            &["target"],
        )?;
        registry.register(Box::new(check_duration_seconds.clone()))?;

        let checks_total = IntCounterVec::new(
            Opts::new("health_check_checks_total", "Checks performed by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(checks_total.clone()))?;

        Ok(Self {
            registry,
            check_passed,
            check_status_code,
            check_duration_seconds,
            checks_total,
        })
    }

    pub fn record(&self, result: &CheckResult) {
        let target = result.target.name.as_str();

        self.check_passed
            .with_label_values(&[target])
            .set(i64::from(result.passed));
        self.check_status_code
            .with_label_values(&[target])
            .set(i64::from(result.observed_status.unwrap_or(0)));
        self.check_duration_seconds
            .with_label_values(&[target])
            .set(result.elapsed_ms as f64 / 1000.0);

        let outcome = if result.passed { "passed" } else { "failed" };
        self.checks_total.with_label_values(&[outcome]).inc();
    }

    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .context("Failed to encode metrics")?;
        Ok(buffer)
    }

    /// Write the exposition text for a node-exporter textfile collector.
    pub async fn write_textfile<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let buffer = self.gather()?;
        tokio::fs::write(path, buffer)
            .await
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
        Ok(())
    }
}
