// src/main.rs
use anyhow::Result;
use http_health_harness::{config, Harness};
use std::process::ExitCode;
use tracing::{error, info};

const SETUP_FAILED: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("http_health_harness=debug".parse()?)
                .add_directive("reqwest=info".parse()?),
        )
        .init();

    info!("Starting health check run...");

    // Load configuration
    let loaded = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            config::load_config(&path).await
        }
        None => {
            info!("No config file given, reading HEALTHCHECK_* environment");
            config::config_from_env()
        }
    };

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("Environment setup failed: {:#}", e);
            return Ok(ExitCode::from(SETUP_FAILED));
        }
    };

    let harness = match Harness::setup(config) {
        Ok(harness) => harness,
        Err(e) => {
            error!("{}", e);
            return Ok(ExitCode::from(SETUP_FAILED));
        }
    };

    let summary = harness.run().await;

    if let Err(e) = harness.write_report().await {
        error!("Failed to write metrics report: {:#}", e);
    }

    harness.teardown();

    if !summary.all_passed() {
        error!(
            "{} of {} checks failed",
            summary.failed_count(),
            summary.results.len()
        );
    }

    Ok(ExitCode::from(summary.exit_code() as u8))
}
