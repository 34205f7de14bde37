// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a file (YAML or JSON), then apply environment overrides
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let mut config = parse_config(path, &contents)?;
    config.apply_env()?;
    config.validate()?;
    Ok(config)
}

/// Build configuration from `HEALTHCHECK_*` environment variables alone
pub fn config_from_env() -> Result<Config> {
    let mut config = Config::default();
    config.apply_env()?;
    config.validate()?;
    Ok(config)
}

fn parse_config(path: &Path, contents: &str) -> Result<Config> {
    let is_yaml = matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    );

    let config = if is_yaml {
        serde_yaml::from_str(contents).context("Failed to parse YAML config")?
    } else {
        serde_json::from_str(contents).context("Failed to parse JSON config")?
    };
    Ok(config)
}
