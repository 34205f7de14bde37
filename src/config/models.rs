// src/config/models.rs
use crate::schema::BodySchema;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_EXPECTED_STATUS: u16 = 200;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub url: Url,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    #[serde(default)]
    pub body: Option<BodySchema>,
    /// Overrides `http.timeout_secs` for this target only.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Prometheus textfile written after the run.
    #[serde(default)]
    pub metrics_path: Option<PathBuf>,
}

fn default_expected_status() -> u16 {
    DEFAULT_EXPECTED_STATUS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TargetConfig {
    pub fn new(url: Url) -> Self {
        Self {
            name: None,
            url,
            expected_status: DEFAULT_EXPECTED_STATUS,
            body: None,
            timeout_secs: None,
        }
    }

    /// Name used in logs and metric labels; the URL when none is set.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.url.to_string())
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            bail!("No targets configured");
        }

        if self.http.timeout_secs == 0 {
            bail!("http.timeout_secs must be greater than zero");
        }

        let mut names = HashSet::new();
        for target in &self.targets {
            let name = target.display_name();
            if !names.insert(name.clone()) {
                bail!("Duplicate target name '{}'; give each target a unique name", name);
            }

            if !matches!(target.url.scheme(), "http" | "https") {
                bail!(
                    "Target {} has unsupported scheme '{}'",
                    target.url,
                    target.url.scheme()
                );
            }

            if !(100..=599).contains(&target.expected_status) {
                bail!(
                    "Target {} has invalid expected status {}",
                    target.url,
                    target.expected_status
                );
            }

            if target.timeout_secs == Some(0) {
                bail!("Target {} has a zero timeout", target.url);
            }
        }

        Ok(())
    }

    /// Layer `HEALTHCHECK_*` environment variables on top of the file config.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    pub(crate) fn apply_vars<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = var("HEALTHCHECK_TIMEOUT_SECS") {
            self.http.timeout_secs = match raw.trim().parse() {
                Ok(secs) => secs,
                Err(_) => bail!("HEALTHCHECK_TIMEOUT_SECS is not a number: {}", raw),
            };
        }

        if let Some(raw) = var("HEALTHCHECK_URL") {
            let url = match Url::parse(raw.trim()) {
                Ok(url) => url,
                Err(e) => bail!("HEALTHCHECK_URL is not a valid URL ({}): {}", e, raw),
            };

            let mut target = TargetConfig::new(url);
            if let Some(raw) = var("HEALTHCHECK_EXPECTED_STATUS") {
                target.expected_status = match raw.trim().parse() {
                    Ok(code) => code,
                    Err(_) => bail!("HEALTHCHECK_EXPECTED_STATUS is not a number: {}", raw),
                };
            }
            self.targets.push(target);
        } else if var("HEALTHCHECK_EXPECTED_STATUS").is_some() {
            bail!("HEALTHCHECK_EXPECTED_STATUS is set but HEALTHCHECK_URL is not");
        }

        Ok(())
    }
}
