// src/health/target.rs
use crate::config::{TargetConfig, DEFAULT_EXPECTED_STATUS};
use crate::schema::BodySchema;
use std::time::Duration;
use url::Url;

/// A single URL plus the expectations it is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckTarget {
    pub name: String,
    pub url: Url,
    pub expected_status: u16,
    pub expected_body_schema: Option<BodySchema>,
    /// Falls back to the runner's default timeout when unset.
    pub timeout: Option<Duration>,
}

impl CheckTarget {
    pub fn new(url: Url, expected_status: u16) -> Self {
        Self {
            name: url.to_string(),
            url,
            expected_status,
            expected_body_schema: None,
            timeout: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_body_schema(mut self, schema: BodySchema) -> Self {
        self.expected_body_schema = Some(schema);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl From<&TargetConfig> for CheckTarget {
    fn from(config: &TargetConfig) -> Self {
        Self {
            name: config.display_name(),
            url: config.url.clone(),
            expected_status: config.expected_status,
            expected_body_schema: config.body,
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }
}

impl From<Url> for CheckTarget {
    fn from(url: Url) -> Self {
        Self::new(url, DEFAULT_EXPECTED_STATUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_defaults_name_to_url() {
        let config = TargetConfig::new(Url::parse("https://example.test/").unwrap());
        let target = CheckTarget::from(&config);

        assert_eq!(target.name, "https://example.test/");
        assert_eq!(target.expected_status, 200);
        assert_eq!(target.timeout, None);
    }

    #[test]
    fn test_from_config_carries_overrides() {
        let mut config = TargetConfig::new(Url::parse("https://example.test/posts").unwrap());
        config.name = Some("posts".into());
        config.body = Some(BodySchema::Posts);
        config.timeout_secs = Some(2);

        let target = CheckTarget::from(&config);
        assert_eq!(target.name, "posts");
        assert_eq!(target.expected_body_schema, Some(BodySchema::Posts));
        assert_eq!(target.timeout, Some(Duration::from_secs(2)));
    }
}
