// src/health/result.rs
use super::target::CheckTarget;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    #[error("Expected status {expected}, got {observed}")]
    UnexpectedStatus { expected: u16, observed: u16 },

    #[error("Failed to parse JSON response: {0}")]
    Decode(String),

    #[error("Expected status {expected}, got {observed}; failed to parse JSON response: {decode}")]
    UnexpectedStatusAndDecode {
        expected: u16,
        observed: u16,
        decode: String,
    },
}

impl CheckError {
    pub fn is_connection_class(&self) -> bool {
        matches!(self, CheckError::Connection(_) | CheckError::Timeout(_))
    }

    pub fn is_decode_class(&self) -> bool {
        matches!(
            self,
            CheckError::Decode(_) | CheckError::UnexpectedStatusAndDecode { .. }
        )
    }
}

/// Verdict of one health check. Built once by the runner and never mutated.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub target: CheckTarget,
    pub observed_status: Option<u16>,
    pub decoded_body: Option<serde_json::Value>,
    /// Length of the decoded body when it is a JSON array.
    pub record_count: Option<usize>,
    pub error: Option<CheckError>,
    pub passed: bool,
    pub elapsed_ms: u64,
    pub checked_at: DateTime<Utc>,
}

impl CheckResult {
    pub(crate) fn resolve(
        target: &CheckTarget,
        observed_status: Option<u16>,
        decoded_body: Option<serde_json::Value>,
        error: Option<CheckError>,
        elapsed: Duration,
        checked_at: DateTime<Utc>,
    ) -> Self {
        let record_count = decoded_body
            .as_ref()
            .and_then(|body| body.as_array())
            .map(Vec::len);

        Self {
            target: target.clone(),
            observed_status,
            decoded_body,
            record_count,
            passed: error.is_none(),
            error,
            elapsed_ms: elapsed.as_millis() as u64,
            checked_at,
        }
    }

    /// Re-decode the body into a typed shape, if one was decoded.
    pub fn body_as<T: DeserializeOwned>(&self) -> Option<serde_json::Result<T>> {
        self.decoded_body
            .clone()
            .map(serde_json::from_value)
    }

    /// One human-readable diagnostic line.
    pub fn summary(&self) -> String {
        if let Some(error) = &self.error {
            return error.to_string();
        }

        match (self.record_count, self.target.expected_body_schema) {
            (Some(count), Some(schema)) => {
                format!("Found {} {}", count, schema.record_noun(count))
            }
            _ => format!(
                "Received expected status {}",
                self.observed_status.unwrap_or(self.target.expected_status)
            ),
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({} ms): {}",
            if self.passed { "PASS" } else { "FAIL" },
            self.target.name,
            self.elapsed_ms,
            self.summary()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BodySchema, Post};
    use serde_json::json;
    use url::Url;

    fn target() -> CheckTarget {
        CheckTarget::new(Url::parse("https://example.test/").unwrap(), 200)
    }

    #[test]
    fn test_unexpected_status_message() {
        let result = CheckResult::resolve(
            &target(),
            Some(503),
            None,
            Some(CheckError::UnexpectedStatus {
                expected: 200,
                observed: 503,
            }),
            Duration::from_millis(12),
            Utc::now(),
        );

        assert!(!result.passed);
        assert_eq!(result.summary(), "Expected status 200, got 503");
        assert!(result.to_string().starts_with("[FAIL] https://example.test/"));
    }

    #[test]
    fn test_record_count_and_typed_body() {
        let target = target().with_body_schema(BodySchema::Posts);
        let result = CheckResult::resolve(
            &target,
            Some(200),
            Some(json!([{"id": 1, "title": "Hello"}, {"id": 2, "title": "World"}])),
            None,
            Duration::ZERO,
            Utc::now(),
        );

        assert!(result.passed);
        assert_eq!(result.record_count, Some(2));
        assert_eq!(result.summary(), "Found 2 posts");

        let posts: Vec<Post> = result.body_as().unwrap().unwrap();
        assert_eq!(posts[1].title, "World");
    }

    #[test]
    fn test_timeout_is_connection_class() {
        let error = CheckError::Timeout(Duration::from_secs(2));
        assert!(error.is_connection_class());
        assert!(error.to_string().contains("timeout"));
        assert!(!CheckError::Decode("eof".into()).is_connection_class());
    }

    #[test]
    fn test_combined_error_is_decode_class() {
        let error = CheckError::UnexpectedStatusAndDecode {
            expected: 200,
            observed: 503,
            decode: "expected value at line 1 column 1".into(),
        };
        assert!(error.is_decode_class());
        assert!(!error.is_connection_class());
        assert!(error.to_string().starts_with("Expected status 200, got 503; failed to parse"));
    }

    #[test]
    fn test_single_record_summary_is_singular() {
        let target = target().with_body_schema(BodySchema::Posts);
        let result = CheckResult::resolve(
            &target,
            Some(200),
            Some(json!([{"id": 1, "title": "Hello"}])),
            None,
            Duration::ZERO,
            Utc::now(),
        );
        assert_eq!(result.summary(), "Found 1 post");
    }
}
