// src/health/checker.rs
use super::result::{CheckError, CheckResult};
use super::target::CheckTarget;
use crate::config::HttpConfig;
use crate::schema::{BodySchema, Post};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error as _;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

/// Anything that can turn a target into a verdict.
#[async_trait]
pub trait Checker: Send + Sync {
    async fn check(&self, target: &CheckTarget) -> CheckResult;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
pub struct HealthCheckRunner {
    client: Client,
    default_timeout: Duration,
}

impl HealthCheckRunner {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self::with_client(client, config.timeout()))
    }

    pub fn with_client(client: Client, default_timeout: Duration) -> Self {
        Self {
            client,
            default_timeout,
        }
    }

    fn timeout_for(&self, target: &CheckTarget) -> Duration {
        target.timeout.unwrap_or(self.default_timeout)
    }

    /// One GET against `target.url`, comparing only the status code.
    pub async fn check_status(&self, target: &CheckTarget) -> CheckResult {
        let start = Instant::now();
        let checked_at = Utc::now();

        let exchange = self.exchange(target, false).await;
        let error = match exchange.outcome {
            Ok(_) => status_error(target, exchange.status),
            Err(e) => Some(e),
        };

        CheckResult::resolve(
            target,
            exchange.status,
            None,
            error,
            start.elapsed(),
            checked_at,
        )
    }

    /// Status check plus decoding the body into `T`.
    ///
    /// The body is read and decoded whatever the status, so a wrong status
    /// and a malformed body are both reported. The decoded value is kept as
    /// JSON on the result; array length becomes `record_count`.
    pub async fn check_json_body<T>(&self, target: &CheckTarget) -> CheckResult
    where
        T: DeserializeOwned + Serialize,
    {
        let start = Instant::now();
        let checked_at = Utc::now();

        let exchange = self.exchange(target, true).await;
        let (decoded, error) = match exchange.outcome {
            Err(e) => (None, Some(e)),
            Ok(body) => {
                let decoded = decode_body::<T>(&body.unwrap_or_default());
                match (status_error(target, exchange.status), decoded) {
                    (status, Ok(value)) => (Some(value), status),
                    (None, Err(decode)) => (None, Some(CheckError::Decode(decode))),
                    (Some(status), Err(decode)) => (None, Some(with_decode(status, decode))),
                }
            }
        };

        let result = CheckResult::resolve(
            target,
            exchange.status,
            decoded,
            error,
            start.elapsed(),
            checked_at,
        );

        if let Some(count) = result.record_count {
            debug!("Decoded {} records from {}", count, target.url);
        }

        result
    }

    /// Performs the request. The response is dropped before returning, on
    /// every path, so its connection goes back to the client pool.
    async fn exchange(&self, target: &CheckTarget, read_body: bool) -> Exchange {
        let limit = self.timeout_for(target);
        let mut status = None;

        info!("Starting health check for: {}", target.url);

        let request = async {
            let response = self
                .client
                .get(target.url.clone())
                .timeout(limit)
                .send()
                .await
                .map_err(|e| classify(e, limit))?;

            let code = response.status().as_u16();
            status = Some(code);
            info!("Received HTTP status: {}", code);

            if !read_body {
                return Ok::<_, CheckError>(None);
            }

            let body = response.bytes().await.map_err(|e| classify(e, limit))?;
            debug!("Read {} body bytes from {}", body.len(), target.url);
            Ok::<_, CheckError>(Some(body.to_vec()))
        };

        let outcome = match timeout(limit, request).await {
            Ok(outcome) => outcome,
            Err(_) => Err(CheckError::Timeout(limit)),
        };

        Exchange { status, outcome }
    }
}

#[async_trait]
impl Checker for HealthCheckRunner {
    async fn check(&self, target: &CheckTarget) -> CheckResult {
        match target.expected_body_schema {
            None => self.check_status(target).await,
            Some(BodySchema::Posts) => self.check_json_body::<Vec<Post>>(target).await,
            Some(BodySchema::Json) => self.check_json_body::<serde_json::Value>(target).await,
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

struct Exchange {
    status: Option<u16>,
    outcome: Result<Option<Vec<u8>>, CheckError>,
}

fn status_error(target: &CheckTarget, observed: Option<u16>) -> Option<CheckError> {
    match observed {
        Some(code) if code != target.expected_status => Some(CheckError::UnexpectedStatus {
            expected: target.expected_status,
            observed: code,
        }),
        _ => None,
    }
}

fn with_decode(status: CheckError, decode: String) -> CheckError {
    match status {
        CheckError::UnexpectedStatus { expected, observed } => {
            CheckError::UnexpectedStatusAndDecode {
                expected,
                observed,
                decode,
            }
        }
        other => other,
    }
}

fn decode_body<T>(bytes: &[u8]) -> Result<serde_json::Value, String>
where
    T: DeserializeOwned + Serialize,
{
    let decoded: T = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
    serde_json::to_value(&decoded).map_err(|e| e.to_string())
}

fn classify(err: reqwest::Error, limit: Duration) -> CheckError {
    if err.is_timeout() {
        return CheckError::Timeout(limit);
    }

    // reqwest's top-level message hides the cause (DNS, refused, TLS)
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    CheckError::Connection(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use url::Url;

    fn target(expected: u16) -> CheckTarget {
        CheckTarget::new(Url::parse("http://example.test/").unwrap(), expected)
    }

    #[test]
    fn test_decode_posts() {
        let value = decode_body::<Vec<Post>>(br#"[{"id":1,"title":"Hello"}]"#).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_decode_malformed_json() {
        let err = decode_body::<Vec<Post>>(b"<html>oops</html>").unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn test_decode_failure_joins_status_mismatch() {
        let status = status_error(&target(200), Some(503)).unwrap();
        let joined = with_decode(status, "expected value".into());
        assert_eq!(
            joined,
            CheckError::UnexpectedStatusAndDecode {
                expected: 200,
                observed: 503,
                decode: "expected value".into(),
            }
        );
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        assert!(decode_body::<serde_json::Value>(&[0x22, 0xff, 0x22]).is_err());
    }

    #[test]
    fn test_no_status_means_no_status_error() {
        assert_eq!(status_error(&target(200), None), None);
    }

    proptest! {
        #[test]
        fn test_status_mismatch_always_fails(expected in 100u16..600, observed in 100u16..600) {
            let error = status_error(&target(expected), Some(observed));
            if expected == observed {
                prop_assert!(error.is_none());
            } else {
                prop_assert_eq!(
                    error,
                    Some(CheckError::UnexpectedStatus { expected, observed })
                );
            }
        }
    }
}
