// tests/common/mod.rs
use http_health_harness::config::HttpConfig;
use http_health_harness::{CheckTarget, HealthCheckRunner};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

pub fn runner() -> HealthCheckRunner {
    HealthCheckRunner::new(&HttpConfig::default()).expect("failed to build runner")
}

pub fn target(base: &str, path: &str, expected_status: u16) -> CheckTarget {
    let url = Url::parse(base)
        .and_then(|base| base.join(path))
        .expect("invalid test url");
    CheckTarget::new(url, expected_status)
}

/// Accepts connections and never writes a byte back.
pub struct SilentServer {
    pub url: String,
    handle: JoinHandle<()>,
}

impl SilentServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind silent server");
        let url = format!("http://{}/", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        Self { url, handle }
    }
}

impl Drop for SilentServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A URL on a port nothing listens on.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind port listener");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}
