// src/lib.rs
pub mod config;
pub mod harness;
pub mod health;
pub mod metrics;
pub mod schema;

pub use harness::{Harness, HarnessError, RunSummary};
pub use health::{CheckError, CheckResult, CheckTarget, Checker, HealthCheckRunner};
pub use schema::{BodySchema, Post};
