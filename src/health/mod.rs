// src/health/mod.rs
mod checker;
mod result;
mod target;

pub use checker::{Checker, HealthCheckRunner};
pub use result::{CheckError, CheckResult};
pub use target::CheckTarget;
