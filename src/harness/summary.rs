// src/harness/summary.rs
use crate::health::CheckResult;
use uuid::Uuid;

#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub results: Vec<CheckResult>,
}

impl RunSummary {
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.passed_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    /// Process exit code: 0 when every check passed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}
