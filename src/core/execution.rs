//! core::execution
//!
//! Per-example run results.
//!
//! Every example record owns a fresh [`ExecutionResultCell`]. The run
//! collaborator updates it after executing the example; nothing else in a
//! record changes after construction.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of running one example.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Passed,
    Failed,
    Pending,
}

impl ExecutionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionStatus::Passed => "passed",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Pending => "pending",
        }
    }

    /// Parse a status name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "passed" => Some(ExecutionStatus::Passed),
            "failed" => Some(ExecutionStatus::Failed),
            "pending" => Some(ExecutionStatus::Pending),
            _ => None,
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record of one example's run.
///
/// Fields are `None` until assigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: Option<ExecutionStatus>,
    /// Failure message of the example, if it failed.
    pub exception: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Seconds between `started_at` and `finished_at`.
    pub run_time: Option<f64>,
    pub pending_message: Option<String>,
    /// Failure raised by a pending example (the expected outcome).
    pub pending_exception: Option<String>,
    /// Whether a pending example unexpectedly passed.
    pub pending_fixed: Option<bool>,
}

impl ExecutionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the final status and finish time, computing the run time.
    pub fn record_finished(&mut self, status: ExecutionStatus, finished_at: DateTime<Utc>) {
        self.status = Some(status);
        self.calculate_run_time(finished_at);
    }

    /// Fill in missing timing, as for examples that never ran their body.
    pub fn ensure_timing_set(&mut self, now: DateTime<Utc>) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if self.finished_at.is_none() {
            self.calculate_run_time(now);
        }
    }

    fn calculate_run_time(&mut self, finished_at: DateTime<Utc>) {
        self.finished_at = Some(finished_at);
        self.run_time = self.started_at.map(|started| {
            let elapsed = finished_at.signed_duration_since(started);
            elapsed.num_microseconds().map_or_else(
                || elapsed.num_milliseconds() as f64 / 1_000.0,
                |us| us as f64 / 1_000_000.0,
            )
        });
    }

    pub fn is_pending_fixed(&self) -> bool {
        self.pending_fixed.unwrap_or(false)
    }

    /// Pending without ever having run (no pending failure recorded).
    pub fn example_skipped(&self) -> bool {
        self.status == Some(ExecutionStatus::Pending) && self.pending_exception.is_none()
    }
}

/// Shared, lockable execution result owned by one example.
#[derive(Clone, Default)]
pub struct ExecutionResultCell(Arc<RwLock<ExecutionResult>>);

impl ExecutionResultCell {
    /// A fresh, empty result.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ExecutionResult> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ExecutionResult> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> ExecutionResult {
        self.read().clone()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ExecutionResultCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_read() {
            Ok(result) => f.debug_tuple("ExecutionResultCell").field(&*result).finish(),
            Err(_) => f.write_str("ExecutionResultCell(<locked>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn record_finished_computes_run_time() {
        let mut result = ExecutionResult::new();
        result.started_at = Some(at(100));
        result.record_finished(ExecutionStatus::Passed, at(102));
        assert_eq!(result.status, Some(ExecutionStatus::Passed));
        assert_eq!(result.finished_at, Some(at(102)));
        assert_eq!(result.run_time, Some(2.0));
    }

    #[test]
    fn run_time_absent_without_start() {
        let mut result = ExecutionResult::new();
        result.record_finished(ExecutionStatus::Failed, at(5));
        assert_eq!(result.run_time, None);
    }

    #[test]
    fn ensure_timing_set_fills_gaps_only() {
        let mut result = ExecutionResult::new();
        result.ensure_timing_set(at(10));
        assert_eq!(result.started_at, Some(at(10)));
        assert_eq!(result.run_time, Some(0.0));

        result.ensure_timing_set(at(50));
        assert_eq!(result.finished_at, Some(at(10)));
    }

    #[test]
    fn skipped_means_pending_without_exception() {
        let mut result = ExecutionResult::new();
        result.status = Some(ExecutionStatus::Pending);
        assert!(result.example_skipped());
        result.pending_exception = Some("expected failure".into());
        assert!(!result.example_skipped());
    }

    #[test]
    fn cells_are_independent() {
        let a = ExecutionResultCell::new();
        let b = ExecutionResultCell::new();
        a.write().status = Some(ExecutionStatus::Passed);
        assert_eq!(b.snapshot().status, None);
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn status_names_round_trip() {
        for status in [
            ExecutionStatus::Passed,
            ExecutionStatus::Failed,
            ExecutionStatus::Pending,
        ] {
            assert_eq!(ExecutionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ExecutionStatus::parse("skipped"), None);
    }
}
