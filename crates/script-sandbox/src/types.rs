use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use brick_types::ModelIssue;

/// Limits applied to every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Deadline used by callers that do not pick one.
    pub default_deadline_ms: u64,
    pub max_source_bytes: usize,
    /// Hard cap on interpreter operations. `None` leaves only the deadline.
    pub max_operations: Option<u64>,
    pub max_call_levels: usize,
    pub max_expr_depth: usize,
    pub max_string_size: usize,
    pub max_array_size: usize,
    pub max_map_size: usize,
    /// The deadline is checked every this many operations.
    pub progress_check_interval: u64,
    /// `print`/`debug` lines kept per run; the rest are only traced.
    pub max_log_lines: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            default_deadline_ms: 5_000,
            max_source_bytes: 256 * 1024,
            max_operations: None,
            max_call_levels: 64,
            max_expr_depth: 64,
            max_string_size: 4 * 1024 * 1024,
            max_array_size: 100_000,
            max_map_size: 10_000,
            progress_check_interval: 256,
            max_log_lines: 500,
        }
    }
}

impl SandboxConfig {
    /// Tighter limits for scripts from an untrusted generator.
    pub fn strict() -> Self {
        Self {
            default_deadline_ms: 1_000,
            max_source_bytes: 64 * 1024,
            max_operations: Some(5_000_000),
            max_call_levels: 32,
            max_expr_depth: 32,
            max_string_size: 1024 * 1024,
            max_array_size: 10_000,
            max_map_size: 1_000,
            progress_check_interval: 64,
            max_log_lines: 100,
        }
    }
}

/// How a successful run produced its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// `save()` was called; the last save wins.
    Saved,
    /// The script's final value was a non-empty document string.
    Returned,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionOutput {
    pub run_id: Uuid,
    pub document: String,
    pub completion: Completion,
    pub placements: usize,
    /// Problems found in the saved builder. Empty for returned strings.
    pub issues: Vec<ModelIssue>,
    pub log: Vec<String>,
    pub elapsed: Duration,
}

/// Counters kept across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SandboxStats {
    pub runs_started: u64,
    pub completed: u64,
    pub rejected: u64,
    pub timed_out: u64,
    pub errored: u64,
}

/// Receives documents handed over by a script's `save()`.
pub trait DocumentSink {
    fn save(&mut self, document: &str);
}

impl<F> DocumentSink for F
where
    F: FnMut(&str),
{
    fn save(&mut self, document: &str) {
        self(document)
    }
}

impl DocumentSink for Vec<String> {
    fn save(&mut self, document: &str) {
        self.push(document.to_string());
    }
}
