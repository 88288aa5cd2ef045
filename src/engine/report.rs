//! Run result types

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Result of a single task
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub success: bool,

    /// Failure message; `None` exactly when the task succeeded
    pub error: Option<String>,

    /// Commands attempted, counting a failing one
    pub commands_run: usize,
}

/// Result of a whole run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub success: bool,
    pub run_id: String,
    pub tasks: HashMap<String, TaskReport>,

    /// Tasks never attempted after a sequential abort
    pub skipped: Vec<String>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Failed task names with their messages, sorted by name.
    pub fn failures(&self) -> Vec<(String, String)> {
        let mut failures: Vec<(String, String)> = self
            .tasks
            .iter()
            .filter(|(_, report)| !report.success)
            .map(|(name, report)| {
                let message = report.error.clone().unwrap_or_else(|| "failed".to_string());
                (name.clone(), message)
            })
            .collect();
        failures.sort();
        failures
    }

    /// Wall-clock duration of the run.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
