//! Scheduling strategies
//!
//! A run selects one strategy from the workflow's `parallel` flag.
//! Sequential walks the sorted task names one at a time and stops at the
//! first failure; bounded-parallel runs every task under a counting
//! semaphore and reports all failures at the end.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use super::error::EngineError;
use super::report::{RunReport, TaskReport};
use super::task::run_task;
use crate::workflow::loader::WorkflowLoader;
use crate::workflow::model::Workflow;
use crate::workflow::vars::merge_vars;

/// Everything one run carries: the parsed document, the merged variable
/// set for the command pass, and the run id.
pub struct RunContext {
    pub workflow: Workflow,
    pub vars: HashMap<String, String>,
    pub run_id: String,
}

impl RunContext {
    pub fn new(workflow: Workflow, overrides: &HashMap<String, String>) -> Self {
        let vars = merge_vars(overrides, &workflow.vars);
        Self {
            workflow,
            vars,
            run_id: Uuid::new_v4().to_string(),
        }
    }
}

/// A scheduling policy for one run
#[async_trait]
pub trait Strategy: Send + Sync {
    async fn run(&self, ctx: Arc<RunContext>) -> RunReport;
}

/// Strict order: sorted task names, one at a time, abort on first failure
pub struct Sequential;

#[async_trait]
impl Strategy for Sequential {
    async fn run(&self, ctx: Arc<RunContext>) -> RunReport {
        let started_at = Utc::now();
        let order = ctx.workflow.sorted_task_names();
        debug!("Task execution order: {:?}", order);

        let mut results: HashMap<String, TaskReport> = HashMap::new();
        let mut skipped: Vec<String> = Vec::new();

        for (position, name) in order.iter().enumerate() {
            let task = ctx.workflow.tasks.get(name).unwrap();
            let report = run_task(name, task, &ctx).await;
            let failed = !report.success;
            results.insert(name.clone(), report);

            if failed {
                error!("Exiting due to error in task: {}", name);
                skipped = order[position + 1..].to_vec();
                break;
            }
        }

        RunReport {
            success: results.values().all(|r| r.success),
            run_id: ctx.run_id.clone(),
            tasks: results,
            skipped,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Bounded worker pool: every task runs, failures are reported together
pub struct BoundedParallel;

#[async_trait]
impl Strategy for BoundedParallel {
    async fn run(&self, ctx: Arc<RunContext>) -> RunReport {
        let started_at = Utc::now();
        let workers = ctx.workflow.effective_workers();
        info!(
            "Running {} tasks with {} workers",
            ctx.workflow.tasks.len(),
            workers
        );

        let semaphore = Arc::new(Semaphore::new(workers));
        let results: Arc<Mutex<HashMap<String, TaskReport>>> =
            Arc::new(Mutex::new(HashMap::new()));

        let mut handles = Vec::new();
        for (name, task) in ctx.workflow.tasks.clone() {
            let sem = semaphore.clone();
            let results = results.clone();
            let ctx = ctx.clone();

            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire().await.unwrap();
                let report = run_task(&name, &task, &ctx).await;
                results.lock().await.insert(name, report);
            }));
        }

        // Join barrier: every spawned task finishes before the report.
        join_all(handles).await;

        let results = match Arc::try_unwrap(results) {
            Ok(mutex) => mutex.into_inner(),
            Err(arc) => arc.lock().await.clone(),
        };

        RunReport {
            success: results.values().all(|r| r.success),
            run_id: ctx.run_id.clone(),
            tasks: results,
            skipped: Vec::new(),
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Load a workflow file and run it. `overrides` feeds both the
/// document-level `<<name>>` pass and the per-command merged set.
#[instrument(skip(overrides))]
pub async fn run_file(
    path: &Path,
    overrides: &HashMap<String, String>,
) -> Result<RunReport, EngineError> {
    let workflow = WorkflowLoader::load_file(path, overrides)?;
    run_workflow(workflow, overrides).await
}

/// Run an already-parsed workflow under the strategy its `parallel`
/// flag selects.
#[instrument(skip(workflow, overrides), fields(workflow_name = %workflow.name))]
pub async fn run_workflow(
    workflow: Workflow,
    overrides: &HashMap<String, String>,
) -> Result<RunReport, EngineError> {
    if let Some(dir) = &workflow.output_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|error| EngineError::OutputDir {
                dir: dir.clone(),
                error,
            })?;
    }

    info!("Executing workflow: {}", workflow.name);

    let capture_dir = workflow
        .output_path()
        .and(workflow.output_dir.clone());

    let strategy: Box<dyn Strategy> = if workflow.parallel {
        Box::new(BoundedParallel)
    } else {
        Box::new(Sequential)
    };

    let ctx = Arc::new(RunContext::new(workflow, overrides));
    let report = strategy.run(ctx).await;

    if let Some(dir) = capture_dir {
        info!("Output saved in '{}'", dir);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    async fn run_yaml(yaml: &str) -> RunReport {
        let workflow: Workflow = serde_yaml::from_str(yaml).unwrap();
        run_workflow(workflow, &HashMap::new()).await.unwrap()
    }

    #[tokio::test]
    async fn test_sequential_runs_in_sorted_order() {
        let dir = tempdir().unwrap();
        let probe = dir.path().join("order.txt");

        let report = run_yaml(&format!(
            r#"
name: ordered
silent: true
tasks:
  charlie: echo charlie >> {probe}
  alpha: echo alpha >> {probe}
  bravo: echo bravo >> {probe}
"#,
            probe = probe.display()
        ))
        .await;

        assert!(report.success);
        assert!(report.skipped.is_empty());

        let contents = fs::read_to_string(&probe).unwrap();
        assert_eq!(contents, "alpha\nbravo\ncharlie\n");
    }

    #[tokio::test]
    async fn test_sequential_aborts_after_first_failure() {
        let dir = tempdir().unwrap();
        let probe = dir.path().join("order.txt");

        let report = run_yaml(&format!(
            r#"
name: abort
silent: true
tasks:
  a-first: echo a >> {probe}
  b-fails: exit 1
  c-never: echo c >> {probe}
"#,
            probe = probe.display()
        ))
        .await;

        assert!(!report.success);
        assert!(report.tasks["a-first"].success);
        assert!(!report.tasks["b-fails"].success);
        assert!(!report.tasks.contains_key("c-never"));
        assert_eq!(report.skipped, vec!["c-never"]);

        // The aborted task never touched the probe file.
        let contents = fs::read_to_string(&probe).unwrap();
        assert_eq!(contents, "a\n");
    }

    #[tokio::test]
    async fn test_parallel_runs_everything_despite_failures() {
        let dir = tempdir().unwrap();
        let probe = dir.path().join("ran.txt");

        let report = run_yaml(&format!(
            r#"
name: report-all
parallel: true
workers: 2
silent: true
tasks:
  one: echo one >> {probe}
  two: exit 2
  three: echo three >> {probe}
"#,
            probe = probe.display()
        ))
        .await;

        assert!(!report.success);
        assert!(report.skipped.is_empty());
        assert_eq!(report.tasks.len(), 3);
        assert!(report.tasks["one"].success);
        assert!(!report.tasks["two"].success);
        assert!(report.tasks["three"].success);

        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "two");
        assert!(failures[0].1.contains("exit status 2"));

        let contents = fs::read_to_string(&probe).unwrap();
        assert!(contents.contains("one"));
        assert!(contents.contains("three"));
    }

    #[tokio::test]
    async fn test_empty_workflow_succeeds() {
        let report = run_yaml("name: empty\ntasks: {}\n").await;
        assert!(report.success);
        assert!(report.tasks.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_output_dir_created_before_run() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("logs");

        let report = run_yaml(&format!(
            r#"
name: tee
silent: true
output-dir: {out}
output-file: run.log
tasks:
  say: echo captured
"#,
            out = out.display()
        ))
        .await;

        assert!(report.success);
        let contents = fs::read_to_string(out.join("run.log")).unwrap();
        assert!(contents.contains("captured"));
    }

    #[tokio::test]
    async fn test_unwritable_output_dir_is_fatal() {
        let workflow: Workflow = serde_yaml::from_str(
            r#"
name: bad-out
output-dir: /proc/definitely/not/writable
output-file: run.log
tasks:
  say: echo hi
"#,
        )
        .unwrap();

        let err = run_workflow(workflow, &HashMap::new()).await.unwrap_err();
        assert!(matches!(err, EngineError::OutputDir { .. }));
    }
}
