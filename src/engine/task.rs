//! Task execution
//!
//! A task is an ordered command list. Commands run one at a time; the
//! first failure marks the task failed and the rest of the list is not
//! attempted.

use tracing::{error, info, instrument};

use super::process::{run_command, OutputRouting};
use super::report::TaskReport;
use super::scheduler::RunContext;
use crate::workflow::model::Task;
use crate::workflow::vars::{substitute, TokenStyle};

/// Run one task's commands in order, stopping at the first failure.
///
/// Each command gets the `{{name}}` pass with the run's merged variable
/// set just before it starts.
#[instrument(skip(task, ctx))]
pub async fn run_task(name: &str, task: &Task, ctx: &RunContext) -> TaskReport {
    let routing = OutputRouting::new(
        task.effective_silent(ctx.workflow.silent),
        ctx.workflow.output_path(),
    );

    let mut commands_run = 0;

    for command in &task.commands {
        let command = substitute(command, &ctx.vars, TokenStyle::Command);
        info!("Executing task: {}: {}", name, command);
        commands_run += 1;

        if let Err(e) = run_command(&command, &routing).await {
            let message = format!("Failed to execute: {}", e);
            error!("{}: {}", name, message);
            return TaskReport {
                success: false,
                error: Some(message),
                commands_run,
            };
        }
    }

    info!("Task {} completed", name);
    TaskReport {
        success: true,
        error: None,
        commands_run,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::model::Workflow;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn context_for(yaml: &str) -> RunContext {
        let workflow: Workflow = serde_yaml::from_str(yaml).unwrap();
        RunContext::new(workflow, &HashMap::new())
    }

    #[tokio::test]
    async fn test_all_commands_run_in_order() {
        let dir = tempdir().unwrap();
        let probe = dir.path().join("probe.txt");
        let ctx = context_for(&format!(
            r#"
name: t
silent: true
tasks:
  steps:
    - echo one >> {probe}
    - echo two >> {probe}
vars: {{}}
"#,
            probe = probe.display()
        ));

        let report = run_task("steps", &ctx.workflow.tasks["steps"], &ctx).await;
        assert!(report.success);
        assert_eq!(report.commands_run, 2);

        let contents = std::fs::read_to_string(&probe).unwrap();
        assert_eq!(contents, "one\ntwo\n");
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_commands() {
        let dir = tempdir().unwrap();
        let probe = dir.path().join("probe.txt");
        let ctx = context_for(&format!(
            r#"
name: t
silent: true
tasks:
  steps:
    - echo before >> {probe}
    - exit 5
    - echo after >> {probe}
"#,
            probe = probe.display()
        ));

        let report = run_task("steps", &ctx.workflow.tasks["steps"], &ctx).await;
        assert!(!report.success);
        assert_eq!(report.commands_run, 2);
        assert_eq!(
            report.error.as_deref(),
            Some("Failed to execute: exit status 5")
        );

        let contents = std::fs::read_to_string(&probe).unwrap();
        assert_eq!(contents, "before\n");
    }

    #[tokio::test]
    async fn test_command_pass_uses_merged_vars() {
        let dir = tempdir().unwrap();
        let probe = dir.path().join("probe.txt");
        let workflow: Workflow = serde_yaml::from_str(&format!(
            r#"
name: t
silent: true
vars:
  WORD: default-word
  KEPT: kept-word
tasks:
  say: echo {{{{WORD}}}} {{{{KEPT}}}} >> {probe}
"#,
            probe = probe.display()
        ))
        .unwrap();

        let overrides = HashMap::from([("WORD".to_string(), "override-word".to_string())]);
        let ctx = RunContext::new(workflow, &overrides);

        let report = run_task("say", &ctx.workflow.tasks["say"], &ctx).await;
        assert!(report.success);

        let contents = std::fs::read_to_string(&probe).unwrap();
        assert_eq!(contents, "override-word kept-word\n");
    }

    #[tokio::test]
    async fn test_empty_task_succeeds() {
        let ctx = context_for("name: t\ntasks:\n  nothing: []\n");
        let report = run_task("nothing", &ctx.workflow.tasks["nothing"], &ctx).await;
        assert!(report.success);
        assert_eq!(report.commands_run, 0);
    }
}
