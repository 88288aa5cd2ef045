//! # taskrelay
//!
//! A declarative YAML workflow runner for shell command pipelines: name
//! your tasks, list their commands, and run them strictly in order or
//! under a bounded worker pool.
//!
//! ## Features
//!
//! - **Declarative YAML workflows** - A flat map of named tasks, each an ordered command list
//! - **Two scheduling modes** - Sequential (sorted names, fail-fast) or bounded-parallel (run all, report all)
//! - **Placeholder substitution** - `<<name>>` over the document, `{{name}}` per command
//! - **Output teeing** - Duplicate every command's output into a combined log file
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let yaml = r#"
//! name: nightly
//! parallel: true
//! workers: 4
//! tasks:
//!   fetch: ./fetch.sh {{TARGET}}
//!   scan:
//!     - ./scan.sh {{TARGET}}
//!     - ./summarize.sh
//! vars:
//!   TARGET: example.org
//! "#;
//!
//!     let workflow: taskrelay::Workflow = serde_yaml::from_str(yaml)?;
//!     let report = taskrelay::run_workflow(workflow, &HashMap::new()).await?;
//!
//!     println!("Workflow completed: success={}", report.success);
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod workflow;

// Re-export main types
pub use engine::{
    run_command, run_file, run_task, run_workflow, BoundedParallel, EngineError, OutputRouting,
    ProcessError, RunContext, RunReport, Sequential, Strategy, TaskReport,
};
pub use workflow::{
    merge_vars, substitute, LoadError, Task, TokenStyle, Workflow, WorkflowLoader, DEFAULT_WORKERS,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::engine::{
        run_file, run_workflow, EngineError, RunContext, RunReport, Strategy, TaskReport,
    };
    pub use crate::workflow::{LoadError, Task, TokenStyle, Workflow, WorkflowLoader};
}
