//! Workflow execution engine module
//!
//! This module contains:
//! - `scheduler` - scheduling strategies and the run entry points
//! - `task` - single-task execution (ordered commands, fail-fast)
//! - `process` - `sh -c` command execution and output routing
//! - `report` - run and task result types
//! - `error` - engine error types

pub mod error;
pub mod process;
pub mod report;
pub mod scheduler;
pub mod task;

pub use error::{EngineError, ProcessError};
pub use process::{run_command, OutputRouting};
pub use report::{RunReport, TaskReport};
pub use scheduler::{run_file, run_workflow, BoundedParallel, RunContext, Sequential, Strategy};
pub use task::run_task;
