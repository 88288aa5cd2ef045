//! Workflow types and definitions
//!
//! This module contains everything for defining and parsing workflows:
//! - `model` - Workflow and Task document types
//! - `vars` - placeholder substitution (`<<name>>` and `{{name}}`)
//! - `loader` - load workflow files with the document-level override pass

pub mod loader;
pub mod model;
pub mod vars;

// Re-export all public types for convenience
pub use loader::{LoadError, WorkflowLoader};
pub use model::{Task, Workflow, DEFAULT_WORKERS};
pub use vars::{merge_vars, substitute, TokenStyle};
