//! Engine error types

use crate::workflow::LoadError;

/// Errors from running a single shell command
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to start: {0}")]
    Spawn(std::io::Error),

    #[error("exit status {0}")]
    ExitStatus(i32),

    #[error("terminated by signal")]
    Signal,

    #[error("{0} pipe unavailable")]
    Pipe(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that abort a run before any task starts
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("failed to create output directory '{dir}': {error}")]
    OutputDir { dir: String, error: std::io::Error },
}
