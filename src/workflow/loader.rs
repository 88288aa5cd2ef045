//! Workflow file loading
//!
//! Reads the document text, applies the `<<name>>` override pass, and
//! parses the result into a [`Workflow`].

use std::collections::HashMap;
use std::path::Path;

use super::model::Workflow;
use super::vars::{substitute, TokenStyle};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error in {file}: {error}")]
    Yaml {
        file: String,
        error: serde_yaml::Error,
    },

    #[error("invalid variable overrides: {0}")]
    Vars(#[from] serde_json::Error),
}

pub struct WorkflowLoader;

impl WorkflowLoader {
    /// Load a workflow file, expanding `<<name>>` tokens from `overrides`
    /// in the raw text before the YAML parse. Workflow `vars` defaults do
    /// not join this pass; they are unknown until the document is parsed.
    pub fn load_file(
        path: &Path,
        overrides: &HashMap<String, String>,
    ) -> Result<Workflow, LoadError> {
        let content = std::fs::read_to_string(path)?;
        let content = substitute(&content, overrides, TokenStyle::Document);
        serde_yaml::from_str(&content).map_err(|e| LoadError::Yaml {
            file: path.display().to_string(),
            error: e,
        })
    }

    /// Parse the CLI `--vars` value: a flat JSON object with string values.
    pub fn parse_var_overrides(json: &str) -> Result<HashMap<String, String>, LoadError> {
        Ok(serde_json::from_str(json)?)
    }
}
