//! Workflow and Task definitions
//!
//! The YAML document maps directly onto these types. A workflow is a flat
//! map of named tasks; each task is an ordered list of shell commands.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Worker pool size used when the document leaves `workers` unset or
/// non-positive.
pub const DEFAULT_WORKERS: usize = 10;

// ============================================================================
// Workflow
// ============================================================================

/// A complete workflow definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Workflow name; the `workflow:` key is accepted as an alias
    #[serde(alias = "workflow")]
    pub name: String,

    /// Run tasks under a bounded worker pool instead of in sorted order
    #[serde(default)]
    pub parallel: bool,

    /// Worker pool size; any value <= 0 falls back to [`DEFAULT_WORKERS`]
    #[serde(default)]
    pub workers: i64,

    /// Suppress command stdout/stderr for the whole run
    #[serde(default)]
    pub silent: bool,

    /// Directory holding the combined output file
    #[serde(rename = "output-dir", default)]
    pub output_dir: Option<String>,

    /// Combined output file name inside `output-dir`
    #[serde(rename = "output-file", default)]
    pub output_file: Option<String>,

    /// Tasks to execute, keyed by name; declaring a name twice is an error
    #[serde(alias = "steps", default, deserialize_with = "deserialize_tasks")]
    pub tasks: HashMap<String, Task>,

    /// Default variable bindings for `{{name}}` substitution
    #[serde(default)]
    pub vars: HashMap<String, String>,
}

impl Workflow {
    /// Worker pool size with the non-positive fallback applied.
    pub fn effective_workers(&self) -> usize {
        if self.workers <= 0 {
            DEFAULT_WORKERS
        } else {
            self.workers as usize
        }
    }

    /// Path of the combined output file. Requires both `output-dir` and
    /// `output-file`; either one alone leaves teeing off.
    pub fn output_path(&self) -> Option<PathBuf> {
        match (&self.output_dir, &self.output_file) {
            (Some(dir), Some(file)) => Some(Path::new(dir).join(file)),
            _ => None,
        }
    }

    /// Task names in lexicographic order. The map itself is unordered, so
    /// every deterministic walk goes through here.
    pub fn sorted_task_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tasks.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Collects the task map, rejecting repeated names. A plain `HashMap`
/// deserializer would keep the last entry and drop the rest silently.
fn deserialize_tasks<'de, D>(deserializer: D) -> Result<HashMap<String, Task>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct TaskMapVisitor;

    impl<'de> serde::de::Visitor<'de> for TaskMapVisitor {
        type Value = HashMap<String, Task>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of task names to tasks")
        }

        fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
        where
            M: serde::de::MapAccess<'de>,
        {
            let mut tasks = HashMap::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, task)) = map.next_entry::<String, Task>()? {
                if tasks.contains_key(&name) {
                    return Err(serde::de::Error::custom(format!(
                        "duplicate task name '{}'",
                        name
                    )));
                }
                tasks.insert(name, task);
            }
            Ok(tasks)
        }
    }

    deserializer.deserialize_map(TaskMapVisitor)
}

// ============================================================================
// Task
// ============================================================================

/// A named unit of work: ordered commands plus an optional silent override
#[derive(Debug, Clone, Default, Serialize)]
pub struct Task {
    /// Commands run strictly in order; the first failure aborts the rest
    pub commands: Vec<String>,

    /// Per-task silent override; `None` inherits the workflow flag
    pub silent: Option<bool>,
}

impl Task {
    /// Whether this task's process output is suppressed.
    pub fn effective_silent(&self, workflow_silent: bool) -> bool {
        self.silent.unwrap_or(workflow_silent)
    }
}

impl<'de> Deserialize<'de> for Task {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum CommandList {
            One(String),
            Many(Vec<String>),
        }

        impl CommandList {
            fn into_vec(self) -> Vec<String> {
                match self {
                    CommandList::One(command) => vec![command],
                    CommandList::Many(commands) => commands,
                }
            }
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum TaskForm {
            Bare(CommandList),
            Full {
                #[serde(alias = "command")]
                commands: CommandList,
                #[serde(default)]
                silent: Option<bool>,
            },
        }

        match TaskForm::deserialize(deserializer)? {
            TaskForm::Bare(list) => Ok(Task { commands: list.into_vec(), silent: None }),
            TaskForm::Full { commands, silent } => {
                Ok(Task { commands: commands.into_vec(), silent })
            }
        }
    }
}
