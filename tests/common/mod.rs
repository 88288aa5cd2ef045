use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

pub fn write_workflow(dir: &Path, filename: &str, content: &str) {
    fs::write(dir.join(filename), content).expect("Failed to write workflow file");
}

pub fn simple_workflow(name: &str) -> String {
    format!(
        r#"
name: {}
silent: true
tasks:
  count:
    - echo one
    - echo two
  greet: echo hello
"#,
        name
    )
}

pub fn failing_workflow(name: &str) -> String {
    format!(
        r#"
name: {}
silent: true
tasks:
  break: exit 1
  never: echo unreachable
"#,
        name
    )
}

pub fn parallel_workflow(name: &str, workers: i64) -> String {
    format!(
        r#"
name: {}
parallel: true
workers: {}
silent: true
tasks:
  a: echo a
  b: echo b
  c: echo c
"#,
        name, workers
    )
}
