use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use taskrelay::prelude::*;
use tracing_subscriber::EnvFilter;

const BANNER: &str = r#"
 _            _              _
| |_ __ _ ___| | __ _ __ ___| | __ _ _   _
| __/ _` / __| |/ /| '__/ _ \ |/ _` | | | |
| || (_| \__ \   < | | |  __/ | (_| | |_| |
 \__\__,_|___/_|\_\|_|  \___|_|\__,_|\__, |
                                     |___/
"#;

#[derive(Parser)]
#[command(name = "taskrelay")]
#[command(about = "Run declarative shell workflows", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workflow file
    Run {
        /// Path to the workflow YAML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Variable overrides as a JSON object, e.g. '{"HOST": "db1"}'
        #[arg(long, value_name = "JSON")]
        vars: Option<String>,

        /// Suppress the startup banner
        #[arg(short, long)]
        quiet: bool,
    },

    /// Validate a workflow file without running it
    Validate {
        /// Path to the workflow YAML file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List the tasks a workflow file defines
    List {
        /// Path to the workflow YAML file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "taskrelay=debug"
    } else {
        "taskrelay=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(success) => {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "taskrelay failed");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Run { file, vars, quiet } => run_workflow_file(file, vars, quiet).await,
        Commands::Validate { file } => validate(file).await,
        Commands::List { file } => list_tasks(file).await,
    }
}

async fn run_workflow_file(
    file: PathBuf,
    vars: Option<String>,
    quiet: bool,
) -> anyhow::Result<bool> {
    if !file.exists() {
        anyhow::bail!("Workflow file not found: {}", file.display());
    }

    if !quiet {
        println!("{}", BANNER);
    }

    let overrides = match vars.as_deref() {
        Some(json) => WorkflowLoader::parse_var_overrides(json)?,
        None => HashMap::new(),
    };

    println!("Running workflow: {}\n", file.display());

    let report = run_file(&file, &overrides).await?;

    print_run_report(&report);
    Ok(report.success)
}

async fn validate(file: PathBuf) -> anyhow::Result<bool> {
    if !file.exists() {
        anyhow::bail!("Workflow file not found: {}", file.display());
    }

    let workflow = WorkflowLoader::load_file(&file, &HashMap::new())?;
    println!(
        "✓ {} is valid ({} tasks)",
        file.display(),
        workflow.tasks.len()
    );
    Ok(true)
}

async fn list_tasks(file: PathBuf) -> anyhow::Result<bool> {
    if !file.exists() {
        anyhow::bail!("Workflow file not found: {}", file.display());
    }

    let workflow = WorkflowLoader::load_file(&file, &HashMap::new())?;

    if workflow.tasks.is_empty() {
        println!("No tasks found in: {}", file.display());
        return Ok(true);
    }

    println!("Tasks in {} ({}):\n", file.display(), workflow.name);

    for name in workflow.sorted_task_names() {
        let task = &workflow.tasks[&name];
        let count = task.commands.len();
        let plural = if count == 1 { "command" } else { "commands" };
        println!("  {} ({} {})", name, count, plural);
    }

    let mode = if workflow.parallel {
        format!("parallel ({} workers)", workflow.effective_workers())
    } else {
        "sequential".to_string()
    };
    println!("\nMode: {}", mode);

    Ok(true)
}

fn print_run_report(report: &RunReport) {
    println!("\n=== Workflow Result ===\n");
    println!("Success: {}", if report.success { "YES" } else { "NO" });
    println!("Run ID: {}\n", report.run_id);

    let mut names: Vec<_> = report.tasks.keys().collect();
    names.sort();

    for name in names {
        let task = &report.tasks[name];
        let status = if task.success { "✓" } else { "✗" };
        let plural = if task.commands_run == 1 {
            "command"
        } else {
            "commands"
        };
        println!(
            "{} Task: {} ({} {})",
            status, name, task.commands_run, plural
        );
        if let Some(err) = &task.error {
            println!("    Error: {}", err);
        }
    }

    if !report.skipped.is_empty() {
        println!("\nSkipped: {}", report.skipped.join(", "));
    }

    println!(
        "\nFinished in {:.2}s",
        report.duration().num_milliseconds() as f64 / 1000.0
    );
}
