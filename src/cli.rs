//! Command-line interface for checkwire.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{Config, DEFAULT_CONFIG_NAMES};
use crate::download::DEFAULT_TIMEOUT;
use crate::exec::Executor;
use crate::report;
use crate::task::CHECK_TASK;
use crate::tools::Tool;
use crate::versions;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Wire quality-analysis tasks across a project's source sets.
///
/// Checkwire creates one checkstyle, findbugs and cpd task per source set,
/// downloads remote rule files and gathers everything under `check`.
#[derive(Parser)]
#[command(name = "checkwire")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the wired task graph
    Plan(PlanArgs),
    /// Download the remote rule files a task needs
    Fetch(FetchArgs),
    /// List supported tools and their current versions
    Tools,
}

/// Arguments for the plan command.
#[derive(Parser)]
pub struct PlanArgs {
    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the fetch command.
#[derive(Parser)]
pub struct FetchArgs {
    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Task whose downloads should run
    #[arg(short, long, default_value = CHECK_TASK)]
    pub task: String,

    /// Per-download timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Discover a configuration file in the current directory.
fn discover_config() -> anyhow::Result<PathBuf> {
    for name in DEFAULT_CONFIG_NAMES {
        let path = PathBuf::from(name);
        if path.exists() {
            return Ok(path);
        }
    }
    anyhow::bail!(
        "no configuration file found (looked for {})",
        DEFAULT_CONFIG_NAMES.join(", ")
    )
}

/// Load the configuration and wire the project, printing errors.
fn load_project(config: &Option<PathBuf>) -> Option<crate::Project> {
    let path = match config {
        Some(p) => p.clone(),
        None => match discover_config() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error: {}", e);
                return None;
            }
        },
    };

    let config = match Config::parse_file(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return None;
        }
    };

    match crate::wire(&config) {
        Ok(project) => Some(project),
        Err(e) => {
            eprintln!("Error: {}", e);
            None
        }
    }
}

/// Run the plan command.
pub fn run_plan(args: &PlanArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let Some(project) = load_project(&args.config) else {
        return Ok(EXIT_ERROR);
    };

    match args.format.as_str() {
        "json" => report::write_json(&project)?,
        _ => report::write_pretty(&project),
    }
    Ok(EXIT_SUCCESS)
}

/// Run the fetch command.
pub fn run_fetch(args: &FetchArgs) -> anyhow::Result<i32> {
    let Some(project) = load_project(&args.config) else {
        return Ok(EXIT_ERROR);
    };

    let tasks = project.tasks();
    let plan = match tasks.execution_plan(&args.task) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);
    let executor = Executor::new(tasks, timeout)?;

    let progress = ProgressBar::new(plan.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")?.progress_chars("=> "),
    );
    let result = executor.run_with(&args.task, |run| {
        progress.set_message(run.name.clone());
        progress.inc(1);
    })?;
    progress.finish_and_clear();

    report::write_execution(&result);

    if result.is_success() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the tools command.
pub fn run_tools() -> anyhow::Result<i32> {
    println!("Supported tools:");
    println!();
    for tool in Tool::ALL {
        println!("  {:<12} {}", tool.as_str(), versions::current_version(tool));
    }
    Ok(EXIT_SUCCESS)
}
