//! Output formatting for wired task graphs and execution results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::Serialize;

use crate::exec::{ExecutionReport, TaskOutcome};
use crate::project::Project;
use crate::task::{Task, TaskAction};

/// JSON form of a wired project.
#[derive(Serialize)]
pub struct JsonPlan<'a> {
    pub version: &'static str,
    pub project: &'a str,
    pub host_api: &'static str,
    pub plugins: Vec<&'a str>,
    pub tasks: Vec<JsonTask<'a>>,
}

/// A task with the names of its direct dependencies.
#[derive(Serialize)]
pub struct JsonTask<'a> {
    #[serde(flatten)]
    pub task: &'a Task,
    pub depends_on: Vec<String>,
}

/// Build the JSON form of a project's task graph.
pub fn json_plan(project: &Project) -> JsonPlan<'_> {
    let graph = project.tasks();
    let tasks = graph
        .tasks()
        .into_iter()
        .map(|(_, task)| JsonTask {
            task,
            depends_on: graph.dependency_names(&task.name),
        })
        .collect();

    JsonPlan {
        version: env!("CARGO_PKG_VERSION"),
        project: project.name(),
        host_api: project.context().host().label(),
        plugins: project.context().applied_plugins().collect(),
        tasks,
    }
}

/// Write the task graph as JSON.
pub fn write_json(project: &Project) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&json_plan(project))?;
    println!("{}", json);
    Ok(())
}

/// Write the task graph in human-readable form.
pub fn write_pretty(project: &Project) {
    let graph = project.tasks();
    println!(
        "{} {} ({} host API)",
        "Project".bold(),
        project.name().cyan(),
        project.context().host().label()
    );
    println!();

    for (_, task) in graph.tasks() {
        println!("{} {}", kind_label(task), task.name.bold());
        match &task.action {
            TaskAction::Download { url, destination } => {
                println!("    {} -> {}", url.dimmed(), destination.display());
            }
            TaskAction::Analysis(analysis) => {
                println!(
                    "    rules: {}  version: {}  ignore failures: {}",
                    analysis.rule_config.display(),
                    analysis.tool_version,
                    analysis.ignore_failures
                );
                if let Some(xml) = &analysis.reports.xml.destination {
                    println!("    report: {}", xml.display());
                }
            }
            TaskAction::Lifecycle | TaskAction::Aggregate => {}
        }
        let deps = graph.dependency_names(&task.name);
        if !deps.is_empty() {
            println!("    depends on: {}", deps.join(", "));
        }
    }

    println!();
    println!("{} tasks, {} dependencies", graph.len(), graph.edge_count());
}

fn kind_label(task: &Task) -> ColoredString {
    let label = format!("[{:^9}]", task.kind());
    match task.action {
        TaskAction::Lifecycle => label.magenta(),
        TaskAction::Aggregate => label.blue(),
        TaskAction::Download { .. } => label.yellow(),
        TaskAction::Analysis(_) => label.green(),
    }
}

/// Write execution outcomes in human-readable form.
pub fn write_execution(report: &ExecutionReport) {
    for run in &report.runs {
        let status = match &run.outcome {
            TaskOutcome::Downloaded { bytes } => format!("downloaded {} bytes", bytes).green(),
            TaskOutcome::UpToDate => "up to date".dimmed(),
            TaskOutcome::Delegated => "delegated".dimmed(),
            TaskOutcome::Failed { error } => format!("FAILED: {}", error).red().bold(),
            TaskOutcome::Skipped { because } => format!("skipped ({} failed)", because).yellow(),
        };
        println!("{:<40} {}", run.name, status);
    }

    let failures = report.failures();
    if failures > 0 {
        println!();
        println!("{}", format!("{} task(s) failed", failures).red().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{ProjectLayout, SourceSet, SourceSetKind};
    use crate::rules::QualityExtension;
    use crate::tools::configure_all;

    #[test]
    fn test_json_plan_lists_dependencies() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut project = Project::new(
            "demo",
            ProjectLayout::new(temp.path()),
            "8.0",
            QualityExtension::default(),
        )
        .unwrap();
        configure_all(&mut project).unwrap();
        project
            .add_source_set(SourceSet::new("main", SourceSetKind::Jvm))
            .unwrap();

        let value = serde_json::to_value(json_plan(&project)).unwrap();
        assert_eq!(value["project"], "demo");
        assert_eq!(value["host_api"], "current");

        let tasks = value["tasks"].as_array().unwrap();
        let check = tasks.iter().find(|t| t["name"] == "check").unwrap();
        assert_eq!(
            check["depends_on"],
            serde_json::json!(["checkstyle", "cpd", "findbugs"])
        );
        let main = tasks.iter().find(|t| t["name"] == "cpdMain").unwrap();
        assert_eq!(main["action"]["kind"], "analysis");
        assert_eq!(main["action"]["tool"], "cpd");
    }
}
