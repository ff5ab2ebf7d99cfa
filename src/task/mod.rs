//! Task model and the per-project task registry.

mod graph;

pub use graph::{TaskGraph, TaskId};

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::tools::Tool;

/// Name of the project-wide verification task.
pub const CHECK_TASK: &str = "check";

/// Group shown for every task created by the wiring engine.
pub const VERIFICATION_GROUP: &str = "verification";

/// The `(tool, source set)` pair a generated task belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TaskOwner {
    pub tool: String,
    pub source_set: String,
}

impl TaskOwner {
    pub fn new(tool: impl Into<String>, source_set: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            source_set: source_set.into(),
        }
    }
}

impl std::fmt::Display for TaskOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.tool, self.source_set)
    }
}

/// A node in the task graph.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub name: String,
    pub group: String,
    pub description: String,
    /// Key used to tell reuse apart from a name collision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<TaskOwner>,
    pub action: TaskAction,
}

impl Task {
    /// The project-wide verification gate.
    pub fn lifecycle(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            group: VERIFICATION_GROUP.to_string(),
            description: description.to_string(),
            owner: None,
            action: TaskAction::Lifecycle,
        }
    }

    pub fn analysis(&self) -> Option<&AnalysisTask> {
        match &self.action {
            TaskAction::Analysis(analysis) => Some(analysis),
            _ => None,
        }
    }

    pub fn analysis_mut(&mut self) -> Option<&mut AnalysisTask> {
        match &mut self.action {
            TaskAction::Analysis(analysis) => Some(analysis),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self.action {
            TaskAction::Lifecycle => "lifecycle",
            TaskAction::Aggregate => "aggregate",
            TaskAction::Download { .. } => "download",
            TaskAction::Analysis(_) => "analysis",
        }
    }
}

/// What a task does when executed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TaskAction {
    /// Built-in verification gate; does nothing by itself.
    Lifecycle,
    /// Runs nothing, only depends on a family of tasks.
    Aggregate,
    /// Fetches `url` and writes the bytes verbatim to `destination`.
    Download { url: String, destination: PathBuf },
    /// Runs an external analysis tool.
    Analysis(AnalysisTask),
}

/// One report variant of an analysis task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
}

/// Reports produced by an analysis task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reports {
    pub xml: Report,
    pub html: Report,
    /// Host property the destinations are written to.
    pub property: String,
}

/// Inputs and settings of an analysis tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisTask {
    pub tool: Tool,
    pub source_set: String,
    pub tool_version: String,
    pub rule_config: PathBuf,
    pub ignore_failures: bool,
    pub show_violations: bool,
    pub sources: Vec<PathBuf>,
    pub includes: BTreeSet<String>,
    pub excludes: BTreeSet<String>,
    pub classes: Vec<PathBuf>,
    pub classpath: Vec<String>,
    pub options: BTreeMap<String, String>,
    pub reports: Reports,
}

impl AnalysisTask {
    pub fn new(tool: Tool, source_set: &str) -> Self {
        Self {
            tool,
            source_set: source_set.to_string(),
            tool_version: String::new(),
            rule_config: PathBuf::new(),
            ignore_failures: true,
            show_violations: false,
            sources: Vec::new(),
            includes: BTreeSet::new(),
            excludes: BTreeSet::new(),
            classes: Vec::new(),
            classpath: Vec::new(),
            options: BTreeMap::new(),
            reports: Reports::default(),
        }
    }

    /// Set an option value, replacing any previous one.
    pub fn option(&mut self, key: &str, value: impl Into<String>) {
        self.options.insert(key.to_string(), value.into());
    }
}
