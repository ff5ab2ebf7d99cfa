//! Executes the download part of a wired task graph.
//!
//! Analysis tools are external, so analysis tasks are only reported as
//! delegated. A failed task skips the tasks that need it and nothing else.

use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

use crate::download::Fetcher;
use crate::task::{TaskAction, TaskGraph, TaskId};

/// What happened to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Downloaded { bytes: u64 },
    /// Lifecycle and aggregate tasks have no action of their own.
    UpToDate,
    /// Left to the external analysis tool.
    Delegated,
    Failed { error: String },
    Skipped { because: String },
}

impl TaskOutcome {
    fn blocks_dependents(&self) -> bool {
        matches!(self, TaskOutcome::Failed { .. } | TaskOutcome::Skipped { .. })
    }
}

/// Outcome of one task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRun {
    pub name: String,
    pub outcome: TaskOutcome,
}

/// Outcomes of every task in an execution plan, in execution order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionReport {
    pub runs: Vec<TaskRun>,
}

impl ExecutionReport {
    pub fn outcome(&self, name: &str) -> Option<&TaskOutcome> {
        self.runs.iter().find(|r| r.name == name).map(|r| &r.outcome)
    }

    pub fn failures(&self) -> usize {
        self.runs
            .iter()
            .filter(|r| matches!(r.outcome, TaskOutcome::Failed { .. }))
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.runs.iter().all(|r| !r.outcome.blocks_dependents())
    }
}

/// Runs tasks of a graph in dependency order.
pub struct Executor<'a> {
    tasks: &'a TaskGraph,
    fetcher: Fetcher,
    runtime: tokio::runtime::Runtime,
}

impl<'a> Executor<'a> {
    pub fn new(tasks: &'a TaskGraph, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            tasks,
            fetcher: Fetcher::new(timeout)?,
            runtime: tokio::runtime::Runtime::new()?,
        })
    }

    /// Run `target` and everything it needs.
    pub fn run(&self, target: &str) -> anyhow::Result<ExecutionReport> {
        self.run_with(target, |_| {})
    }

    /// Like [`Executor::run`], calling `on_task` after each task.
    pub fn run_with<F>(&self, target: &str, mut on_task: F) -> anyhow::Result<ExecutionReport>
    where
        F: FnMut(&TaskRun),
    {
        let plan = self.tasks.execution_plan(target)?;
        let mut blocked: HashSet<TaskId> = HashSet::new();
        let mut report = ExecutionReport::default();

        for id in plan {
            let task = self.tasks.get(id);
            let blocker = self
                .tasks
                .dependencies(id)
                .into_iter()
                .find(|dep| blocked.contains(dep));

            let outcome = match blocker {
                Some(dep) => TaskOutcome::Skipped {
                    because: self.tasks.get(dep).name.clone(),
                },
                None => self.execute(&task.action),
            };

            if outcome.blocks_dependents() {
                blocked.insert(id);
            }
            let run = TaskRun {
                name: task.name.clone(),
                outcome,
            };
            on_task(&run);
            report.runs.push(run);
        }

        Ok(report)
    }

    fn execute(&self, action: &TaskAction) -> TaskOutcome {
        match action {
            TaskAction::Lifecycle | TaskAction::Aggregate => TaskOutcome::UpToDate,
            TaskAction::Analysis(_) => TaskOutcome::Delegated,
            TaskAction::Download { url, destination } => {
                tracing::info!(%url, destination = %destination.display(), "downloading rules");
                match self.runtime.block_on(self.fetcher.fetch_to(url, destination)) {
                    Ok(bytes) => TaskOutcome::Downloaded { bytes },
                    Err(e) => {
                        tracing::error!(%url, "download failed: {}", e);
                        TaskOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            }
        }
    }
}
