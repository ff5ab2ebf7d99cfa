//! Per-tool aggregate tasks and the global verification gate.

use crate::error::{WiringError, WiringResult};
use crate::naming;
use crate::task::{Task, TaskAction, TaskGraph, TaskId, CHECK_TASK, VERIFICATION_GROUP};
use crate::tools::Tool;

/// Find or create the task running every analysis task of `tool`.
pub fn ensure_aggregate_task(tasks: &mut TaskGraph, tool: Tool) -> WiringResult<TaskId> {
    let name = naming::aggregate_task_name(tool.as_str());
    if let Some(id) = tasks.find(&name) {
        let existing = tasks.get(id);
        return match existing.action {
            TaskAction::Aggregate => Ok(id),
            _ => Err(WiringError::NameCollision {
                name,
                existing: format!("{} task", existing.kind()),
                requested: format!("aggregate of {}", tool),
            }),
        };
    }

    Ok(tasks.register(Task {
        name,
        group: VERIFICATION_GROUP.to_string(),
        description: format!("Runs {} analysis for all source sets.", tool),
        owner: None,
        action: TaskAction::Aggregate,
    }))
}

/// Make `aggregate` depend on `task`. Attaching twice keeps one edge.
pub fn attach(tasks: &mut TaskGraph, aggregate: TaskId, task: TaskId) -> WiringResult<()> {
    tasks.depends_on(aggregate, task)?;
    Ok(())
}

/// Make the global verification task depend on `aggregate`.
pub fn gate_on_global_check(tasks: &mut TaskGraph, aggregate: TaskId) -> WiringResult<()> {
    let check = tasks
        .find(CHECK_TASK)
        .ok_or_else(|| WiringError::UnknownTask(CHECK_TASK.to_string()))?;
    tasks.depends_on(check, aggregate)?;
    Ok(())
}
