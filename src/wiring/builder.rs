//! Per-source-set analysis tasks.

use std::path::PathBuf;

use crate::error::{WiringError, WiringResult};
use crate::host::HostApi;
use crate::naming;
use crate::project::{ConfigContext, SourceSet};
use crate::task::{AnalysisTask, Task, TaskAction, TaskId, TaskOwner, VERIFICATION_GROUP};
use crate::tools::Tool;

/// Everything the builder needs besides the tool-specific binder.
#[derive(Debug, Clone)]
pub struct AnalysisRequest<'a> {
    pub tool: Tool,
    pub source_set: &'a SourceSet,
    /// Local path of the rule file, possibly not downloaded yet.
    pub rule_config: PathBuf,
    pub ignore_failures: bool,
    /// Download task producing `rule_config`, for remote rules.
    pub fetch: Option<TaskId>,
}

/// Find or create the analysis task for `(tool, source set)` and
/// (re)configure it.
///
/// An existing task is reconfigured in place so that source sets redefined
/// after the first pass keep a single task. The binder sets source roots,
/// exclusions and classpath; it runs after the builder has cleared those
/// inputs, so stale values from a previous pass never leak through.
pub fn ensure_analysis_task<B>(
    ctx: &mut ConfigContext,
    request: AnalysisRequest<'_>,
    binder: B,
) -> WiringResult<TaskId>
where
    B: FnOnce(&mut AnalysisTask, &SourceSet, &dyn HostApi),
{
    let tool = request.tool;
    let source_set = request.source_set;
    let name = naming::analysis_task_name(tool.as_str(), &source_set.name);
    let owner = TaskOwner::new(tool.as_str(), &source_set.name);
    let tool_version = ctx.tool_version(tool).unwrap_or_default().to_string();
    let report_dir = ctx.layout.report_dir.clone();

    let (tasks, host) = ctx.tasks_and_host();
    let (id, created) = tasks.find_or_register(&name, &owner, || Task {
        name: String::new(),
        group: VERIFICATION_GROUP.to_string(),
        description: format!(
            "Runs {} analysis for source set '{}'.",
            tool, source_set.name
        ),
        owner: None,
        action: TaskAction::Analysis(AnalysisTask::new(tool, &source_set.name)),
    })?;

    let task = tasks
        .get_mut(id)
        .analysis_mut()
        .ok_or_else(|| WiringError::NotAnalysisTask(name.clone()))?;

    task.tool_version = tool_version;
    task.rule_config = request.rule_config;
    task.ignore_failures = request.ignore_failures;
    task.show_violations = false;

    task.sources.clear();
    task.includes.clear();
    task.excludes.clear();
    task.classes.clear();
    task.classpath.clear();
    binder(task, source_set, host);

    task.reports.property = host.report_property().to_string();
    task.reports.xml.enabled = true;
    task.reports.xml.destination = Some(naming::xml_report_path(
        &report_dir,
        tool.as_str(),
        &source_set.name,
    ));
    task.reports.html.enabled = false;
    task.reports.html.destination = None;

    if let Some(fetch) = request.fetch {
        tasks.depends_on(id, fetch)?;
    }

    tracing::debug!(
        task = %name,
        created,
        remote = request.fetch.is_some(),
        "configured analysis task"
    );
    Ok(id)
}
