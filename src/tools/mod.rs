//! Analysis tools and their configurators.
//!
//! Every tool runs through the same pipeline:
//!
//! 1. **Setup**: apply the tool plugin and pick the tool version.
//! 2. **Enumerate**: subscribe to the project's source sets.
//! 3. **Wire**: for each source set, resolve rules and build the task
//!    (see [`crate::wiring::wire_source_set`]).
//! 4. **Finalize**: gate the tool's aggregate on `check`.
//!
//! A tool only contributes its binder: source roots, exclusions and
//! classpath for a given source set.
//!
//! # Adding a New Tool
//!
//! Add a variant to [`Tool`], implement [`AnalysisConfigurator`] in a new
//! module, register it in [`Tool::configurator`] and add its current
//! version to `versions.rs`.

mod checkstyle;
mod cpd;
mod findbugs;

pub use checkstyle::CheckstyleConfigurator;
pub use cpd::CpdConfigurator;
pub use findbugs::FindbugsConfigurator;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::WiringResult;
use crate::host::HostApi;
use crate::project::{ConfigContext, Project, SourceSet};
use crate::task::AnalysisTask;
use crate::versions;
use crate::wiring::{ensure_aggregate_task, gate_on_global_check, wire_source_set};

/// Patterns excluded from every tool on mobile variants.
const GENERATED_SOURCES: &[&str] = &["**/generated/**", "**/gen/**", "**/build/**"];

/// The supported analysis tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Style checking.
    Checkstyle,
    /// Static bug detection.
    Findbugs,
    /// Copy-paste (duplication) detection.
    Cpd,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Checkstyle, Tool::Findbugs, Tool::Cpd];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Checkstyle => "checkstyle",
            Tool::Findbugs => "findbugs",
            Tool::Cpd => "cpd",
        }
    }

    /// The configurator wiring this tool.
    pub fn configurator(self) -> Arc<dyn AnalysisConfigurator> {
        match self {
            Tool::Checkstyle => Arc::new(CheckstyleConfigurator),
            Tool::Findbugs => Arc::new(FindbugsConfigurator),
            Tool::Cpd => Arc::new(CpdConfigurator),
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "checkstyle" => Ok(Tool::Checkstyle),
            "findbugs" => Ok(Tool::Findbugs),
            "cpd" => Ok(Tool::Cpd),
            _ => Err(format!("unknown tool: {}", s)),
        }
    }
}

/// Tool-specific part of the wiring.
pub trait AnalysisConfigurator: Send + Sync {
    fn tool(&self) -> Tool;

    /// Identifier of the host plugin providing the tool's task type.
    fn plugin_id(&self) -> &'static str {
        self.tool().as_str()
    }

    /// Apply the plugin and choose the tool version.
    ///
    /// Warns once if the configured version is older than the known-current
    /// one; never fails.
    fn setup(&self, ctx: &mut ConfigContext) {
        let tool = self.tool();
        if ctx.apply_plugin(self.plugin_id()) {
            tracing::debug!(plugin = self.plugin_id(), "applied plugin");
        }

        let version = ctx
            .extension
            .settings(tool)
            .version
            .unwrap_or_else(|| versions::current_version(tool).to_string());
        if versions::is_outdated(tool, &version) && ctx.first_outdated_warning(tool) {
            tracing::warn!(
                "{} {} is outdated, the current version is {}",
                tool,
                version,
                versions::current_version(tool)
            );
        }
        ctx.set_tool_version(tool, &version);
    }

    /// Set source roots, exclusions and classpath of `task` for `source_set`.
    ///
    /// Must not touch the task's name, rule file or reports.
    fn bind_source_set(&self, task: &mut AnalysisTask, source_set: &SourceSet, host: &dyn HostApi);
}

/// Run the whole pipeline of one tool against a project.
///
/// Disabled tools wire nothing. Source sets added to the project later are
/// wired as they appear.
pub fn configure(
    project: &mut Project,
    configurator: Arc<dyn AnalysisConfigurator>,
) -> WiringResult<()> {
    let tool = configurator.tool();
    if !project.context().extension.is_enabled(tool) {
        tracing::debug!(%tool, "tool disabled, skipping");
        return Ok(());
    }

    configurator.setup(project.context_mut());

    let wiring = Arc::clone(&configurator);
    project.all_source_sets(Box::new(move |ctx, source_set| {
        wire_source_set(ctx, wiring.as_ref(), source_set).map(|_| ())
    }))?;

    let tasks = &mut project.context_mut().tasks;
    let aggregate = ensure_aggregate_task(tasks, tool)?;
    gate_on_global_check(tasks, aggregate)
}

/// Configure every known tool.
pub fn configure_all(project: &mut Project) -> WiringResult<()> {
    for tool in Tool::ALL {
        configure(project, tool.configurator())?;
    }
    Ok(())
}

/// Dependency bucket of a source set, by layout.
fn classpath_bucket(source_set: &SourceSet, host: &dyn HostApi) -> String {
    if source_set.is_android() {
        host.variant_classpath(&source_set.name)
    } else {
        host.compile_classpath(source_set)
    }
}

/// Exclude generated code on mobile variants.
fn exclude_generated(task: &mut AnalysisTask, source_set: &SourceSet) {
    if source_set.is_android() {
        task.excludes
            .extend(GENERATED_SOURCES.iter().map(|p| p.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::CurrentHost;
    use crate::project::SourceSetKind;

    #[test]
    fn test_tool_from_str() {
        assert_eq!("checkstyle".parse::<Tool>(), Ok(Tool::Checkstyle));
        assert_eq!("CPD".parse::<Tool>(), Ok(Tool::Cpd));
        assert!("pmd".parse::<Tool>().is_err());
    }

    #[test]
    fn test_configurator_matches_tool() {
        for tool in Tool::ALL {
            assert_eq!(tool.configurator().tool(), tool);
        }
    }

    #[test]
    fn test_generated_excluded_only_on_android() {
        let mut task = AnalysisTask::new(Tool::Cpd, "main");
        exclude_generated(&mut task, &SourceSet::new("main", SourceSetKind::Jvm));
        assert!(task.excludes.is_empty());

        exclude_generated(&mut task, &SourceSet::new("debug", SourceSetKind::Android));
        assert!(task.excludes.contains("**/generated/**"));
    }

    #[test]
    fn test_classpath_bucket_by_layout() {
        let jvm = SourceSet::new("test", SourceSetKind::Jvm);
        let android = SourceSet::new("debug", SourceSetKind::Android);
        assert_eq!(classpath_bucket(&jvm, &CurrentHost), "testCompileClasspath");
        assert_eq!(classpath_bucket(&android, &CurrentHost), "debugCompileClasspath");
    }
}
