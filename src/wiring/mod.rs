//! Shared wiring machinery used by every analysis tool.
//!
//! ```text
//! rule reference ──classify──▶ Local ─────────────┐
//!                        └───▶ Remote ─▶ download ─┤
//!                                                  ▼
//!                    source set ──▶ analysis task (+ binder)
//!                                                  │
//!                                                  ▼
//!                                 aggregate ──▶ check
//! ```

mod aggregate;
mod builder;
mod fetch;

pub use aggregate::{attach, ensure_aggregate_task, gate_on_global_check};
pub use builder::{ensure_analysis_task, AnalysisRequest};
pub use fetch::{ensure_download_task, DownloadHandle};

use std::fs;
use std::path::Path;

use crate::error::{WiringError, WiringResult};
use crate::project::{ConfigContext, SourceSet};
use crate::rules::RuleLocation;
use crate::task::TaskId;
use crate::tools::AnalysisConfigurator;

/// Wire one source set for one tool: resolve the rule file, build the
/// analysis task and hang it under the tool's aggregate.
pub fn wire_source_set(
    ctx: &mut ConfigContext,
    configurator: &dyn AnalysisConfigurator,
    source_set: &SourceSet,
) -> WiringResult<TaskId> {
    let tool = configurator.tool();
    let rules = ctx.extension.rules_for(&source_set.name).tool(tool).clone();

    let (rule_config, fetch) = match rules.location() {
        RuleLocation::Remote(url) => {
            let download = ensure_download_task(
                &mut ctx.tasks,
                &ctx.layout,
                tool.as_str(),
                &source_set.name,
                &url,
            )?;
            (download.destination, Some(download.task))
        }
        RuleLocation::Local(path) => {
            let path = ctx.layout.resolve(&path);
            // a bad local path is left for the analysis tool to report
            if let Err(e) = ensure_parent_dir(&path) {
                tracing::warn!(%tool, source_set = %source_set.name, "{}", e);
            }
            (path, None)
        }
    };

    let request = AnalysisRequest {
        tool,
        source_set,
        rule_config,
        ignore_failures: rules.ignore_failures,
        fetch,
    };
    let task = ensure_analysis_task(ctx, request, |task, source_set, host| {
        configurator.bind_source_set(task, source_set, host)
    })?;

    let aggregate = ensure_aggregate_task(&mut ctx.tasks, tool)?;
    attach(&mut ctx.tasks, aggregate, task)?;
    Ok(task)
}

/// Create the directory a local rule file lives in. Safe to repeat.
///
/// Failures are not fatal to wiring; the caller only logs them.
fn ensure_parent_dir(path: &Path) -> WiringResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| WiringError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
