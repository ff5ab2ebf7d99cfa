//! Duplication detection.

use super::{exclude_generated, AnalysisConfigurator, Tool};
use crate::host::HostApi;
use crate::project::SourceSet;
use crate::task::AnalysisTask;

/// Smallest duplicated token run that is reported.
const MINIMUM_TOKEN_COUNT: u32 = 50;

/// Wires copy-paste detection over the Java sources of each source set.
///
/// Works on sources only, so no classpath is bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpdConfigurator;

impl AnalysisConfigurator for CpdConfigurator {
    fn tool(&self) -> Tool {
        Tool::Cpd
    }

    fn plugin_id(&self) -> &'static str {
        "pmd"
    }

    fn bind_source_set(&self, task: &mut AnalysisTask, source_set: &SourceSet, _host: &dyn HostApi) {
        task.sources = source_set.source_dirs.clone();
        task.includes.insert("**/*.java".to_string());
        exclude_generated(task, source_set);
        task.option("language", "java");
        task.option("minimumTokenCount", MINIMUM_TOKEN_COUNT.to_string());
    }
}
