//! Style checking.

use super::{classpath_bucket, exclude_generated, AnalysisConfigurator, Tool};
use crate::host::HostApi;
use crate::project::SourceSet;
use crate::task::AnalysisTask;

/// Wires checkstyle over the Java sources of each source set.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckstyleConfigurator;

impl AnalysisConfigurator for CheckstyleConfigurator {
    fn tool(&self) -> Tool {
        Tool::Checkstyle
    }

    fn bind_source_set(&self, task: &mut AnalysisTask, source_set: &SourceSet, host: &dyn HostApi) {
        task.sources = source_set.source_dirs.clone();
        task.includes.insert("**/*.java".to_string());
        exclude_generated(task, source_set);
        task.classes = source_set.output_dirs.clone();
        task.classpath = vec![classpath_bucket(source_set, host)];
    }
}
