//! Static bug detection over compiled classes.

use super::{classpath_bucket, exclude_generated, AnalysisConfigurator, Tool};
use crate::host::HostApi;
use crate::project::SourceSet;
use crate::task::AnalysisTask;

/// Classes generated by the mobile build for every variant.
const GENERATED_CLASSES: &[&str] = &[
    "**/R.class",
    "**/R$*.class",
    "**/BuildConfig.class",
    "**/Manifest.class",
    "**/Manifest$*.class",
];

/// Wires findbugs over the compiled output of each source set.
#[derive(Debug, Clone, Copy, Default)]
pub struct FindbugsConfigurator;

impl AnalysisConfigurator for FindbugsConfigurator {
    fn tool(&self) -> Tool {
        Tool::Findbugs
    }

    fn bind_source_set(&self, task: &mut AnalysisTask, source_set: &SourceSet, host: &dyn HostApi) {
        task.classes = source_set.output_dirs.clone();
        task.sources = source_set.source_dirs.clone();
        task.classpath = vec![classpath_bucket(source_set, host)];
        exclude_generated(task, source_set);
        if source_set.is_android() {
            task.excludes
                .extend(GENERATED_CLASSES.iter().map(|p| p.to_string()));
        }
        task.option("effort", "max");
        task.option("reportLevel", "medium");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::CurrentHost;
    use crate::project::SourceSetKind;
    use std::path::PathBuf;

    #[test]
    fn test_android_variant_excludes_generated_classes() {
        let debug = SourceSet::new("debug", SourceSetKind::Android)
            .with_source_dir("src/main/java")
            .with_output_dir("build/intermediates/javac/debug/classes");
        let mut task = AnalysisTask::new(Tool::Findbugs, "debug");
        FindbugsConfigurator.bind_source_set(&mut task, &debug, &CurrentHost);

        assert_eq!(
            task.classes,
            vec![PathBuf::from("build/intermediates/javac/debug/classes")]
        );
        assert_eq!(task.classpath, vec!["debugCompileClasspath".to_string()]);
        assert!(task.excludes.contains("**/R$*.class"));
        assert!(task.excludes.contains("**/BuildConfig.class"));
        assert!(task.excludes.contains("**/gen/**"));
        assert_eq!(task.options.get("effort").map(String::as_str), Some("max"));
    }

    #[test]
    fn test_jvm_source_set_has_no_generated_excludes() {
        let main = SourceSet::new("main", SourceSetKind::Jvm);
        let mut task = AnalysisTask::new(Tool::Findbugs, "main");
        FindbugsConfigurator.bind_source_set(&mut task, &main, &CurrentHost);
        assert!(task.excludes.is_empty());
        assert_eq!(task.classpath, vec!["compileClasspath".to_string()]);
    }
}
