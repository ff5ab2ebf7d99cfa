//! Download tasks for remote rule files.

use std::path::PathBuf;

use crate::error::{WiringError, WiringResult};
use crate::naming;
use crate::project::ProjectLayout;
use crate::task::{Task, TaskAction, TaskGraph, TaskId, TaskOwner, VERIFICATION_GROUP};

/// A download task and the file it will produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadHandle {
    pub task: TaskId,
    /// Does not exist until the task has run; consumers must depend on
    /// `task` before reading it.
    pub destination: PathBuf,
}

/// Find or register the task downloading `url` for `(tool, source set)`.
///
/// Each source set gets its own destination file even when several share
/// one URL. Nothing touches the network here; fetch errors are reported
/// when the task runs.
pub fn ensure_download_task(
    tasks: &mut TaskGraph,
    layout: &ProjectLayout,
    tool: &str,
    source_set: &str,
    url: &str,
) -> WiringResult<DownloadHandle> {
    let name = naming::download_task_name(tool, source_set);
    let owner = TaskOwner::new(tool, source_set);
    let destination = naming::downloaded_config_path(&layout.config_dir, tool, source_set);

    let (task, created) = tasks.find_or_register(&name, &owner, || Task {
        name: String::new(),
        group: VERIFICATION_GROUP.to_string(),
        description: format!("Downloads the {} rules for source set '{}'.", tool, source_set),
        owner: None,
        action: TaskAction::Download {
            url: url.to_string(),
            destination: destination.clone(),
        },
    })?;

    match &tasks.get(task).action {
        TaskAction::Download { destination, .. } => {
            if created {
                tracing::debug!(task = %name, url, "registered download task");
            }
            Ok(DownloadHandle {
                task,
                destination: destination.clone(),
            })
        }
        _ => Err(WiringError::NameCollision {
            name,
            existing: tasks.get(task).kind().to_string(),
            requested: "download task".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ProjectLayout {
        ProjectLayout::new("/work/app")
    }

    #[test]
    fn test_registers_named_task_with_destination() {
        let mut tasks = TaskGraph::new();
        let handle = ensure_download_task(
            &mut tasks,
            &layout(),
            "style",
            "test",
            "https://example.com/style.xml",
        )
        .unwrap();

        let task = tasks.get(handle.task);
        assert_eq!(task.name, "downloadStyleXmlTest");
        assert_eq!(
            handle.destination,
            PathBuf::from("/work/app/config/style/style-test.xml")
        );
        assert!(!handle.destination.exists());
    }

    #[test]
    fn test_reuses_existing_task() {
        let mut tasks = TaskGraph::new();
        let url = "https://example.com/style.xml";
        let first = ensure_download_task(&mut tasks, &layout(), "style", "main", url).unwrap();
        let second = ensure_download_task(&mut tasks, &layout(), "style", "main", url).unwrap();
        assert_eq!(first, second);
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_same_url_distinct_destinations() {
        let mut tasks = TaskGraph::new();
        let url = "https://example.com/shared.xml";
        let a = ensure_download_task(&mut tasks, &layout(), "findbugs", "a", url).unwrap();
        let b = ensure_download_task(&mut tasks, &layout(), "findbugs", "b", url).unwrap();
        assert_ne!(a.task, b.task);
        assert_ne!(a.destination, b.destination);
    }
}
