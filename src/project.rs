//! Project model: layout, source sets and the configuration context.
//!
//! Source sets can keep appearing after the wiring has started (mobile
//! variants are declared late), so consumers subscribe to the container
//! with [`Project::all_source_sets`] instead of taking a snapshot.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::error::WiringResult;
use crate::host::{self, HostApi};
use crate::rules::QualityExtension;
use crate::task::{Task, TaskGraph, CHECK_TASK};
use crate::tools::Tool;

/// Layout flavour of a source set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceSetKind {
    /// Conventional single-language layout (`main`, `test`, ...).
    #[default]
    Jvm,
    /// Mobile build variant (`debug`, `release`, ...).
    Android,
}

/// A named group of sources and their compiled output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSet {
    pub name: String,
    #[serde(default)]
    pub kind: SourceSetKind,
    #[serde(default)]
    pub source_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub output_dirs: Vec<PathBuf>,
}

impl SourceSet {
    pub fn new(name: &str, kind: SourceSetKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            source_dirs: Vec::new(),
            output_dirs: Vec::new(),
        }
    }

    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dirs.push(dir.into());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dirs.push(dir.into());
        self
    }

    pub fn is_android(&self) -> bool {
        self.kind == SourceSetKind::Android
    }
}

/// Well-known directories of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub build_dir: PathBuf,
    pub report_dir: PathBuf,
    /// Where downloaded rule files are stored.
    pub config_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self::with_build_dir(&root, root.join("build"))
    }

    pub fn with_build_dir(root: &Path, build_dir: PathBuf) -> Self {
        Self {
            root: root.to_path_buf(),
            report_dir: build_dir.join("reports"),
            build_dir,
            config_dir: root.join("config"),
        }
    }

    /// Resolve a path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// State shared by every configurator during one configuration run.
pub struct ConfigContext {
    pub layout: ProjectLayout,
    pub extension: QualityExtension,
    pub tasks: TaskGraph,
    host: Box<dyn HostApi>,
    applied_plugins: BTreeSet<String>,
    tool_versions: BTreeMap<Tool, String>,
    warned_outdated: BTreeSet<Tool>,
}

impl ConfigContext {
    pub fn host(&self) -> &dyn HostApi {
        self.host.as_ref()
    }

    /// Mutable task registry alongside the host shim.
    pub fn tasks_and_host(&mut self) -> (&mut TaskGraph, &dyn HostApi) {
        (&mut self.tasks, self.host.as_ref())
    }

    /// Record a plugin as applied. Returns `false` if it already was.
    pub fn apply_plugin(&mut self, id: &str) -> bool {
        self.applied_plugins.insert(id.to_string())
    }

    pub fn applied_plugins(&self) -> impl Iterator<Item = &str> {
        self.applied_plugins.iter().map(String::as_str)
    }

    pub fn set_tool_version(&mut self, tool: Tool, version: &str) {
        self.tool_versions.insert(tool, version.to_string());
    }

    /// Version chosen for a tool during setup, if it has been set up.
    pub fn tool_version(&self, tool: Tool) -> Option<&str> {
        self.tool_versions.get(&tool).map(String::as_str)
    }

    /// Returns `true` the first time it is called for a tool.
    pub fn first_outdated_warning(&mut self, tool: Tool) -> bool {
        self.warned_outdated.insert(tool)
    }
}

/// Called for every source set, existing and future.
pub type SourceSetListener = Box<dyn FnMut(&mut ConfigContext, &SourceSet) -> WiringResult<()>>;

#[derive(Default)]
struct SourceSetContainer {
    items: Vec<SourceSet>,
    listeners: Vec<SourceSetListener>,
}

/// A project being configured.
pub struct Project {
    name: String,
    context: ConfigContext,
    source_sets: SourceSetContainer,
}

impl Project {
    /// Create a project for the given host version.
    ///
    /// Fails before anything is wired when the host is unsupported.
    pub fn new(
        name: &str,
        layout: ProjectLayout,
        host_version: &str,
        extension: QualityExtension,
    ) -> WiringResult<Self> {
        let host = host::select(host_version)?;
        tracing::debug!(project = name, host = host.label(), "selected host API");

        let mut tasks = TaskGraph::new();
        tasks.register(Task::lifecycle(CHECK_TASK, "Runs all checks."));

        Ok(Self {
            name: name.to_string(),
            context: ConfigContext {
                layout,
                extension,
                tasks,
                host,
                applied_plugins: BTreeSet::new(),
                tool_versions: BTreeMap::new(),
                warned_outdated: BTreeSet::new(),
            },
            source_sets: SourceSetContainer::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.context.layout
    }

    pub fn tasks(&self) -> &TaskGraph {
        &self.context.tasks
    }

    pub fn context(&self) -> &ConfigContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ConfigContext {
        &mut self.context
    }

    pub fn source_sets(&self) -> &[SourceSet] {
        &self.source_sets.items
    }

    /// Add a source set, or redefine one with the same name, and notify
    /// every listener.
    ///
    /// The container only records the source set once every listener has
    /// accepted it.
    pub fn add_source_set(&mut self, source_set: SourceSet) -> WiringResult<()> {
        for listener in self.source_sets.listeners.iter_mut() {
            listener(&mut self.context, &source_set)?;
        }

        let items = &mut self.source_sets.items;
        match items.iter_mut().find(|s| s.name == source_set.name) {
            Some(existing) => *existing = source_set,
            None => items.push(source_set),
        }
        Ok(())
    }

    /// Run `listener` for every current source set and keep it for the
    /// ones added later.
    pub fn all_source_sets(&mut self, mut listener: SourceSetListener) -> WiringResult<()> {
        for source_set in &self.source_sets.items {
            listener(&mut self.context, source_set)?;
        }
        self.source_sets.listeners.push(listener);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WiringError;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn project() -> Project {
        Project::new(
            "demo",
            ProjectLayout::new("/work/demo"),
            "7.4",
            QualityExtension::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_project_has_check_task() {
        let project = project();
        assert!(project.tasks().find(CHECK_TASK).is_some());
        assert_eq!(project.layout().report_dir, PathBuf::from("/work/demo/build/reports"));
        assert_eq!(project.layout().config_dir, PathBuf::from("/work/demo/config"));
    }

    #[test]
    fn test_unsupported_host_fails_early() {
        let result = Project::new(
            "demo",
            ProjectLayout::new("/work/demo"),
            "3.5",
            QualityExtension::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_listener_sees_existing_and_future_source_sets() {
        let mut project = project();
        project
            .add_source_set(SourceSet::new("main", SourceSetKind::Jvm))
            .unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        project
            .all_source_sets(Box::new(move |_, source_set| {
                sink.borrow_mut().push(source_set.name.clone());
                Ok(())
            }))
            .unwrap();
        project
            .add_source_set(SourceSet::new("debug", SourceSetKind::Android))
            .unwrap();

        assert_eq!(*seen.borrow(), vec!["main".to_string(), "debug".to_string()]);
    }

    #[test]
    fn test_redefined_source_set_replaces_entry() {
        let mut project = project();
        project
            .add_source_set(SourceSet::new("main", SourceSetKind::Jvm))
            .unwrap();
        project
            .add_source_set(SourceSet::new("main", SourceSetKind::Jvm).with_source_dir("src"))
            .unwrap();
        assert_eq!(project.source_sets().len(), 1);
        assert_eq!(project.source_sets()[0].source_dirs, vec![PathBuf::from("src")]);
    }

    #[test]
    fn test_rejected_source_set_is_not_recorded() {
        let mut project = project();
        project
            .all_source_sets(Box::new(|_, source_set| {
                if source_set.name == "broken" {
                    Err(WiringError::UnknownTask(source_set.name.clone()))
                } else {
                    Ok(())
                }
            }))
            .unwrap();
        project
            .add_source_set(SourceSet::new("main", SourceSetKind::Jvm))
            .unwrap();

        assert!(project
            .add_source_set(SourceSet::new("broken", SourceSetKind::Jvm))
            .is_err());
        let names: Vec<_> = project.source_sets().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["main"]);
    }

    #[test]
    fn test_layout_resolve() {
        let layout = ProjectLayout::new("/work/demo");
        assert_eq!(
            layout.resolve(Path::new("rules/style.xml")),
            PathBuf::from("/work/demo/rules/style.xml")
        );
        assert_eq!(layout.resolve(Path::new("/abs.xml")), PathBuf::from("/abs.xml"));
    }
}
