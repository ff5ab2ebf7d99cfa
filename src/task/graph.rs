//! Name-indexed task graph.
//!
//! Edges point from a dependency to the task that needs it, so a topological
//! sort of the graph is an execution order. The graph only ever grows: tasks
//! and edges are added, never removed.

use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Reversed};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

use super::{Task, TaskOwner};
use crate::error::{WiringError, WiringResult};

/// Handle to a task inside a [`TaskGraph`].
pub type TaskId = NodeIndex;

/// Registry of every task of one project configuration run.
#[derive(Debug, Default)]
pub struct TaskGraph {
    graph: DiGraph<Task, ()>,
    by_name: HashMap<String, NodeIndex>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn find(&self, name: &str) -> Option<TaskId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: TaskId) -> &Task {
        &self.graph[id]
    }

    pub fn get_mut(&mut self, id: TaskId) -> &mut Task {
        &mut self.graph[id]
    }

    /// Look up a task by name.
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.find(name).map(|id| &self.graph[id])
    }

    /// Add a task whose name is not taken yet.
    ///
    /// Returns the existing task instead when the name is taken; callers that
    /// care about ownership go through [`TaskGraph::find_or_register`].
    pub fn register(&mut self, task: Task) -> TaskId {
        if let Some(id) = self.find(&task.name) {
            return id;
        }
        let name = task.name.clone();
        let id = self.graph.add_node(task);
        self.by_name.insert(name, id);
        id
    }

    /// Find the task called `name` owned by `owner`, or register the one
    /// built by `make`.
    ///
    /// The boolean is `true` when the task was created by this call. A task
    /// with that name but a different owner is a collision.
    pub fn find_or_register<F>(
        &mut self,
        name: &str,
        owner: &TaskOwner,
        make: F,
    ) -> WiringResult<(TaskId, bool)>
    where
        F: FnOnce() -> Task,
    {
        if let Some(id) = self.find(name) {
            let existing = &self.graph[id];
            if existing.owner.as_ref() != Some(owner) {
                return Err(WiringError::NameCollision {
                    name: name.to_string(),
                    existing: existing
                        .owner
                        .as_ref()
                        .map(|o| o.to_string())
                        .unwrap_or_else(|| format!("{} task", existing.kind())),
                    requested: owner.to_string(),
                });
            }
            return Ok((id, false));
        }

        let mut task = make();
        task.name = name.to_string();
        task.owner = Some(owner.clone());
        Ok((self.register(task), true))
    }

    /// Make `dependent` depend on `dependency`.
    ///
    /// Edges form a set, so repeating a call is a no-op; the return value
    /// tells whether a new edge was added. An edge that would close a cycle
    /// is rejected.
    pub fn depends_on(&mut self, dependent: TaskId, dependency: TaskId) -> WiringResult<bool> {
        if self.graph.find_edge(dependency, dependent).is_some() {
            return Ok(false);
        }
        if dependent == dependency
            || algo::has_path_connecting(&self.graph, dependent, dependency, None)
        {
            return Err(WiringError::Cycle {
                dependent: self.graph[dependent].name.clone(),
                dependency: self.graph[dependency].name.clone(),
            });
        }
        self.graph.update_edge(dependency, dependent, ());
        Ok(true)
    }

    /// Direct dependencies of a task, sorted by name.
    pub fn dependencies(&self, id: TaskId) -> Vec<TaskId> {
        self.neighbors_sorted(id, Direction::Incoming)
    }

    /// Tasks that directly depend on `id`, sorted by name.
    pub fn dependents(&self, id: TaskId) -> Vec<TaskId> {
        self.neighbors_sorted(id, Direction::Outgoing)
    }

    /// Names of the direct dependencies of the task called `name`.
    pub fn dependency_names(&self, name: &str) -> Vec<String> {
        self.find(name)
            .map(|id| {
                self.dependencies(id)
                    .into_iter()
                    .map(|dep| self.graph[dep].name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_dependency(&self, dependent: &str, dependency: &str) -> bool {
        match (self.find(dependent), self.find(dependency)) {
            (Some(a), Some(b)) => self.graph.find_edge(b, a).is_some(),
            _ => false,
        }
    }

    /// All tasks sorted by name.
    pub fn tasks(&self) -> Vec<(TaskId, &Task)> {
        let mut tasks: Vec<_> = self
            .graph
            .node_indices()
            .map(|id| (id, &self.graph[id]))
            .collect();
        tasks.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        tasks
    }

    /// `target` and everything it transitively needs, in execution order.
    pub fn execution_plan(&self, target: &str) -> WiringResult<Vec<TaskId>> {
        let start = self
            .find(target)
            .ok_or_else(|| WiringError::UnknownTask(target.to_string()))?;

        let reversed = Reversed(&self.graph);
        let mut needed = HashSet::new();
        let mut bfs = Bfs::new(reversed, start);
        while let Some(id) = bfs.next(reversed) {
            needed.insert(id);
        }

        let order = algo::toposort(&self.graph, None).map_err(|cycle| {
            let name = self.graph[cycle.node_id()].name.clone();
            WiringError::Cycle {
                dependent: name.clone(),
                dependency: name,
            }
        })?;

        Ok(order.into_iter().filter(|id| needed.contains(id)).collect())
    }

    fn neighbors_sorted(&self, id: TaskId, direction: Direction) -> Vec<TaskId> {
        let mut ids: Vec<_> = self.graph.neighbors_directed(id, direction).collect();
        ids.sort_by(|a, b| self.graph[*a].name.cmp(&self.graph[*b].name));
        ids
    }
}
