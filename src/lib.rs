//! Checkwire - quality-analysis task wiring.
//!
//! Checkwire wires style checking, static bug detection and duplication
//! detection across every source set of a project. For each
//! `(tool, source set)` pair it produces exactly one analysis task, bound
//! to a rule file that may be local or downloaded from a URL, and gathers
//! the tasks of each tool under an aggregate hanging off `check`.
//!
//! # Architecture
//!
//! - `rules`: rule-file references and the per-source-set extension
//! - `project`: project layout, observable source sets, configuration context
//! - `task`: task model and the name-indexed task graph
//! - `wiring`: download, per-source-set and aggregate task builders
//! - `tools`: the configurator trait and one implementation per tool
//! - `host`: compatibility shim over host API versions
//! - `exec`: runs download tasks of a wired graph
//! - `config`: YAML configuration schema
//! - `report`: output formatting (pretty, JSON)
//!
//! Wiring is idempotent: repeating it, or redefining a source set, finds
//! and reconfigures existing tasks instead of creating new ones.

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod exec;
pub mod host;
pub mod naming;
pub mod project;
pub mod report;
pub mod rules;
pub mod task;
pub mod tools;
pub mod versions;
pub mod wiring;

pub use config::{Config, ConfigError};
pub use error::{WiringError, WiringResult};
pub use exec::{ExecutionReport, Executor, TaskOutcome};
pub use project::{Project, ProjectLayout, SourceSet, SourceSetKind};
pub use rules::{QualityExtension, RuleLocation, RulesConfig};
pub use task::{AnalysisTask, Task, TaskAction, TaskGraph, TaskId, CHECK_TASK};
pub use tools::{configure, configure_all, AnalysisConfigurator, Tool};

/// Validate a configuration, create its project, wire every enabled tool
/// and add the declared source sets.
///
/// Tools subscribe before the source sets are added, the same way they see
/// source sets a host declares late.
pub fn wire(config: &Config) -> Result<Project, ConfigError> {
    config::validate(config)?;
    let mut project = config.create_project()?;
    configure_all(&mut project)?;
    for source_set in config.resolved_source_sets() {
        project.add_source_set(source_set)?;
    }
    Ok(project)
}
