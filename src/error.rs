//! Error types raised while wiring analysis tasks.
//!
//! Only configuration-time failures live here. Network and file-system
//! failures of download tasks surface at execution time as [`FetchError`].
//!
//! [`FetchError`]: crate::download::FetchError

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort project configuration.
#[derive(Error, Debug)]
pub enum WiringError {
    #[error("host version {found} is not supported (minimum is {minimum})")]
    UnsupportedHost { found: String, minimum: String },
    #[error("invalid version string {0:?}")]
    InvalidVersion(String),
    #[error("task name {name:?} is already owned by {existing}, cannot reuse it for {requested}")]
    NameCollision {
        name: String,
        existing: String,
        requested: String,
    },
    #[error("task {0:?} does not exist")]
    UnknownTask(String),
    #[error("task {0:?} is not an analysis task")]
    NotAnalysisTask(String),
    #[error("making {dependent:?} depend on {dependency:?} would create a cycle")]
    Cycle {
        dependent: String,
        dependency: String,
    },
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias used throughout the wiring engine.
pub type WiringResult<T> = Result<T, WiringError>;
