//! Configuration file schema for checkwire.
//!
//! The file describes a project (root, host version, source sets), the
//! project-wide settings of each tool and per-source-set rule overrides.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::WiringError;
use crate::host;
use crate::project::{Project, ProjectLayout, SourceSet};
use crate::rules::{is_remote, QualityExtension, ToolRulesOverride, ToolSettings};
use crate::tools::Tool;

/// Configuration file names looked up in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["checkwire.yaml", ".checkwire.yaml"];

/// Errors reading or validating a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error(transparent)]
    Wiring(#[from] WiringError),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub project: ProjectConfig,
    #[serde(default)]
    pub tools: BTreeMap<Tool, ToolSettings>,
    /// Per-source-set rule overrides, keyed by source-set name.
    #[serde(default)]
    pub source_sets: BTreeMap<String, BTreeMap<Tool, ToolRulesOverride>>,
}

/// The project being wired.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectConfig {
    pub name: String,
    /// Project root, relative to the configuration file (default: its directory)
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Build directory, relative to the root (default: "build")
    #[serde(default)]
    pub build_dir: Option<PathBuf>,
    pub host_version: String,
    #[serde(default)]
    pub source_sets: Vec<SourceSet>,
}

impl Config {
    /// Parse a configuration from a YAML file.
    ///
    /// A relative project root is resolved against the file's directory.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse_str(&content)?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let root = match &config.project.root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => base.join(root),
            None => base.to_path_buf(),
        };
        config.project.root = Some(root);
        Ok(config)
    }

    pub fn parse_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Project root (current directory when unset).
    pub fn root(&self) -> PathBuf {
        self.project
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn layout(&self) -> ProjectLayout {
        let root = self.root();
        let build_dir = self
            .project
            .build_dir
            .as_ref()
            .map(|dir| root.join(dir))
            .unwrap_or_else(|| root.join("build"));
        ProjectLayout::with_build_dir(&root, build_dir)
    }

    /// Create the project and its extension, without wiring any tool and
    /// without adding source sets yet.
    pub fn create_project(&self) -> Result<Project, ConfigError> {
        let extension = QualityExtension::new(self.tools.clone(), self.source_sets.clone());
        let project = Project::new(
            &self.project.name,
            self.layout(),
            &self.project.host_version,
            extension,
        )?;
        Ok(project)
    }

    /// Declared source sets with directories resolved against the root.
    pub fn resolved_source_sets(&self) -> Vec<SourceSet> {
        let layout = self.layout();
        self.project
            .source_sets
            .iter()
            .map(|source_set| SourceSet {
                source_dirs: source_set
                    .source_dirs
                    .iter()
                    .map(|d| layout.resolve(d))
                    .collect(),
                output_dirs: source_set
                    .output_dirs
                    .iter()
                    .map(|d| layout.resolve(d))
                    .collect(),
                ..source_set.clone()
            })
            .collect()
    }
}

/// Validate a configuration for correctness.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.project.name.trim().is_empty() {
        return Err(ConfigError::Invalid("project name is empty".into()));
    }

    host::parse_lenient(&config.project.host_version)?;

    let mut seen = HashSet::new();
    for source_set in &config.project.source_sets {
        if source_set.name.trim().is_empty() {
            return Err(ConfigError::Invalid("source set with empty name".into()));
        }
        if !source_set.name.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Invalid(format!(
                "source set {:?} needs at least one letter or digit",
                source_set.name
            )));
        }
        if !seen.insert(source_set.name.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "duplicate source set {:?}",
                source_set.name
            )));
        }
    }

    for (tool, settings) in &config.tools {
        if let Some(version) = &settings.version {
            host::parse_lenient(version).map_err(|_| {
                ConfigError::Invalid(format!("invalid {} version {:?}", tool, version))
            })?;
        }
        if let Some(reference) = &settings.config {
            validate_reference(*tool, reference).map_err(ConfigError::Invalid)?;
        }
    }

    for (name, tools) in &config.source_sets {
        for (tool, rules) in tools {
            if let Some(reference) = &rules.config {
                validate_reference(*tool, reference)
                    .map_err(|e| ConfigError::Invalid(format!("source set {:?}: {}", name, e)))?;
            }
        }
    }

    Ok(())
}

/// Remote references must be well-formed URLs with a host.
fn validate_reference(tool: Tool, reference: &str) -> Result<(), String> {
    if !is_remote(reference) {
        return Ok(());
    }
    match reqwest::Url::parse(reference) {
        Ok(url) if url.host_str().is_some() => Ok(()),
        _ => Err(format!("invalid {} rules URL {:?}", tool, reference)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::SourceSetKind;

    const SAMPLE: &str = r#"
project:
  name: app
  root: /work/app
  host_version: "7.4"
  source_sets:
    - name: main
      source_dirs: [src/main/java]
      output_dirs: [build/classes/java/main]
    - name: debug
      kind: android
tools:
  checkstyle:
    version: "10.12.5"
  cpd:
    enabled: false
source_sets:
  main:
    checkstyle:
      config: rules/style.xml
      ignore_failures: false
"#;

    #[test]
    fn test_parse_config() {
        let config = Config::parse_str(SAMPLE).unwrap();
        assert_eq!(config.project.name, "app");
        assert_eq!(config.project.source_sets.len(), 2);
        assert_eq!(config.project.source_sets[0].kind, SourceSetKind::Jvm);
        assert_eq!(config.project.source_sets[1].kind, SourceSetKind::Android);
        assert!(!config.tools[&Tool::Cpd].enabled);
        assert!(config.tools[&Tool::Checkstyle].ignore_failures);
        assert_eq!(
            config.source_sets["main"][&Tool::Checkstyle].config.as_deref(),
            Some("rules/style.xml")
        );
        validate(&config).unwrap();
    }

    #[test]
    fn test_resolved_source_sets() {
        let config = Config::parse_str(SAMPLE).unwrap();
        let source_sets = config.resolved_source_sets();
        assert_eq!(
            source_sets[0].source_dirs,
            vec![PathBuf::from("/work/app/src/main/java")]
        );
        assert_eq!(
            config.layout().report_dir,
            PathBuf::from("/work/app/build/reports")
        );
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut config = Config::parse_str(SAMPLE).unwrap();
        let dup = config.project.source_sets[0].clone();
        config.project.source_sets.push(dup);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_names_without_word_characters() {
        for name in ["-", "_", "--"] {
            let mut config = Config::parse_str(SAMPLE).unwrap();
            config.project.source_sets[0].name = name.into();
            let err = validate(&config).unwrap_err();
            assert!(err.to_string().contains("letter or digit"), "{}", err);
        }

        let mut config = Config::parse_str(SAMPLE).unwrap();
        config.project.source_sets[0].name = "integration-test".into();
        validate(&config).unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_versions_and_urls() {
        let mut config = Config::parse_str(SAMPLE).unwrap();
        config.project.host_version = "latest".into();
        assert!(validate(&config).is_err());

        let mut config = Config::parse_str(SAMPLE).unwrap();
        config
            .source_sets
            .get_mut("main")
            .unwrap()
            .get_mut(&Tool::Checkstyle)
            .unwrap()
            .config = Some("https://".into());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_parse_file_resolves_root() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("checkwire.yaml");
        std::fs::write(
            &path,
            "project:\n  name: demo\n  host_version: \"8.0\"\n",
        )
        .unwrap();
        let config = Config::parse_file(&path).unwrap();
        assert_eq!(config.root(), temp.path());
    }
}
