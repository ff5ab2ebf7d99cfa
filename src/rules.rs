//! Rule-file references and the per-source-set rules extension.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::tools::Tool;

/// Where a rule file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleLocation {
    /// A path on disk, relative to the project root unless absolute.
    Local(PathBuf),
    /// An `http://` or `https://` URL that must be downloaded first.
    Remote(String),
}

impl RuleLocation {
    /// Classify a configured rule-file reference.
    ///
    /// Anything that does not start with an HTTP(S) scheme is a local path,
    /// including strings that are not valid paths at all.
    pub fn classify(reference: &str) -> Self {
        if is_remote(reference) {
            RuleLocation::Remote(reference.to_string())
        } else {
            RuleLocation::Local(PathBuf::from(reference))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, RuleLocation::Remote(_))
    }
}

/// Whether a reference uses an HTTP or HTTPS scheme (case-insensitive).
pub fn is_remote(reference: &str) -> bool {
    let lower = reference.get(..8).unwrap_or(reference).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Rule settings of one tool for one source set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolRules {
    /// Local path or URL of the rule file.
    pub config: String,
    pub ignore_failures: bool,
}

impl ToolRules {
    pub fn location(&self) -> RuleLocation {
        RuleLocation::classify(&self.config)
    }
}

/// Optional per-source-set overrides as written in the configuration file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolRulesOverride {
    #[serde(default)]
    pub config: Option<String>,
    #[serde(default)]
    pub ignore_failures: Option<bool>,
}

/// Project-wide defaults for one tool.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolSettings {
    /// Global on/off switch (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Tool version; falls back to the known-current version when unset.
    #[serde(default)]
    pub version: Option<String>,
    /// Default for every source set (default: true, keep building on violations)
    #[serde(default = "default_true")]
    pub ignore_failures: bool,
    /// Default rule-file reference; `config/<tool>/<tool>.xml` when unset.
    #[serde(default)]
    pub config: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            version: None,
            ignore_failures: true,
            config: None,
        }
    }
}

/// Rule settings of every tool for one source set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RulesConfig {
    pub source_set: String,
    pub tools: BTreeMap<Tool, ToolRules>,
}

impl RulesConfig {
    /// Rules of a single tool.
    pub fn tool(&self, tool: Tool) -> &ToolRules {
        // every tool is filled in by QualityExtension::rules_for
        &self.tools[&tool]
    }
}

/// The per-project extension: tool defaults, declared overrides and the
/// lazily created [`RulesConfig`] of every source set seen so far.
#[derive(Debug, Clone, Default)]
pub struct QualityExtension {
    settings: BTreeMap<Tool, ToolSettings>,
    overrides: BTreeMap<String, BTreeMap<Tool, ToolRulesOverride>>,
    resolved: BTreeMap<String, RulesConfig>,
}

impl QualityExtension {
    pub fn new(
        settings: BTreeMap<Tool, ToolSettings>,
        overrides: BTreeMap<String, BTreeMap<Tool, ToolRulesOverride>>,
    ) -> Self {
        Self {
            settings,
            overrides,
            resolved: BTreeMap::new(),
        }
    }

    /// Project-wide settings of a tool (defaults when not declared).
    pub fn settings(&self, tool: Tool) -> ToolSettings {
        self.settings.get(&tool).cloned().unwrap_or_default()
    }

    pub fn is_enabled(&self, tool: Tool) -> bool {
        self.settings(tool).enabled
    }

    /// Declare or replace the override of one tool for one source set.
    ///
    /// Only affects source sets whose rules have not been resolved yet.
    pub fn set_override(&mut self, source_set: &str, tool: Tool, rules: ToolRulesOverride) {
        self.overrides
            .entry(source_set.to_string())
            .or_default()
            .insert(tool, rules);
    }

    /// Rules for a source set, created on first access and stable afterwards.
    pub fn rules_for(&mut self, source_set: &str) -> &RulesConfig {
        if !self.resolved.contains_key(source_set) {
            let config = self.resolve(source_set);
            self.resolved.insert(source_set.to_string(), config);
        }
        &self.resolved[source_set]
    }

    fn resolve(&self, source_set: &str) -> RulesConfig {
        let overrides = self.overrides.get(source_set);
        let tools = Tool::ALL
            .iter()
            .map(|&tool| {
                let settings = self.settings(tool);
                let declared = overrides.and_then(|o| o.get(&tool));
                let config = declared
                    .and_then(|d| d.config.clone())
                    .or(settings.config)
                    .unwrap_or_else(|| default_config_reference(tool));
                let ignore_failures = declared
                    .and_then(|d| d.ignore_failures)
                    .unwrap_or(settings.ignore_failures);
                (
                    tool,
                    ToolRules {
                        config,
                        ignore_failures,
                    },
                )
            })
            .collect();
        RulesConfig {
            source_set: source_set.to_string(),
            tools,
        }
    }
}

/// `config/<tool>/<tool>.xml`, relative to the project root.
pub fn default_config_reference(tool: Tool) -> String {
    Path::new("config")
        .join(tool.as_str())
        .join(format!("{}.xml", tool.as_str()))
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_remote() {
        assert!(RuleLocation::classify("https://example.com/style.xml").is_remote());
        assert!(RuleLocation::classify("http://example.com/style.xml").is_remote());
        assert!(RuleLocation::classify("HTTPS://EXAMPLE.COM/a.xml").is_remote());
    }

    #[test]
    fn test_classify_local() {
        assert_eq!(
            RuleLocation::classify("rules/style.xml"),
            RuleLocation::Local(PathBuf::from("rules/style.xml"))
        );
        assert!(!RuleLocation::classify("ftp://example.com/a.xml").is_remote());
        assert!(!RuleLocation::classify("file:///tmp/a.xml").is_remote());
        assert!(!RuleLocation::classify("httpx://nope").is_remote());
        assert!(!RuleLocation::classify("").is_remote());
        assert!(!RuleLocation::classify("http:/broken").is_remote());
        assert!(!RuleLocation::classify("ünïcödé").is_remote());
    }

    #[test]
    fn test_rules_default_to_local_config_dir() {
        let mut ext = QualityExtension::default();
        let rules = ext.rules_for("main");
        let checkstyle = rules.tool(Tool::Checkstyle);
        assert_eq!(
            PathBuf::from(&checkstyle.config),
            PathBuf::from("config/checkstyle/checkstyle.xml")
        );
        assert!(checkstyle.ignore_failures);
    }

    #[test]
    fn test_rules_apply_overrides_then_tool_defaults() {
        let mut settings = BTreeMap::new();
        settings.insert(
            Tool::Findbugs,
            ToolSettings {
                ignore_failures: false,
                config: Some("https://example.com/findbugs.xml".into()),
                ..Default::default()
            },
        );
        let mut ext = QualityExtension::new(settings, BTreeMap::new());
        ext.set_override(
            "test",
            Tool::Findbugs,
            ToolRulesOverride {
                config: None,
                ignore_failures: Some(true),
            },
        );

        let main = ext.rules_for("main").tool(Tool::Findbugs).clone();
        assert_eq!(main.config, "https://example.com/findbugs.xml");
        assert!(!main.ignore_failures);

        let test = ext.rules_for("test").tool(Tool::Findbugs).clone();
        assert_eq!(test.config, "https://example.com/findbugs.xml");
        assert!(test.ignore_failures);
    }

    #[test]
    fn test_rules_resolved_once() {
        let mut ext = QualityExtension::default();
        let first = ext.rules_for("main").clone();
        ext.set_override(
            "main",
            Tool::Cpd,
            ToolRulesOverride {
                config: Some("other.xml".into()),
                ignore_failures: None,
            },
        );
        assert_eq!(ext.rules_for("main"), &first);
    }
}
