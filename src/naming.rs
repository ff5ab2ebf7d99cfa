//! Deterministic task names and file locations.
//!
//! Every generated task and file is keyed by `(tool, source set)`. The same
//! key always yields the same name, which is what lets the wiring code find
//! and reuse tasks on repeated configuration passes.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Separators dropped when joining words into a task name.
static WORD_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

/// Prefix of every download task name.
pub const DOWNLOAD_PREFIX: &str = "download";

/// Join words into a lower-camel-case identifier.
///
/// Each word may itself contain separators (`integration-test`), which are
/// treated as word boundaries. The first character of the result is
/// lowercased and the first character of every following word is uppercased;
/// the rest of each word is kept as written.
pub fn lower_camel(words: &[&str]) -> String {
    let mut out = String::new();
    for word in words {
        for piece in WORD_SEPARATOR.split(word).filter(|p| !p.is_empty()) {
            let mut chars = piece.chars();
            let Some(first) = chars.next() else {
                continue;
            };
            if out.is_empty() {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Name of the analysis task for a tool and source set (`checkstyleMain`).
pub fn analysis_task_name(tool: &str, source_set: &str) -> String {
    lower_camel(&[tool, source_set])
}

/// Name of the task downloading a remote rule file (`downloadCheckstyleXmlTest`).
pub fn download_task_name(tool: &str, source_set: &str) -> String {
    lower_camel(&[DOWNLOAD_PREFIX, tool, "xml", source_set])
}

/// Name of the task aggregating every analysis task of a tool.
pub fn aggregate_task_name(tool: &str) -> String {
    tool.to_string()
}

/// Where a remote rule file for `(tool, source set)` is downloaded to.
pub fn downloaded_config_path(config_dir: &Path, tool: &str, source_set: &str) -> PathBuf {
    config_dir.join(tool).join(format!("{}-{}.xml", tool, source_set))
}

/// Where the machine-readable report for `(tool, source set)` is written.
pub fn xml_report_path(report_dir: &Path, tool: &str, source_set: &str) -> PathBuf {
    report_dir.join(tool).join(format!("{}-{}.xml", tool, source_set))
}

/// Where the human-readable report for `(tool, source set)` would be written.
pub fn html_report_path(report_dir: &Path, tool: &str, source_set: &str) -> PathBuf {
    report_dir.join(tool).join(format!("{}-{}.html", tool, source_set))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_camel_joins_words() {
        assert_eq!(lower_camel(&["checkstyle", "main"]), "checkstyleMain");
        assert_eq!(lower_camel(&["Findbugs", "debug"]), "findbugsDebug");
        assert_eq!(
            lower_camel(&["cpd", "integration-test"]),
            "cpdIntegrationTest"
        );
        assert_eq!(lower_camel(&["cpd", "androidTest"]), "cpdAndroidTest");
        assert_eq!(lower_camel(&["", "main"]), "main");
    }

    #[test]
    fn test_download_task_name() {
        assert_eq!(download_task_name("style", "test"), "downloadStyleXmlTest");
        assert_eq!(
            download_task_name("checkstyle", "main"),
            "downloadCheckstyleXmlMain"
        );
    }

    #[test]
    fn test_names_distinct_per_key() {
        let names = [
            analysis_task_name("checkstyle", "main"),
            analysis_task_name("checkstyle", "test"),
            analysis_task_name("findbugs", "main"),
            download_task_name("checkstyle", "main"),
            download_task_name("findbugs", "main"),
            aggregate_task_name("checkstyle"),
        ];
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_paths_keyed_by_source_set() {
        let config = Path::new("/p/config");
        assert_eq!(
            downloaded_config_path(config, "style", "test"),
            PathBuf::from("/p/config/style/style-test.xml")
        );
        assert_ne!(
            downloaded_config_path(config, "style", "a"),
            downloaded_config_path(config, "style", "b")
        );

        let reports = Path::new("/p/build/reports");
        assert_eq!(
            xml_report_path(reports, "cpd", "main"),
            PathBuf::from("/p/build/reports/cpd/cpd-main.xml")
        );
    }
}
