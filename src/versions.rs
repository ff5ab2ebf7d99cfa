//! Known-current versions of the analysis tools.

use phf::phf_map;

use crate::host::parse_lenient;
use crate::tools::Tool;

/// Latest tool versions the wiring has been checked against.
static CURRENT_VERSIONS: phf::Map<&'static str, &'static str> = phf_map! {
    "checkstyle" => "10.12.5",
    "findbugs" => "3.0.1",
    "cpd" => "6.55.0",
};

/// Known-current version of a tool.
pub fn current_version(tool: Tool) -> &'static str {
    CURRENT_VERSIONS
        .get(tool.as_str())
        .copied()
        .unwrap_or("0.0.0")
}

/// Whether `configured` is older than the known-current version.
///
/// Versions that cannot be parsed are never reported as outdated.
pub fn is_outdated(tool: Tool, configured: &str) -> bool {
    match (parse_lenient(configured), parse_lenient(current_version(tool))) {
        (Ok(configured), Ok(current)) => configured < current,
        _ => false,
    }
}
