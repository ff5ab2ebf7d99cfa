//! Compatibility shim over the host build tool's API versions.
//!
//! Older hosts name dependency buckets and report properties differently.
//! The shim is chosen once from the detected host version and every
//! version-dependent decision goes through it.

use semver::Version;

use crate::error::{WiringError, WiringResult};
use crate::project::SourceSet;

/// Oldest host version the engine can wire.
pub const MINIMUM_HOST: Version = Version::new(4, 10, 0);

/// First host version using the current API shape.
pub const CURRENT_API_SINCE: Version = Version::new(6, 0, 0);

/// Host operations whose shape depends on the host version.
pub trait HostApi: Send + Sync {
    /// Short label for logs and plan output.
    fn label(&self) -> &'static str;

    /// Dependency bucket holding the compile classpath of a plain source set.
    fn compile_classpath(&self, source_set: &SourceSet) -> String;

    /// Dependency bucket holding the compile classpath of a mobile variant.
    fn variant_classpath(&self, variant: &str) -> String;

    /// Property a report destination is assigned to.
    fn report_property(&self) -> &'static str;
}

/// Hosts from 4.10 up to (not including) 6.0.
pub struct LegacyHost;

impl HostApi for LegacyHost {
    fn label(&self) -> &'static str {
        "legacy"
    }

    fn compile_classpath(&self, source_set: &SourceSet) -> String {
        if source_set.name == "main" {
            "compile".to_string()
        } else {
            format!("{}Compile", source_set.name)
        }
    }

    fn variant_classpath(&self, variant: &str) -> String {
        format!("_{}Compile", variant)
    }

    fn report_property(&self) -> &'static str {
        "destination"
    }
}

/// Hosts from 6.0 on.
pub struct CurrentHost;

impl HostApi for CurrentHost {
    fn label(&self) -> &'static str {
        "current"
    }

    fn compile_classpath(&self, source_set: &SourceSet) -> String {
        if source_set.name == "main" {
            "compileClasspath".to_string()
        } else {
            format!("{}CompileClasspath", source_set.name)
        }
    }

    fn variant_classpath(&self, variant: &str) -> String {
        format!("{}CompileClasspath", variant)
    }

    fn report_property(&self) -> &'static str {
        "outputLocation"
    }
}

/// Parse `7`, `7.4` or `7.4.2` (pre-release suffixes allowed on the full form).
pub fn parse_lenient(raw: &str) -> WiringResult<Version> {
    let trimmed = raw.trim();
    let core_len = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (core, rest) = trimmed.split_at(core_len);
    let parts = core.split('.').filter(|p| !p.is_empty()).count();
    let padded = match parts {
        1 => format!("{}.0.0{}", core, rest),
        2 => format!("{}.0{}", core, rest),
        _ => trimmed.to_string(),
    };
    Version::parse(&padded).map_err(|_| WiringError::InvalidVersion(raw.to_string()))
}

/// Pick the shim for a host version, refusing unsupported hosts.
pub fn select(host_version: &str) -> WiringResult<Box<dyn HostApi>> {
    let version = parse_lenient(host_version)?;
    if version < MINIMUM_HOST {
        return Err(WiringError::UnsupportedHost {
            found: host_version.to_string(),
            minimum: MINIMUM_HOST.to_string(),
        });
    }
    if version < CURRENT_API_SINCE {
        Ok(Box::new(LegacyHost))
    } else {
        Ok(Box::new(CurrentHost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::SourceSetKind;

    #[test]
    fn test_parse_lenient() {
        assert_eq!(parse_lenient("7").unwrap(), Version::new(7, 0, 0));
        assert_eq!(parse_lenient("7.4").unwrap(), Version::new(7, 4, 0));
        assert_eq!(parse_lenient(" 8.5.1 ").unwrap(), Version::new(8, 5, 1));
        assert!(parse_lenient("8.0.0-rc1").is_ok());
        assert!(parse_lenient("seven").is_err());
        assert!(parse_lenient("").is_err());
    }

    #[test]
    fn test_select_rejects_old_hosts() {
        let err = select("4.9").err().unwrap();
        assert!(matches!(err, WiringError::UnsupportedHost { .. }));
        assert!(select("abc").is_err());
    }

    #[test]
    fn test_select_shape_by_version() {
        assert_eq!(select("4.10").unwrap().label(), "legacy");
        assert_eq!(select("5.6.4").unwrap().label(), "legacy");
        assert_eq!(select("6.0").unwrap().label(), "current");
        assert_eq!(select("8.5").unwrap().label(), "current");
    }

    #[test]
    fn test_bucket_names() {
        let main = SourceSet::new("main", SourceSetKind::Jvm);
        let test = SourceSet::new("test", SourceSetKind::Jvm);

        assert_eq!(LegacyHost.compile_classpath(&main), "compile");
        assert_eq!(LegacyHost.compile_classpath(&test), "testCompile");
        assert_eq!(LegacyHost.variant_classpath("debug"), "_debugCompile");

        assert_eq!(CurrentHost.compile_classpath(&main), "compileClasspath");
        assert_eq!(CurrentHost.compile_classpath(&test), "testCompileClasspath");
        assert_eq!(CurrentHost.variant_classpath("debug"), "debugCompileClasspath");
    }
}
