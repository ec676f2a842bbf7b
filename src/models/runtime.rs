//! Runtime target model
//!
//! A runtime target is one interpreter version under test.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder substituted with the version in executable templates
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// One interpreter version to run the suite under
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeTarget {
    /// Version identifier as configured, e.g. "3.10"
    pub version: String,
    /// Executable name or path, e.g. "python3.10"
    pub executable: String,
}

impl RuntimeTarget {
    pub fn new(version: impl Into<String>, executable: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            executable: executable.into(),
        }
    }

    /// Resolve a version against an executable template such as `python{version}`
    pub fn from_template(version: impl Into<String>, template: &str) -> Self {
        let version = version.into();
        let executable = if template.contains(VERSION_PLACEHOLDER) {
            template.replace(VERSION_PLACEHOLDER, &version)
        } else {
            format!("{template}{version}")
        };
        Self {
            version,
            executable,
        }
    }

    /// Name of the synthetic test used to report runtime-level conditions
    pub fn placeholder_name(&self) -> String {
        sanitize(&self.executable)
    }
}

impl fmt::Display for RuntimeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executable)
    }
}

/// Strip every non-alphanumeric character ("3.10" -> "310")
pub fn sanitize(identifier: &str) -> String {
    identifier.chars().filter(|c| c.is_alphanumeric()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("3.10"), "310");
        assert_eq!(sanitize("python2.7"), "python27");
        assert_eq!(sanitize("pypy-3.9_x"), "pypy39x");
    }

    #[test]
    fn test_from_template() {
        let target = RuntimeTarget::from_template("3.10", "python{version}");
        assert_eq!(target.executable, "python3.10");
        assert_eq!(target.placeholder_name(), "python310");

        let target = RuntimeTarget::from_template("3.9", "/opt/py/bin/python");
        assert_eq!(target.executable, "/opt/py/bin/python3.9");
    }
}
