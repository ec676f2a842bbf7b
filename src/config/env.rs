//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "CROSSRUN";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Runtime versions from CROSSRUN_RUNTIMES (comma-separated)
    pub runtimes: Option<Vec<String>>,
    /// Root directory from CROSSRUN_ROOT
    pub root: Option<PathBuf>,
    /// Config file from CROSSRUN_CONFIG
    pub config_file: Option<PathBuf>,
    /// Output format from CROSSRUN_FORMAT
    pub format: Option<String>,
    /// Log level from CROSSRUN_LOG
    pub log_level: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}")).filter(|v| !v.is_empty());

        Self {
            runtimes: get("RUNTIMES").map(|v| parse_list(&v)),
            root: get("ROOT").map(PathBuf::from),
            config_file: get("CONFIG").map(PathBuf::from),
            format: get("FORMAT"),
            log_level: get("LOG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.runtimes.is_some()
            || self.root.is_some()
            || self.config_file.is_some()
            || self.format.is_some()
            || self.log_level.is_some()
    }
}

/// Split a comma-separated list, dropping blanks
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let env = EnvConfig::from_lookup(lookup_from(&[
            ("CROSSRUN_RUNTIMES", "3.11, 3.12,,"),
            ("CROSSRUN_ROOT", "/work"),
            ("CROSSRUN_LOG", "debug"),
        ]));

        assert_eq!(env.runtimes, Some(vec!["3.11".to_string(), "3.12".to_string()]));
        assert_eq!(env.root, Some(PathBuf::from("/work")));
        assert_eq!(env.log_level.as_deref(), Some("debug"));
        assert_eq!(env.format, None);
        assert!(env.has_any());
    }

    #[test]
    fn test_empty_values_ignored() {
        let env = EnvConfig::from_lookup(lookup_from(&[("CROSSRUN_FORMAT", "")]));
        assert!(!env.has_any());
    }
}
