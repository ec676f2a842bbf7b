//! Configuration module
//!
//! Handles loading and layering configuration. Precedence, lowest first:
//! built-in defaults, config file, `CROSSRUN_*` environment, CLI flags.

#![allow(dead_code)]

mod env;
mod file;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use env::EnvConfig;
pub use file::find_config_file;

use crate::models::RuntimeTarget;

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Runtime versions to run, in order
    pub runtimes: Vec<String>,

    /// Executable template; `{version}` is replaced by each runtime version
    pub python_template: String,

    /// Directory prepended to the runtime search path (defaults to the working directory)
    pub root: Option<PathBuf>,

    /// Result-stream runner arguments placed after the warning filter
    pub runner: Vec<String>,

    /// Value passed to `-W`
    pub warning_filter: String,

    /// Search path environment variable the root is prepended to
    pub search_path_var: String,

    /// Selectors used when none are given on the command line
    pub default_selectors: Vec<String>,

    /// Output format (subunit, json, summary)
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            runtimes: ["2.7", "3.8", "3.9", "3.10", "3.11", "3.12", "3.13"]
                .into_iter()
                .map(String::from)
                .collect(),
            python_template: "python{version}".to_string(),
            root: None,
            runner: vec!["-m".to_string(), "subunit.run".to_string()],
            warning_filter: "ignore:Module testtools was already imported".to_string(),
            search_path_var: "PYTHONPATH".to_string(),
            default_selectors: vec!["testtools.tests.test_suite".to_string()],
            format: "subunit".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON config")?
        };

        Ok(config)
    }

    /// Apply environment overrides
    pub fn merge_env(mut self, env: &EnvConfig) -> Self {
        if let Some(runtimes) = &env.runtimes {
            self.runtimes = runtimes.clone();
        }
        if let Some(root) = &env.root {
            self.root = Some(root.clone());
        }
        if let Some(format) = &env.format {
            self.format = format.clone();
        }
        self
    }

    /// Runtime targets in configured order
    pub fn targets(&self) -> Vec<RuntimeTarget> {
        self.runtimes
            .iter()
            .map(|v| RuntimeTarget::from_template(v.as_str(), &self.python_template))
            .collect()
    }

    /// Given selectors, or the configured default when there are none
    pub fn selectors_or_default(&self, selectors: Vec<String>) -> Vec<String> {
        if selectors.is_empty() {
            self.default_selectors.clone()
        } else {
            selectors
        }
    }

    /// Basic sanity checks
    pub fn validate(&self) -> Result<()> {
        if self.python_template.trim().is_empty() {
            anyhow::bail!("python_template must not be empty");
        }
        if self.search_path_var.trim().is_empty() {
            anyhow::bail!("search_path_var must not be empty");
        }
        if let Some(empty) = self.runtimes.iter().find(|v| v.trim().is_empty()) {
            anyhow::bail!("Invalid runtime version: {empty:?}");
        }
        Ok(())
    }
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
