//! Aggregating test-run driver
//!
//! Runs the suite under one runtime target and relays the results into a
//! sink. A missing runtime becomes a skip on a placeholder test named after
//! the runtime. Anything the subprocess writes to stderr becomes an error
//! on that placeholder, whatever the exit code or the parsed verdicts.

#![allow(dead_code)]

use std::ffi::OsString;
use std::path::PathBuf;
use tracing::{error, info, warn};

use super::locator::{Invocation, RunOutput, RuntimeLocator};
use crate::config::AppConfig;
use crate::models::{Content, ContentType, Details, RuntimeTarget};
use crate::protocol::ProtocolServer;
use crate::sink::{ResultSink, SinkError};
use crate::utils::clock::{Clock, SystemClock};

#[cfg(windows)]
const SEARCH_PATH_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const SEARCH_PATH_SEPARATOR: &str = ":";

/// Settings the driver applies to every target
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    /// Directory prepended to the runtime search path
    pub root: PathBuf,
    /// Result-stream runner arguments
    pub runner: Vec<String>,
    /// Value passed to `-W`
    pub warning_filter: String,
    /// Name of the search path variable, e.g. `PYTHONPATH`
    pub search_path_var: String,
    /// Value of the search path variable inherited from the caller
    pub inherited_search_path: Option<OsString>,
}

impl DriverConfig {
    pub fn from_app(config: &AppConfig, root: PathBuf, inherited: Option<OsString>) -> Self {
        Self {
            root,
            runner: config.runner.clone(),
            warning_filter: config.warning_filter.clone(),
            search_path_var: config.search_path_var.clone(),
            inherited_search_path: inherited,
        }
    }

    /// Root followed by any inherited entries
    pub fn search_path(&self) -> OsString {
        let mut value = OsString::from(self.root.as_os_str());
        if let Some(existing) = self.inherited_search_path.as_ref().filter(|v| !v.is_empty()) {
            value.push(SEARCH_PATH_SEPARATOR);
            value.push(existing);
        }
        value
    }
}

/// What happened to a single target
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetStatus {
    /// Probe failed; a skip was reported
    Unavailable,
    /// The suite ran and its stream was relayed
    Ran {
        exit_code: Option<i32>,
        stderr_reported: bool,
    },
}

/// Runs the suite under one runtime target at a time
pub struct Driver<L: RuntimeLocator> {
    config: DriverConfig,
    locator: L,
    clock: Box<dyn Clock>,
}

impl<L: RuntimeLocator> Driver<L> {
    pub fn new(config: DriverConfig, locator: L) -> Self {
        Self {
            config,
            locator,
            clock: Box::new(SystemClock),
        }
    }

    /// Use a different timestamp source
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    #[cfg(test)]
    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// Command that runs `selectors` under `target`
    pub fn invocation(&self, target: &RuntimeTarget, selectors: &[String]) -> Invocation {
        Invocation::new(target.executable.as_str())
            .arg("-W")
            .arg(self.config.warning_filter.as_str())
            .args(self.config.runner.iter().cloned())
            .args(selectors.iter().cloned())
            .env(self.config.search_path_var.as_str(), self.config.search_path())
    }

    /// Run the suite under `target` and relay the results into `sink`.
    ///
    /// Only sink failures are returned as errors; every failure of the
    /// target itself is reported as an event.
    pub async fn run_target(
        &self,
        target: &RuntimeTarget,
        sink: &mut dyn ResultSink,
        selectors: &[String],
    ) -> Result<TargetStatus, SinkError> {
        sink.time(self.clock.now())?;
        let placeholder = target.placeholder_name();

        if !self.locator.probe(target).await {
            info!("{} not available, skipping", target);
            sink.start_test(&placeholder)?;
            sink.add_skip(&placeholder, &format!("{} not available", target.executable))?;
            sink.stop_test(&placeholder)?;
            return Ok(TargetStatus::Unavailable);
        }

        let invocation = self.invocation(target, selectors);
        info!("Running {}", invocation);

        sink.time(self.clock.now())?;
        let output = match self.locator.execute(&invocation).await {
            Ok(output) => output,
            Err(e) => {
                error!("Failed to run {}: {:#}", target, e);
                RunOutput {
                    exit_code: None,
                    stdout: Vec::new(),
                    stderr: format!("{e:#}").into_bytes(),
                }
            }
        };

        ProtocolServer::new(&mut *sink).read_from(&output.stdout)?;

        let stderr_reported = !output.stderr.is_empty();
        if stderr_reported {
            warn!(
                "{} wrote {} bytes to stderr (exit code {:?})",
                target,
                output.stderr.len(),
                output.exit_code
            );
            let mut details = Details::new();
            details.insert(
                "stderr".to_string(),
                Content::new(ContentType::utf8_text(), output.stderr),
            );
            sink.start_test(&placeholder)?;
            sink.add_error(&placeholder, details)?;
            sink.stop_test(&placeholder)?;
        }

        sink.time(self.clock.now())?;
        Ok(TargetStatus::Ran {
            exit_code: output.exit_code,
            stderr_reported,
        })
    }
}
