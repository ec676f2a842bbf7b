//! Runtime location and subprocess execution
//!
//! The driver never spawns processes itself. It hands an [`Invocation`] to a
//! [`RuntimeLocator`], which lets tests substitute a scripted locator.

#![allow(dead_code)]

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::models::RuntimeTarget;

/// A fully specified subprocess command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Variables set on top of the inherited environment
    pub env: Vec<(String, OsString)>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// `<exe> -c pass`: succeeds only if the runtime can start
    pub fn probe(target: &RuntimeTarget) -> Self {
        Self::new(target.executable.as_str()).args(["-c", "pass"])
    }

    pub fn is_probe(&self) -> bool {
        self.args == ["-c", "pass"]
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished subprocess
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunOutput {
    /// Exit code, or `None` if the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Capability to probe for and execute runtimes
#[async_trait]
pub trait RuntimeLocator: Send + Sync {
    /// Run an invocation to completion, buffering its output
    async fn execute(&self, invocation: &Invocation) -> Result<RunOutput>;

    /// Whether the target's executable can run at all
    async fn probe(&self, target: &RuntimeTarget) -> bool {
        match self.execute(&Invocation::probe(target)).await {
            Ok(output) => output.success(),
            Err(e) => {
                debug!("Probe for {} failed: {:#}", target, e);
                false
            }
        }
    }
}

/// Locator that spawns real processes from `PATH`
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessLocator;

#[async_trait]
impl RuntimeLocator for ProcessLocator {
    async fn execute(&self, invocation: &Invocation) -> Result<RunOutput> {
        debug!("Executing: {}", invocation);

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to execute {}", invocation.program))?;

        Ok(RunOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
