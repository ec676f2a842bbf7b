//! Per-runtime result summaries
//!
//! Tallies outcomes for each runtime target in an aggregated run.

use serde::Serialize;
use std::fmt;

use super::OutcomeKind;

/// Outcome counts for one runtime target
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeSummary {
    pub runtime: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    pub expected_failures: usize,
    pub unexpected_successes: usize,
    pub duration_ms: u64,
}

impl RuntimeSummary {
    pub fn new(runtime: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
            ..Default::default()
        }
    }

    /// Count one outcome
    pub fn record(&mut self, kind: OutcomeKind) {
        self.total += 1;
        match kind {
            OutcomeKind::Success => self.passed += 1,
            OutcomeKind::Failure => self.failed += 1,
            OutcomeKind::Error => self.errors += 1,
            OutcomeKind::Skip => self.skipped += 1,
            OutcomeKind::ExpectedFailure => self.expected_failures += 1,
            OutcomeKind::UnexpectedSuccess => self.unexpected_successes += 1,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        let ran = self.total - self.skipped;
        if ran == 0 {
            0.0
        } else {
            ((self.passed + self.expected_failures) as f64 / ran as f64) * 100.0
        }
    }

    pub fn was_successful(&self) -> bool {
        self.failed == 0 && self.errors == 0 && self.unexpected_successes == 0
    }
}

impl fmt::Display for RuntimeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} tests | Pass: {} | Fail: {} | Error: {} | Skip: {} | XFail: {} | UXSuccess: {} ({:.1}%) [{}ms]",
            self.runtime,
            self.total,
            self.passed,
            self.failed,
            self.errors,
            self.skipped,
            self.expected_failures,
            self.unexpected_successes,
            self.pass_rate(),
            self.duration_ms
        )
    }
}

/// Summaries for every runtime in an aggregated run, in run order
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunSummary {
    pub runtimes: Vec<RuntimeSummary>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.runtimes.iter().map(|r| r.total).sum()
    }

    pub fn was_successful(&self) -> bool {
        self.runtimes.iter().all(RuntimeSummary::was_successful)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for runtime in &self.runtimes {
            writeln!(f, "  {runtime}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Runtimes: {} | Tests: {} | {}",
            self.runtimes.len(),
            self.total(),
            if self.was_successful() { "OK" } else { "FAILED" }
        )
    }
}
