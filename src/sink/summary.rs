//! Outcome tallying sink

use super::{ResultSink, SinkError};
use crate::models::{Event, RuntimeSummary};

/// Counts outcomes for a single runtime target
#[derive(Debug)]
pub struct SummaryCollector {
    summary: RuntimeSummary,
}

impl SummaryCollector {
    pub fn new(runtime: impl Into<String>) -> Self {
        Self {
            summary: RuntimeSummary::new(runtime),
        }
    }

    pub fn summary(&self) -> &RuntimeSummary {
        &self.summary
    }

    pub fn finish(mut self, duration_ms: u64) -> RuntimeSummary {
        self.summary.duration_ms = duration_ms;
        self.summary
    }
}

impl ResultSink for SummaryCollector {
    fn handle(&mut self, event: &Event) -> Result<(), SinkError> {
        if let Some(kind) = event.outcome_kind() {
            self.summary.record(kind);
        }
        Ok(())
    }
}
