//! In-memory event log

#![allow(dead_code)]

use super::{ResultSink, SinkError};
use crate::models::{Event, OutcomeKind};

/// Records every event it receives, in order
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Outcome events only, as (test, kind) pairs
    pub fn outcomes(&self) -> Vec<(&str, OutcomeKind)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Outcome { test, kind, .. } => Some((test.as_str(), *kind)),
                _ => None,
            })
            .collect()
    }

    pub fn time_events(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Time { .. }))
            .count()
    }
}

impl ResultSink for EventLog {
    fn handle(&mut self, event: &Event) -> Result<(), SinkError> {
        self.events.push(event.clone());
        Ok(())
    }
}
