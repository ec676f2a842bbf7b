//! Result sinks
//!
//! A sink consumes the events of an aggregated stream. The driver writes
//! every event through a [`ResultSink`], so output encodings, summaries and
//! test doubles are all interchangeable.

#![allow(dead_code)]

mod log;
mod summary;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Details, Event};

pub use log::EventLog;
pub use summary::SummaryCollector;

/// Errors raised while consuming events
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write event: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Consumer of result events
pub trait ResultSink {
    /// Consume one event
    fn handle(&mut self, event: &Event) -> Result<(), SinkError>;

    /// Flush anything buffered
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn start_test(&mut self, test: &str) -> Result<(), SinkError> {
        self.handle(&Event::start(test))
    }

    fn stop_test(&mut self, test: &str) -> Result<(), SinkError> {
        self.handle(&Event::stop(test))
    }

    fn add_skip(&mut self, test: &str, reason: &str) -> Result<(), SinkError> {
        self.handle(&Event::skip(test, reason))
    }

    fn add_error(&mut self, test: &str, details: Details) -> Result<(), SinkError> {
        self.handle(&Event::error(test, details))
    }

    fn time(&mut self, timestamp: DateTime<Utc>) -> Result<(), SinkError> {
        self.handle(&Event::time(timestamp))
    }
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn handle(&mut self, event: &Event) -> Result<(), SinkError> {
        (**self).handle(event)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    fn handle(&mut self, event: &Event) -> Result<(), SinkError> {
        (**self).handle(event)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

/// Fans every event out to several sinks, in order
pub struct MultiSink<'a> {
    sinks: Vec<&'a mut dyn ResultSink>,
}

impl<'a> MultiSink<'a> {
    pub fn new(sinks: Vec<&'a mut dyn ResultSink>) -> Self {
        Self { sinks }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ResultSink for MultiSink<'_> {
    fn handle(&mut self, event: &Event) -> Result<(), SinkError> {
        for sink in self.sinks.iter_mut() {
            sink.handle(event)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        for sink in self.sinks.iter_mut() {
            sink.flush()?;
        }
        Ok(())
    }
}

/// Drops every event
#[derive(Debug, Default)]
pub struct Discard;

impl ResultSink for Discard {
    fn handle(&mut self, _event: &Event) -> Result<(), SinkError> {
        Ok(())
    }
}
