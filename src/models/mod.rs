//! Data models for cross-runtime test runs
//!
//! This module contains the data structures shared by the protocol codec,
//! the sinks and the driver.

mod event;
mod runtime;
mod summary;

pub use event::{Content, ContentType, Details, Event, OutcomeKind, ProgressWhence};
pub use runtime::RuntimeTarget;
pub use summary::{RunSummary, RuntimeSummary};
