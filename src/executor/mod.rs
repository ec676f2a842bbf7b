//! Test execution engine
//!
//! Runs the suite under each runtime target sequentially and relays the
//! results into one aggregated stream.

mod driver;
mod locator;
mod runner;

pub use driver::{Driver, DriverConfig, TargetStatus};
pub use locator::{Invocation, ProcessLocator, RunOutput, RuntimeLocator};
pub use runner::Runner;
