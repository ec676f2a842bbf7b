//! Shared utilities

pub mod clock;
pub mod logger;
pub mod timer;
