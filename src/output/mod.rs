//! Output formatting module
//!
//! Provides the output formats for the aggregated stream.

mod formatter;

pub use formatter::{format_summary_table, JsonLinesWriter, OutputFormat};
