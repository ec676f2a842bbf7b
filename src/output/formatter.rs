//! Output formats for the aggregated stream
//!
//! Subunit is the default wire format. JSON lines and a summary table are
//! offered for humans and ad hoc tooling.

#![allow(dead_code)]

use std::io::Write;

use crate::models::{Event, RunSummary};
use crate::protocol::ProtocolClient;
use crate::sink::{Discard, ResultSink, SinkError};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Subunit,
    Json,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "subunit" | "subunit1" | "v1" => Some(OutputFormat::Subunit),
            "json" | "jsonl" => Some(OutputFormat::Json),
            "summary" | "table" => Some(OutputFormat::Summary),
            _ => None,
        }
    }

    /// Sink that renders the event stream onto `out`.
    ///
    /// The summary format writes nothing per event; its table is printed
    /// once the run completes.
    pub fn sink<'w, W: Write + 'w>(self, out: W) -> Box<dyn ResultSink + 'w> {
        match self {
            OutputFormat::Subunit => Box::new(ProtocolClient::new(out)),
            OutputFormat::Json => Box::new(JsonLinesWriter::new(out)),
            OutputFormat::Summary => Box::new(Discard),
        }
    }
}

/// Sink writing one JSON object per event
pub struct JsonLinesWriter<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for JsonLinesWriter<W> {
    fn handle(&mut self, event: &Event) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.out.flush()?;
        Ok(())
    }
}

/// Render a run summary as a table
pub fn format_summary_table(summary: &RunSummary, colorize: bool) -> String {
    let mut output = String::new();

    output.push_str("\n╔══════════════════════════════════════════════════════════════════════╗\n");
    output.push_str(&format!(
        "║  {:<16} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>9}  ║\n",
        "Runtime", "Tests", "Pass", "Fail", "Error", "Skip", "XFail", "Time"
    ));
    output.push_str("╠══════════════════════════════════════════════════════════════════════╣\n");

    for runtime in &summary.runtimes {
        let failed = runtime.failed + runtime.unexpected_successes;
        let fail_str = paint(&format!("{failed:>6}"), failed > 0, "31", colorize);
        let error_str = paint(&format!("{:>6}", runtime.errors), runtime.errors > 0, "31", colorize);
        let pass_str = paint(&format!("{:>6}", runtime.passed), runtime.passed > 0, "32", colorize);

        output.push_str(&format!(
            "║  {:<16} {:>6} {} {} {} {:>6} {:>6} {:>7}ms  ║\n",
            runtime.runtime,
            runtime.total,
            pass_str,
            fail_str,
            error_str,
            runtime.skipped,
            runtime.expected_failures,
            runtime.duration_ms
        ));
    }

    output.push_str("╠══════════════════════════════════════════════════════════════════════╣\n");
    let verdict = if summary.was_successful() {
        paint("OK", true, "32", colorize)
    } else {
        paint("FAILED", true, "31", colorize)
    };
    output.push_str(&format!(
        "║  Runtimes: {:3} | Tests: {:6} | {:<30}║\n",
        summary.runtimes.len(),
        summary.total(),
        verdict
    ));
    output.push_str("╚══════════════════════════════════════════════════════════════════════╝\n");

    output
}

fn paint(text: &str, highlight: bool, color: &str, colorize: bool) -> String {
    if colorize && highlight {
        format!("\x1b[{color}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}
