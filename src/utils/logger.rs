//! Diagnostics for the driver
//!
//! stdout is reserved for the aggregated result stream, so every log line
//! goes to stderr. Only this crate's targets are enabled; `off` silences
//! diagnostics entirely for callers that capture both streams.

use tracing_subscriber::EnvFilter;

const LOG_TARGET: &str = "crossrun";

/// Verbosity requested via `--log-level`, `-v` or `CROSSRUN_LOG`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "off" | "quiet" | "none" => Some(LogLevel::Off),
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Filter directive limiting output to this crate
    pub fn directive(self) -> String {
        format!("{}={}", LOG_TARGET, self.as_str())
    }
}

/// Install the stderr subscriber
pub fn init_logger(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level.directive()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
