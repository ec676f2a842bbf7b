//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::Parser;
use std::path::PathBuf;

/// Run one test suite under several interpreter runtimes
#[derive(Parser, Debug)]
#[command(name = "crossrun")]
#[command(version)]
#[command(about = "Run a test suite across interpreter versions and relay one subunit stream")]
#[command(long_about = None)]
pub struct Args {
    /// Test suite selectors passed to the runner (default: configured suite)
    pub selectors: Vec<String>,

    /// Runtime version to run; repeat to run several (overrides config)
    #[arg(short, long = "runtime", value_name = "VERSION")]
    pub runtimes: Vec<String>,

    /// Directory prepended to the runtime search path
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Executable template, `{version}` is replaced by each runtime version
    #[arg(long, value_name = "TEMPLATE")]
    pub python_template: Option<String>,

    /// Output format (subunit, json, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
