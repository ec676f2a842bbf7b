//! crossrun - Cross-Runtime Test Aggregator
//!
//! Runs one test suite under several interpreter versions, one after another,
//! and relays every run's subunit result stream into a single stream on
//! stdout.
//!
//! ## Features
//!
//! - Missing runtimes are reported as skipped placeholder tests
//! - Anything a run writes to stderr is reported as an error
//! - Subunit v1, JSON lines or summary table output
//! - Layered configuration: file, `CROSSRUN_*` environment, CLI flags
//!
//! ## Usage
//!
//! ```bash
//! # Run the default suite under every configured runtime
//! crossrun
//!
//! # Run a specific suite under two runtimes
//! crossrun -r 3.11 -r 3.12 pkg.tests.test_suite
//!
//! # Show a summary table instead of the stream
//! crossrun --format summary
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufWriter, IsTerminal};
use tracing::{debug, info};

mod cli;
mod config;
mod executor;
mod models;
mod output;
mod protocol;
mod sink;
mod utils;

use cli::Args;
use config::{find_config_file, AppConfig, EnvConfig};
use executor::{Driver, DriverConfig, ProcessLocator, Runner};
use output::{format_summary_table, OutputFormat};
use utils::logger::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    init_logger(resolve_log_level(&args, &env)?);

    let config = load_config(&args, &env)?;
    let format = OutputFormat::from_str(&config.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", config.format))?;

    let root = match &config.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Failed to resolve working directory")?,
    };
    let inherited = std::env::var_os(&config.search_path_var);
    let driver = Driver::new(
        DriverConfig::from_app(&config, root, inherited),
        ProcessLocator,
    );
    let runner = Runner::new(driver, config.targets());
    let selectors = config.selectors_or_default(args.selectors);

    let stdout = std::io::stdout();
    let colorize = stdout.is_terminal();
    let mut sink = format.sink(BufWriter::new(stdout.lock()));

    let summary = runner
        .run_all(&mut *sink, &selectors)
        .await
        .context("Failed to write result stream")?;
    drop(sink);

    if format == OutputFormat::Summary {
        print!("{}", format_summary_table(&summary, colorize));
    }
    info!("Run complete\n{}", summary);

    Ok(())
}

fn resolve_log_level(args: &Args, env: &EnvConfig) -> Result<LogLevel> {
    if let Some(level) = &args.log_level {
        return LogLevel::from_str(level)
            .ok_or_else(|| anyhow::anyhow!("Unknown log level: {level}"));
    }
    if args.verbose {
        return Ok(LogLevel::Debug);
    }
    Ok(env
        .log_level
        .as_deref()
        .and_then(LogLevel::from_str)
        .unwrap_or(LogLevel::Info))
}

/// Defaults, then config file, then environment, then CLI flags
fn load_config(args: &Args, env: &EnvConfig) -> Result<AppConfig> {
    let path = args
        .config
        .clone()
        .or_else(|| env.config_file.clone())
        .or_else(find_config_file);

    let mut config = match path {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            AppConfig::load(&path)?
        }
        None => AppConfig::default(),
    };

    if env.has_any() {
        debug!("Applying environment overrides: {:?}", env);
    }
    config = config.merge_env(env);

    if !args.runtimes.is_empty() {
        config.runtimes = args.runtimes.clone();
    }
    if let Some(root) = &args.root {
        config.root = Some(root.clone());
    }
    if let Some(template) = &args.python_template {
        config.python_template = template.clone();
    }
    if let Some(format) = &args.format {
        config.format = format.clone();
    }

    config.validate()?;
    Ok(config)
}
