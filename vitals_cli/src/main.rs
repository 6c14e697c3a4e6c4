//! `vitals` command-line entry point.

mod cli;
mod error_fmt;
mod measure;
mod rt;

use std::fs;
use std::path::Path;

use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_appender::non_blocking::WorkerGuard;

use crate::cli::{Cli, Commands};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = color_eyre::install();

    // Holds the file appender's worker until the process is done logging
    let mut guard = None;
    let result = run(&cli, &mut guard);
    if let Err(err) = &result {
        tracing::error!(error = %format!("{err:#}"), "command failed");
    }
    drop(guard);

    if let Err(err) = result {
        println!("{}", format_error_json(&err));
        eprintln!("{}", humanize(&err));
        std::process::exit(exit_code_for_error(&err));
    }
}

fn run(cli: &Cli, guard: &mut Option<WorkerGuard>) -> Result<()> {
    let cfg = load_config(&cli.config)?;
    *guard = init_tracing(cli, &cfg.logging)?;
    cfg.validate().wrap_err("invalid configuration")?;

    match &cli.cmd {
        Commands::Height { acq, rt, rt_prio } => measure::run_height(&cfg, acq, *rt, *rt_prio),
        Commands::Temperature { acq } => measure::run_temperature(&cfg, acq),
        Commands::SelfCheck => measure::self_check(&cfg),
    }
}

fn load_config(path: &Path) -> Result<vitals_config::Config> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    toml::from_str::<vitals_config::Config>(&text).wrap_err("invalid configuration")
}

/// Console layer on stderr (pretty or JSON) plus an optional JSON file layer.
///
/// `RUST_LOG` wins over `--log-level`, which wins over `[logging] level`.
/// Returns the file appender guard; file lines are flushed when it drops.
fn init_tracing(cli: &Cli, logging: &vitals_config::Logging) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

    let level = cli
        .log_level
        .as_deref()
        .or(logging.level.as_deref())
        .unwrap_or("info");
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("invalid log level {level:?}"))?,
    };

    let console = if cli.log_json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    let mut guard = None;
    let file = match logging.file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {}", path.display()))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, g) = tracing_appender::non_blocking(appender);
            guard = Some(g);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| eyre::eyre!("install tracing subscriber: {e}"))?;
    Ok(guard)
}
