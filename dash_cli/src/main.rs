//! # dashview
//!
//! Command line host for the dashboard core: loads and migrates snapshot
//! files, replays recorded execution events through the reducer and prints
//! grouped benchmark check trees.

use clap::{Parser, Subcommand};
use dash_schema::config::runtime::LoggingPreferences;
use dash_schema::logging::{self, LogFacadeLogger, LogLevel, Logger};
use dash_schema::{log_error, log_info, RuntimeConfig};
use std::path::PathBuf;
use std::sync::Arc;

mod commands;

use commands::{checks, replay, snapshot};

#[derive(Parser)]
#[command(name = "dashview", version)]
#[command(about = "Inspect dashboard snapshots, execution events and check results", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Runtime preferences file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, migrate and summarise snapshot files
    Snapshot(snapshot::SnapshotArgs),

    /// Feed recorded events through the dashboard reducer
    Replay(replay::ReplayArgs),

    /// Flatten and group a benchmark run
    Checks(checks::ChecksArgs),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref().map(RuntimeConfig::load).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            init_logging(cli.verbose, &LoggingPreferences::default())?;
            log_error!(err.error_code(), "Invalid runtime configuration", "error" => &err);
            return Err(err.into());
        }
    };

    init_logging(cli.verbose, &config.logging)?;
    log_info!("dashview starting", "version" => env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Snapshot(args) => snapshot::run(args, &config)?,
        Commands::Replay(args) => replay::run(args)?,
        Commands::Checks(args) => checks::run(args, &config)?,
    }

    Ok(())
}

/// Route dashboard log events through `log` and install `env_logger` as its backend.
///
/// `RUST_LOG` still overrides the level chosen here. Structured or console
/// output selected in the preferences is written alongside.
fn init_logging(verbose: bool, preferences: &LoggingPreferences) -> Result<(), Box<dyn std::error::Error>> {
    let min_level = if verbose {
        LogLevel::Debug
    } else {
        preferences.min_log_level.to_events_log_level()
    };

    env_logger::Builder::new()
        .filter_level(level_filter(min_level))
        .format_timestamp(None)
        .parse_default_env()
        .init();

    logging::config::init_runtime_preferences(preferences.clone())?;

    let host: Arc<dyn Logger> = Arc::new(LogFacadeLogger::new("dashview"));
    logging::init_global_logging(Some(host), Some(min_level))?;
    Ok(())
}

fn level_filter(level: LogLevel) -> log::LevelFilter {
    match level {
        LogLevel::Error => log::LevelFilter::Error,
        LogLevel::Warning => log::LevelFilter::Warn,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Debug => log::LevelFilter::Debug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dashview",
            "checks",
            "run.json",
            "--grouping",
            "control,result",
            "-v",
            "--config",
            "dash.toml",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("dash.toml")));
        match cli.command {
            Commands::Checks(args) => assert_eq!(args.grouping.as_deref(), Some("control,result")),
            _ => panic!("expected checks command"),
        }
    }

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter(LogLevel::Warning), log::LevelFilter::Warn);
        assert_eq!(level_filter(LogLevel::Debug), log::LevelFilter::Debug);
    }
}
