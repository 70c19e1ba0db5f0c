//! `dashview snapshot`: load `.sps` files and report what they contain

use super::CommandError;
use clap::Args;
use dash_schema::{log_info, RuntimeConfig};
use dash_state::loader::{LoadedSnapshot, SnapshotLoader};
use dash_state::{reduce, DashboardAction, DashboardState};
use std::fmt::Write;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Snapshot file, or a directory searched for .sps files
    pub path: PathBuf,

    /// Print the migrated execution-complete event instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Execution id stamped on the migrated events
    #[arg(long, default_value = "")]
    pub execution_id: String,
}

pub fn run(args: &SnapshotArgs, config: &RuntimeConfig) -> Result<(), CommandError> {
    let loader = SnapshotLoader::new(config.loader.clone()).with_execution_id(&args.execution_id);
    let paths = snapshot_paths(&loader, &args.path)?;
    log_info!("Loading snapshots", "count" => paths.len());

    let mut failed = 0;
    for path in &paths {
        match loader.load(path) {
            Ok(loaded) if args.json => println!("{}", render_json(&loaded)?),
            Ok(loaded) => print!("{}", render_summary(&loaded)),
            Err(err) => {
                eprintln!("error: {}", err);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(CommandError::SnapshotsFailed {
            failed,
            total: paths.len(),
        });
    }
    Ok(())
}

fn snapshot_paths(loader: &SnapshotLoader, path: &Path) -> Result<Vec<PathBuf>, CommandError> {
    if path.is_dir() {
        Ok(loader.discover(path)?)
    } else {
        Ok(vec![path.to_path_buf()])
    }
}

fn render_json(loaded: &LoadedSnapshot) -> Result<String, CommandError> {
    serde_json::to_string_pretty(&loaded.event).map_err(|source| CommandError::Json {
        path: loaded.path.display().to_string(),
        source,
    })
}

/// Summary of one snapshot as the viewer would show it once complete
pub fn render_summary(loaded: &LoadedSnapshot) -> String {
    let action = DashboardAction::ExecutionComplete(loaded.event.clone());
    let fresh = DashboardState::new();
    let state = reduce(&fresh, &action);
    let snapshot = &loaded.event.snapshot;

    let mut out = String::new();
    let _ = writeln!(out, "{}", loaded.path.display());
    let _ = writeln!(out, "  dashboard: {}", snapshot.layout.name);
    let _ = writeln!(
        out,
        "  schema:    {} -> {}",
        loaded.source_version, loaded.event.schema_version
    );
    let counts = state
        .status_counts()
        .iter()
        .map(|(status, count)| format!("{}={}", status, count))
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "  panels:    {} ({})", state.panels_map.len(), counts);
    let _ = writeln!(out, "  progress:  {}%", state.progress);
    out
}
