//! `dashview replay`: feed a recorded event stream through the reducer

use super::{read_file, CommandError};
use clap::Args;
use dash_schema::{log_debug, log_info};
use dash_state::state::{changed_panels, PanelsLog};
use dash_state::{decode_event, reduce, DashboardRunState, DashboardState};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Newline-delimited JSON events, one backend message per line
    pub events: PathBuf,

    /// Print the panel status log once the stream is exhausted
    #[arg(long)]
    pub log: bool,
}

/// Outcome of one event that changed the state
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayStep {
    pub line: usize,
    pub action: &'static str,
    pub state: DashboardRunState,
    pub progress: u8,
    pub changed: Vec<String>,
}

pub fn run(args: &ReplayArgs) -> Result<(), CommandError> {
    let source = read_file(&args.events)?;
    let (state, steps) = replay_events(&source)?;

    for step in &steps {
        println!(
            "{:>4} {:<20} state={:<11} progress={:>3}%  {}",
            step.line,
            step.action,
            step.state.as_str(),
            step.progress,
            step.changed.join(",")
        );
    }

    if let Some(error) = &state.workspace_error {
        println!("workspace error: {}", error);
    }
    if let Some(error) = &state.error {
        println!("execution error: {}", error);
    }

    if args.log {
        print!("{}", render_panel_log(&state.panels_log));
    }
    Ok(())
}

/// Reduce every event in `source`; blank lines are skipped.
///
/// Only events that changed the state produce a step.
pub fn replay_events(source: &str) -> Result<(DashboardState, Vec<ReplayStep>), CommandError> {
    let mut state = DashboardState::new();
    let mut steps = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(line).map_err(|source| CommandError::Json {
            path: format!("line {}", line_number),
            source,
        })?;
        let action = match decode_event(value).map_err(|source| CommandError::Event {
            line: line_number,
            source,
        })? {
            Some(action) => action,
            None => continue,
        };

        let next = match reduce(&state, &action) {
            Cow::Owned(next) => next,
            Cow::Borrowed(_) => {
                log_debug!("Event left state unchanged",
                    "line" => line_number,
                    "action" => action.name()
                );
                continue;
            }
        };

        let changed = changed_panels(&state, &next)
            .into_iter()
            .map(|panel| panel.name.clone())
            .collect();
        steps.push(ReplayStep {
            line: line_number,
            action: action.name(),
            state: next.state,
            progress: next.progress,
            changed,
        });
        state = next;
    }

    log_info!("Replay finished",
        "applied" => steps.len(),
        "state" => state.state,
        "progress" => state.progress
    );
    Ok((state, steps))
}

pub fn render_panel_log(log: &PanelsLog) -> String {
    let mut out = String::new();
    for (panel, entries) in log {
        let _ = writeln!(out, "{}", panel);
        for entry in entries {
            let _ = write!(
                out,
                "  {} {:<10} {}",
                entry.timestamp.to_rfc3339(),
                entry.status.as_str(),
                entry.title
            );
            if let Some(ms) = entry.execution_time_ms {
                let _ = write!(out, " ({}ms)", ms);
            }
            if let Some(error) = &entry.error {
                let _ = write!(out, " error: {}", error);
            }
            out.push('\n');
        }
    }
    out
}
