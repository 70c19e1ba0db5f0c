//! # Dashboard State
//!
//! Everything that turns migrated dashboard events into something a viewer can
//! render:
//! - [`progress`] - share of data panels that have finished
//! - [`state`] - the dashboard state, decoded actions and the reducer
//! - [`loader`] - `.sps` snapshot files
//! - [`checks`] - benchmark check results grouped into a [`checks::CheckNode`] tree

pub mod checks;
pub mod loader;
pub mod progress;
pub mod state;

pub use checks::{
    collect_check_results, group_check_results, parse_grouping_config, CheckGroupingError,
    CheckNode, CheckNodeStates, CheckResult, CheckSummary,
};
pub use loader::{discover_snapshots, load_snapshot_file, snapshot_action, LoaderError};
pub use progress::calculate_progress;
pub use state::{decode_event, reduce, DashboardAction, DashboardRunState, DashboardState};
