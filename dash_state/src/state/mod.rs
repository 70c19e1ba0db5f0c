//! # Dashboard State Module
//!
//! Holds the state of the tracked dashboard execution and the reducer that
//! folds decoded backend messages into it.
//!
//! ## Core Types
//! - [`DashboardState`] - run state, panels, panel log, progress and snapshot
//! - [`DashboardAction`] - a decoded, migrated message
//! - [`EventDecodeError`] - errors raised while decoding a raw message

pub mod actions;
pub mod panel_log;
pub mod reducer;
pub mod types;

pub use actions::{decode_event, DashboardAction, EventDecodeError};
pub use panel_log::{initial_panels_log, record_panel_status};
pub use reducer::{
    changed_panels, controls_updated, execution_complete, execution_error, execution_started,
    leaf_nodes_updated, reduce, workspace_error,
};
pub use types::{DashboardRunState, DashboardState, PanelLogEntry, PanelsLog};
