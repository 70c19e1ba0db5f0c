//! # Check Results Module
//!
//! Benchmark check results and their presentation as a grouped tree.
//!
//! ## Core Types
//! - [`CheckResult`] - one control result with its control and benchmark ancestry
//! - [`CheckNode`] - node of the grouped tree, with folded summary and status
//! - [`CheckNodeStates`] - expand/collapse table carried across regroupings
//! - [`CheckGroupingError`] - invalid grouping configuration
//!
//! ## Usage
//! ```rust
//! use dash_state::checks::{group_check_results, parse_grouping_config, CheckNodeStates};
//!
//! let config = parse_grouping_config("benchmark,control,result").unwrap();
//! let grouped = group_check_results(&[], &config, &CheckNodeStates::new(), false).unwrap();
//! assert_eq!(grouped.root.summary().total(), 0);
//! ```

pub mod config;
pub mod error;
pub mod flatten;
pub mod grouping;
pub mod node;
pub mod types;

pub use config::{
    format_grouping_config, parse_grouping_config, validate_grouping, CheckGroupSpec,
    CheckGrouping,
};
pub use error::CheckGroupingError;
pub use flatten::{collect_check_results, BenchmarkRun, ControlRun, ControlRunResult, ControlRunStatus};
pub use grouping::{group_check_results, CheckNodeState, CheckNodeStates, GroupedChecks, OTHER_GROUP};
pub use node::{CheckNode, CheckNodeKind, CheckNodeStatus};
pub use types::*;
