use chrono::{DateTime, Utc};
use dash_schema::panels::{LayoutNode, PanelStatus, PanelsMap};
use dash_schema::schema::{DashboardSnapshot, SchemaVersion};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle of the tracked dashboard execution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardRunState {
    #[default]
    Initialized,
    Running,
    Complete,
    Error,
}

impl DashboardRunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardRunState::Initialized => "initialized",
            DashboardRunState::Running => "running",
            DashboardRunState::Complete => "complete",
            DashboardRunState::Error => "error",
        }
    }
}

impl fmt::Display for DashboardRunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed status transition of a panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelLogEntry {
    pub status: PanelStatus,

    pub timestamp: DateTime<Utc>,

    /// Panel title at the time of the transition
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Milliseconds since the panel was first logged; set once it finishes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<i64>,
}

/// Status history keyed by panel name
pub type PanelsLog = BTreeMap<String, Vec<PanelLogEntry>>;

/// Everything the viewer knows about the current dashboard execution
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardState {
    pub state: DashboardRunState,

    /// Execution currently tracked; messages for any other id are stale
    pub execution_id: Option<String>,

    /// Schema the tracked execution was started with, before migration
    pub schema_version: Option<SchemaVersion>,

    pub layout: Option<LayoutNode>,

    pub panels_map: PanelsMap,

    pub panels_log: PanelsLog,

    pub progress: u8,

    pub inputs: Map<String, Value>,

    pub variables: Map<String, Value>,

    /// Final result, present once the execution is complete
    pub snapshot: Option<DashboardSnapshot>,

    /// Execution error reported by the backend
    pub error: Option<String>,

    /// Workspace-level error, independent of any execution
    pub workspace_error: Option<String>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether messages for `execution_id` belong to the tracked execution
    pub fn tracks(&self, execution_id: &str) -> bool {
        self.execution_id.as_deref() == Some(execution_id)
    }

    /// Number of panels currently in each status
    pub fn status_counts(&self) -> BTreeMap<PanelStatus, usize> {
        let mut counts = BTreeMap::new();
        for status in self.panels_map.values().filter_map(|panel| panel.status) {
            *counts.entry(status).or_insert(0) += 1;
        }
        counts
    }
}
