//! Typed dashboard event payloads
//!
//! The execution-started shape is stable across its versions. Execution
//! complete changed shape at 20220929, when the result fields moved into a
//! nested `snapshot`.

use super::version::SchemaVersion;
use crate::panels::{LayoutNode, PanelDefinition, PanelsMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod actions {
    pub const EXECUTION_STARTED: &str = "execution_started";
    pub const EXECUTION_COMPLETE: &str = "execution_complete";
    pub const EXECUTION_ERROR: &str = "execution_error";
    pub const CONTROLS_UPDATED: &str = "controls_updated";
    pub const LEAF_NODES_UPDATED: &str = "leaf_nodes_updated";
    pub const LEAF_NODES_COMPLETE: &str = "leaf_nodes_complete";
    pub const WORKSPACE_ERROR: &str = "workspace_error";
}

fn execution_started_action() -> String {
    actions::EXECUTION_STARTED.to_string()
}

fn execution_complete_action() -> String {
    actions::EXECUTION_COMPLETE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStartedEvent {
    #[serde(default = "execution_started_action")]
    pub action: String,
    pub schema_version: SchemaVersion,
    pub execution_id: String,
    pub layout: LayoutNode,
    #[serde(default)]
    pub panels: PanelsMap,
    #[serde(default)]
    pub inputs: Map<String, Value>,
    #[serde(default)]
    pub variables: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
}

/// Self-contained execution result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub schema_version: SchemaVersion,
    pub layout: LayoutNode,
    #[serde(default)]
    pub panels: PanelsMap,
    #[serde(default)]
    pub inputs: Map<String, Value>,
    #[serde(default)]
    pub variables: Map<String, Value>,
    #[serde(default)]
    pub search_path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// Flat execution complete payload used by the 20220614 schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatExecutionCompleteEvent {
    #[serde(default = "execution_complete_action")]
    pub action: String,
    pub schema_version: SchemaVersion,
    pub execution_id: String,
    pub layout: LayoutNode,
    #[serde(default)]
    pub panels: PanelsMap,
    #[serde(default)]
    pub inputs: Map<String, Value>,
    #[serde(default)]
    pub variables: Map<String, Value>,
    #[serde(default)]
    pub search_path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// Execution complete payload from 20220929 onwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionCompleteEvent {
    #[serde(default = "execution_complete_action")]
    pub action: String,
    pub schema_version: SchemaVersion,
    pub execution_id: String,
    pub snapshot: DashboardSnapshot,
}

impl ExecutionCompleteEvent {
    pub fn panels(&self) -> &PanelsMap {
        &self.snapshot.panels
    }
}

/// Execution complete event at any supported version
#[derive(Debug, Clone, PartialEq)]
pub enum VersionedExecutionComplete {
    V20220614(FlatExecutionCompleteEvent),
    V20220929(ExecutionCompleteEvent),
    V20221222(ExecutionCompleteEvent),
}

impl VersionedExecutionComplete {
    pub fn schema_version(&self) -> SchemaVersion {
        match self {
            VersionedExecutionComplete::V20220614(_) => SchemaVersion::V20220614,
            VersionedExecutionComplete::V20220929(_) => SchemaVersion::V20220929,
            VersionedExecutionComplete::V20221222(_) => SchemaVersion::V20221222,
        }
    }

    pub fn execution_id(&self) -> &str {
        match self {
            VersionedExecutionComplete::V20220614(event) => &event.execution_id,
            VersionedExecutionComplete::V20220929(event)
            | VersionedExecutionComplete::V20221222(event) => &event.execution_id,
        }
    }
}

/// Panel updates carried by `controls_updated`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlsUpdatedEvent {
    #[serde(default)]
    pub controls: Vec<PanelUpdate>,
}

/// Panel updates carried by `leaf_nodes_updated` and `leaf_nodes_complete`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafNodesUpdatedEvent {
    #[serde(default)]
    pub nodes: Vec<PanelUpdate>,
}

/// One panel update tagged with the execution it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelUpdate {
    pub execution_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(alias = "control", alias = "node")]
    pub panel: PanelDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionErrorEvent {
    pub execution_id: String,
    #[serde(default)]
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceErrorEvent {
    #[serde(default)]
    pub error: String,
}
