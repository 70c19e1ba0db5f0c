//! Decoding raw dashboard messages into reducer actions

use chrono::Utc;
use dash_schema::logging::codes;
use dash_schema::schema::{
    actions, ControlsUpdatedEvent, ExecutionCompleteEvent, ExecutionCompleteSchemaMigrator,
    ExecutionErrorEvent, ExecutionStartedEvent, ExecutionStartedSchemaMigrator,
    LeafNodesUpdatedEvent, MigrationError, PanelUpdate, SchemaMigrator, SchemaVersion,
    WorkspaceErrorEvent,
};
use dash_schema::{log_debug, log_warning};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// An event the reducer knows how to apply
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardAction {
    /// Execution started, already migrated to the latest schema
    ExecutionStarted {
        event: ExecutionStartedEvent,
        /// Schema the backend published the event in
        source_version: SchemaVersion,
    },
    ExecutionComplete(ExecutionCompleteEvent),
    ExecutionError(ExecutionErrorEvent),
    ControlsUpdated(ControlsUpdatedEvent),
    LeafNodesUpdated(LeafNodesUpdatedEvent),
    LeafNodesComplete(LeafNodesUpdatedEvent),
    WorkspaceError(WorkspaceErrorEvent),
}

impl DashboardAction {
    pub fn name(&self) -> &'static str {
        match self {
            DashboardAction::ExecutionStarted { .. } => actions::EXECUTION_STARTED,
            DashboardAction::ExecutionComplete(_) => actions::EXECUTION_COMPLETE,
            DashboardAction::ExecutionError(_) => actions::EXECUTION_ERROR,
            DashboardAction::ControlsUpdated(_) => actions::CONTROLS_UPDATED,
            DashboardAction::LeafNodesUpdated(_) => actions::LEAF_NODES_UPDATED,
            DashboardAction::LeafNodesComplete(_) => actions::LEAF_NODES_COMPLETE,
            DashboardAction::WorkspaceError(_) => actions::WORKSPACE_ERROR,
        }
    }

    pub fn workspace_error(error: impl Into<String>) -> Self {
        DashboardAction::WorkspaceError(WorkspaceErrorEvent {
            error: error.into(),
        })
    }
}

/// Errors raised while decoding a raw message
#[derive(Debug, thiserror::Error)]
pub enum EventDecodeError {
    #[error("Event has no action")]
    MissingAction,

    #[error("Event migration failed: {0}")]
    Migration(#[from] MigrationError),

    #[error("Invalid {action} payload: {source}")]
    Payload {
        action: String,
        #[source]
        source: serde_json::Error,
    },
}

impl EventDecodeError {
    pub fn error_code(&self) -> dash_schema::logging::Code {
        match self {
            EventDecodeError::MissingAction | EventDecodeError::Payload { .. } => {
                codes::schema::INVALID_EVENT_PAYLOAD
            }
            EventDecodeError::Migration(err) => err.error_code(),
        }
    }
}

fn payload<T: DeserializeOwned>(action: &str, value: Value) -> Result<T, EventDecodeError> {
    serde_json::from_value(value).map_err(|source| EventDecodeError::Payload {
        action: action.to_string(),
        source,
    })
}

/// Stamp updates that arrived without a timestamp with the receive time
fn stamp(updates: &mut [PanelUpdate]) {
    let now = Utc::now();
    for update in updates.iter_mut().filter(|update| update.timestamp.is_none()) {
        update.timestamp = Some(now);
    }
}

/// Route a raw message by its `action`, migrating versioned payloads.
///
/// Messages with an action the reducer does not handle decode to `None`.
pub fn decode_event(value: Value) -> Result<Option<DashboardAction>, EventDecodeError> {
    let action = value
        .get("action")
        .and_then(Value::as_str)
        .ok_or(EventDecodeError::MissingAction)?
        .to_string();

    log_debug!("Decoding dashboard event", "action" => &action);

    let decoded = match action.as_str() {
        actions::EXECUTION_STARTED => {
            let migrator = ExecutionStartedSchemaMigrator::new();
            let source_version = migrator.source_version(&value)?;
            DashboardAction::ExecutionStarted {
                event: migrator.to_latest(value)?,
                source_version,
            }
        }
        actions::EXECUTION_COMPLETE => {
            DashboardAction::ExecutionComplete(ExecutionCompleteSchemaMigrator::new().to_latest(value)?)
        }
        actions::EXECUTION_ERROR => DashboardAction::ExecutionError(payload(&action, value)?),
        actions::CONTROLS_UPDATED => {
            let mut event: ControlsUpdatedEvent = payload(&action, value)?;
            stamp(&mut event.controls);
            DashboardAction::ControlsUpdated(event)
        }
        actions::LEAF_NODES_UPDATED | actions::LEAF_NODES_COMPLETE => {
            let mut event: LeafNodesUpdatedEvent = payload(&action, value)?;
            stamp(&mut event.nodes);
            if action == actions::LEAF_NODES_COMPLETE {
                DashboardAction::LeafNodesComplete(event)
            } else {
                DashboardAction::LeafNodesUpdated(event)
            }
        }
        actions::WORKSPACE_ERROR => DashboardAction::WorkspaceError(payload(&action, value)?),
        _ => {
            log_warning!(code = codes::events::UNKNOWN_ACTION, "Ignoring unhandled dashboard action",
                "action" => &action
            );
            return Ok(None);
        }
    };

    Ok(Some(decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use dash_schema::panels::PanelStatus;
    use serde_json::json;

    #[test]
    fn test_execution_started_keeps_source_version() {
        let action = decode_event(json!({
            "action": "execution_started",
            "schema_version": "20220614",
            "execution_id": "1",
            "layout": {"name": "d", "panel_type": "dashboard"},
            "panels": {"c": {"name": "c", "panel_type": "chart", "status": "ready"}},
        }))
        .unwrap();

        assert_matches!(action, Some(DashboardAction::ExecutionStarted { event, source_version }) => {
            assert_eq!(source_version, SchemaVersion::V20220614);
            assert!(event.schema_version.is_latest());
            assert_eq!(event.panels["c"].status, Some(PanelStatus::Running));
        });
    }

    #[test]
    fn test_controls_updated_are_stamped() {
        let action = decode_event(json!({
            "action": "controls_updated",
            "controls": [
                {"execution_id": "1", "control": {"name": "c", "panel_type": "control", "status": "complete"}},
            ],
        }))
        .unwrap();

        assert_matches!(action, Some(DashboardAction::ControlsUpdated(event)) => {
            assert_eq!(event.controls.len(), 1);
            assert!(event.controls[0].timestamp.is_some());
        });
    }

    #[test]
    fn test_leaf_nodes_complete_is_distinct() {
        let action = decode_event(json!({
            "action": "leaf_nodes_complete",
            "nodes": [],
        }))
        .unwrap();
        assert_matches!(action, Some(DashboardAction::LeafNodesComplete(_)));
    }

    #[test]
    fn test_unknown_action_decodes_to_none() {
        let action = decode_event(json!({"action": "dashboard_metadata"})).unwrap();
        assert!(action.is_none());
    }

    #[test]
    fn test_decode_errors() {
        assert_matches!(decode_event(json!({})), Err(EventDecodeError::MissingAction));

        let err = decode_event(json!({
            "action": "execution_complete",
            "schema_version": "20990101",
        }))
        .unwrap_err();
        assert_matches!(err, EventDecodeError::Migration(MigrationError::UnsupportedSchemaVersion { .. }));
        assert!(err.to_string().contains("20990101"));

        let err = decode_event(json!({"action": "execution_error"})).unwrap_err();
        assert_matches!(err, EventDecodeError::Payload { ref action, .. } if action == "execution_error");
    }
}
