//! Dashboard event handlers
//!
//! Every handler is a pure function of the current state and one action. A
//! handler that ignores its action hands back `Cow::Borrowed` of the state it
//! was given, so callers can detect a no-op by pointer.

use super::actions::DashboardAction;
use super::panel_log::{initial_panels_log, record_panel_status};
use super::types::{DashboardRunState, DashboardState};
use crate::progress::calculate_progress;
use chrono::Utc;
use dash_schema::logging::{codes, with_execution_context};
use dash_schema::panels::PanelDefinition;
use dash_schema::schema::{
    migrate_panel_status_from, ControlsUpdatedEvent, ExecutionCompleteEvent, ExecutionErrorEvent,
    ExecutionStartedEvent, LeafNodesUpdatedEvent, PanelUpdate, SchemaVersion, WorkspaceErrorEvent,
};
use dash_schema::{log_debug, log_error, log_success, log_warning};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateMode {
    /// Overlay the update onto the existing panel
    Merge,
    /// The update is the whole panel
    Replace,
}

/// Apply one action to the state
pub fn reduce<'a>(state: &'a DashboardState, action: &DashboardAction) -> Cow<'a, DashboardState> {
    match action {
        DashboardAction::ExecutionStarted {
            event,
            source_version,
        } => execution_started(state, event, *source_version),
        DashboardAction::ExecutionComplete(event) => execution_complete(state, event),
        DashboardAction::ExecutionError(event) => execution_error(state, event),
        DashboardAction::ControlsUpdated(event) => controls_updated(state, event),
        DashboardAction::LeafNodesUpdated(event) | DashboardAction::LeafNodesComplete(event) => {
            leaf_nodes_updated(state, event)
        }
        DashboardAction::WorkspaceError(event) => workspace_error(state, event),
    }
}

pub fn controls_updated<'a>(
    state: &'a DashboardState,
    event: &ControlsUpdatedEvent,
) -> Cow<'a, DashboardState> {
    apply_panel_updates(state, &event.controls, UpdateMode::Merge)
}

pub fn leaf_nodes_updated<'a>(
    state: &'a DashboardState,
    event: &LeafNodesUpdatedEvent,
) -> Cow<'a, DashboardState> {
    apply_panel_updates(state, &event.nodes, UpdateMode::Replace)
}

fn apply_panel_updates<'a>(
    state: &'a DashboardState,
    updates: &[PanelUpdate],
    mode: UpdateMode,
) -> Cow<'a, DashboardState> {
    if state.state == DashboardRunState::Complete || updates.is_empty() {
        return Cow::Borrowed(state);
    }

    let (current, stale): (Vec<&PanelUpdate>, Vec<&PanelUpdate>) = updates
        .iter()
        .partition(|update| state.tracks(&update.execution_id));

    if !stale.is_empty() {
        log_debug!("Skipping panel updates for another execution",
            "skipped" => stale.len(),
            "tracked" => state.execution_id.as_deref().unwrap_or("none")
        );
    }

    if current.is_empty() {
        return Cow::Borrowed(state);
    }

    let version = state.schema_version.unwrap_or(SchemaVersion::LATEST);
    let mut next = state.clone();

    for update in current {
        let incoming = migrate_panel_status_from(&update.panel, version);
        let panel = match (mode, next.panels_map.get(&incoming.name)) {
            (UpdateMode::Merge, Some(existing)) => existing.merged_with(&incoming),
            _ => incoming,
        };

        let timestamp = update.timestamp.unwrap_or_else(Utc::now);
        record_panel_status(&mut next.panels_log, &panel, timestamp);
        next.panels_map.insert(panel.name.clone(), panel);
    }

    next.progress = calculate_progress(&next.panels_map);
    Cow::Owned(next)
}

/// A new execution replaces whatever was tracked before
pub fn execution_started<'a>(
    _state: &'a DashboardState,
    event: &ExecutionStartedEvent,
    source_version: SchemaVersion,
) -> Cow<'a, DashboardState> {
    with_execution_context(&event.execution_id, || {
        let started_at = event.start_time.unwrap_or_else(Utc::now);

        let next = DashboardState {
            state: DashboardRunState::Running,
            execution_id: Some(event.execution_id.clone()),
            schema_version: Some(source_version),
            layout: Some(event.layout.clone()),
            panels_log: initial_panels_log(&event.panels, started_at),
            progress: calculate_progress(&event.panels),
            panels_map: event.panels.clone(),
            inputs: event.inputs.clone(),
            variables: event.variables.clone(),
            snapshot: None,
            error: None,
            workspace_error: None,
        };

        log_success!(codes::success::EXECUTION_STARTED, "Dashboard execution started",
            "dashboard" => &event.layout.name,
            "panels" => event.panels.len(),
            "schema_version" => source_version
        );

        Cow::Owned(next)
    })
}

pub fn execution_complete<'a>(
    state: &'a DashboardState,
    event: &ExecutionCompleteEvent,
) -> Cow<'a, DashboardState> {
    if state.execution_id.is_some() && !state.tracks(&event.execution_id) {
        log_warning!(code = codes::events::STALE_EXECUTION, "Ignoring completion of another execution",
            "execution_id" => &event.execution_id,
            "tracked" => state.execution_id.as_deref().unwrap_or("none")
        );
        return Cow::Borrowed(state);
    }

    with_execution_context(&event.execution_id, || {
        let snapshot = &event.snapshot;
        let finished_at = snapshot.end_time.unwrap_or_else(Utc::now);

        let mut next = state.clone();
        for panel in snapshot.panels.values() {
            record_panel_status(&mut next.panels_log, panel, finished_at);
        }

        next.state = DashboardRunState::Complete;
        next.execution_id = Some(event.execution_id.clone());
        next.schema_version.get_or_insert(snapshot.schema_version);
        next.layout = Some(snapshot.layout.clone());
        next.panels_map = snapshot.panels.clone();
        next.inputs = snapshot.inputs.clone();
        next.variables = snapshot.variables.clone();
        next.progress = calculate_progress(&next.panels_map);
        next.snapshot = Some(snapshot.clone());

        log_success!(codes::success::EXECUTION_COMPLETE, "Dashboard execution complete",
            "dashboard" => &snapshot.layout.name,
            "panels" => snapshot.panels.len(),
            "progress" => next.progress
        );

        Cow::Owned(next)
    })
}

pub fn execution_error<'a>(
    state: &'a DashboardState,
    event: &ExecutionErrorEvent,
) -> Cow<'a, DashboardState> {
    if !state.tracks(&event.execution_id) {
        return Cow::Borrowed(state);
    }

    log_error!(codes::events::EXECUTION_FAILED, "Dashboard execution failed",
        "execution_id" => &event.execution_id,
        "error" => &event.error
    );

    let mut next = state.clone();
    next.state = DashboardRunState::Error;
    next.error = Some(event.error.clone());
    Cow::Owned(next)
}

pub fn workspace_error<'a>(
    state: &'a DashboardState,
    event: &WorkspaceErrorEvent,
) -> Cow<'a, DashboardState> {
    if state.workspace_error.as_deref() == Some(event.error.as_str()) {
        return Cow::Borrowed(state);
    }

    log_error!(codes::events::WORKSPACE_ERROR, "Workspace error", "error" => &event.error);

    let mut next = state.clone();
    next.workspace_error = Some(event.error.clone());
    Cow::Owned(next)
}

/// Panels whose status differs between two states
pub fn changed_panels<'s>(
    before: &DashboardState,
    after: &'s DashboardState,
) -> Vec<&'s PanelDefinition> {
    after
        .panels_map
        .iter()
        .filter(|(name, panel)| before.panels_map.get(*name) != Some(*panel))
        .map(|(_, panel)| panel)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::decode_event;
    use chrono::{DateTime, Duration, TimeZone};
    use dash_schema::panels::{LayoutNode, PanelStatus, PanelsMap};
    use dash_schema::schema::DashboardSnapshot;
    use serde_json::json;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 12, 22, 10, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn running_panels() -> PanelsMap {
        let mut panels = PanelsMap::new();
        for name in ["x.control.a", "x.control.b"] {
            panels.insert(
                name.to_string(),
                PanelDefinition::new(name, "control")
                    .with_title(name)
                    .with_status(PanelStatus::Running)
                    .with_property("severity", json!("high")),
            );
        }
        panels
    }

    fn started_state(version: SchemaVersion) -> DashboardState {
        let event = ExecutionStartedEvent {
            action: "execution_started".to_string(),
            schema_version: SchemaVersion::LATEST,
            execution_id: "1".to_string(),
            layout: LayoutNode::new("x.benchmark.b", "benchmark"),
            panels: running_panels(),
            inputs: Default::default(),
            variables: Default::default(),
            start_time: Some(at(0)),
        };
        execution_started(&DashboardState::new(), &event, version).into_owned()
    }

    fn control_update(execution_id: &str, status: PanelStatus, seconds: i64) -> PanelUpdate {
        PanelUpdate {
            execution_id: execution_id.to_string(),
            timestamp: Some(at(seconds)),
            panel: PanelDefinition::new("x.control.a", "control").with_status(status),
        }
    }

    fn controls(updates: Vec<PanelUpdate>) -> ControlsUpdatedEvent {
        ControlsUpdatedEvent { controls: updates }
    }

    fn is_unchanged(before: &DashboardState, after: &Cow<'_, DashboardState>) -> bool {
        matches!(after, Cow::Borrowed(_)) && std::ptr::eq(before, after.as_ref())
    }

    #[test]
    fn test_execution_started_replaces_state() {
        let state = started_state(SchemaVersion::V20220614);

        assert_eq!(state.state, DashboardRunState::Running);
        assert_eq!(state.execution_id.as_deref(), Some("1"));
        assert_eq!(state.schema_version, Some(SchemaVersion::V20220614));
        assert_eq!(state.progress, 0);
        assert_eq!(state.panels_log["x.control.a"].len(), 1);
    }

    #[test]
    fn test_update_for_tracked_execution() {
        let state = started_state(SchemaVersion::LATEST);
        let event = controls(vec![control_update("1", PanelStatus::Complete, 4)]);

        let next = controls_updated(&state, &event);

        assert!(matches!(next, Cow::Owned(_)));
        assert_eq!(next.progress, 50);
        let changed = changed_panels(&state, &next);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].name, "x.control.a");
        assert_eq!(next.panels_map["x.control.a"].status, Some(PanelStatus::Complete));
        assert_eq!(next.panels_map["x.control.b"], state.panels_map["x.control.b"]);

        let log = &next.panels_log["x.control.a"];
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].execution_time_ms, Some(4000));
    }

    #[test]
    fn test_update_for_stale_execution_is_ignored() {
        let state = started_state(SchemaVersion::LATEST);
        let event = controls(vec![control_update("2", PanelStatus::Complete, 4)]);

        let next = controls_updated(&state, &event);

        assert!(is_unchanged(&state, &next));
        assert_eq!(next.progress, 0);
    }

    #[test]
    fn test_mixed_batch_applies_only_current_items() {
        let state = started_state(SchemaVersion::LATEST);
        let mut stale = control_update("2", PanelStatus::Error, 2);
        stale.panel.name = "x.control.b".to_string();
        let event = controls(vec![stale, control_update("1", PanelStatus::Complete, 3)]);

        let next = controls_updated(&state, &event);

        assert_eq!(next.panels_map["x.control.a"].status, Some(PanelStatus::Complete));
        assert_eq!(next.panels_map["x.control.b"].status, Some(PanelStatus::Running));
    }

    #[test]
    fn test_empty_or_complete_is_ignored() {
        let state = started_state(SchemaVersion::LATEST);
        let next = controls_updated(&state, &controls(vec![]));
        assert!(is_unchanged(&state, &next));

        let mut complete = state.clone();
        complete.state = DashboardRunState::Complete;
        let event = controls(vec![control_update("1", PanelStatus::Complete, 1)]);
        let next = controls_updated(&complete, &event);
        assert!(is_unchanged(&complete, &next));

        let next = leaf_nodes_updated(&complete, &LeafNodesUpdatedEvent { nodes: event.controls });
        assert!(is_unchanged(&complete, &next));
    }

    #[test]
    fn test_leaf_nodes_empty_or_stale_is_ignored() {
        let state = started_state(SchemaVersion::LATEST);

        let next = leaf_nodes_updated(&state, &LeafNodesUpdatedEvent { nodes: vec![] });
        assert!(is_unchanged(&state, &next));

        let stale = LeafNodesUpdatedEvent {
            nodes: vec![
                control_update("2", PanelStatus::Complete, 1),
                control_update("3", PanelStatus::Error, 2),
            ],
        };
        let next = leaf_nodes_updated(&state, &stale);
        assert!(is_unchanged(&state, &next));
        assert_eq!(next.panels_log["x.control.a"].len(), 1);
    }

    #[test]
    fn test_controls_merge_and_leaf_nodes_replace() {
        let state = started_state(SchemaVersion::LATEST);

        let merged = controls_updated(&state, &controls(vec![control_update("1", PanelStatus::Complete, 1)]));
        assert_eq!(
            merged.panels_map["x.control.a"].properties.get("severity"),
            Some(&json!("high"))
        );
        assert_eq!(merged.panels_map["x.control.a"].title.as_deref(), Some("x.control.a"));

        let replaced = leaf_nodes_updated(
            &state,
            &LeafNodesUpdatedEvent {
                nodes: vec![control_update("1", PanelStatus::Complete, 1)],
            },
        );
        assert!(replaced.panels_map["x.control.a"].properties.is_empty());
        assert!(replaced.panels_map["x.control.a"].title.is_none());
    }

    #[test]
    fn test_update_status_migrated_with_started_version() {
        let mut state = started_state(SchemaVersion::V20220929);
        state.panels_map.get_mut("x.control.a").unwrap().status = Some(PanelStatus::Blocked);

        let next = controls_updated(&state, &controls(vec![control_update("1", PanelStatus::Ready, 1)]));
        assert_eq!(next.panels_map["x.control.a"].status, Some(PanelStatus::Running));

        let latest = started_state(SchemaVersion::LATEST);
        let next = controls_updated(&latest, &controls(vec![control_update("1", PanelStatus::Ready, 1)]));
        assert_eq!(next.panels_map["x.control.a"].status, Some(PanelStatus::Ready));
    }

    #[test]
    fn test_repeated_status_is_logged_once() {
        let state = started_state(SchemaVersion::LATEST);
        let event = controls(vec![control_update("1", PanelStatus::Running, 1)]);

        let next = controls_updated(&state, &event);

        assert_eq!(next.panels_log["x.control.a"].len(), 1);
    }

    fn complete_event(execution_id: &str) -> ExecutionCompleteEvent {
        let mut panels = running_panels();
        for panel in panels.values_mut() {
            panel.status = Some(PanelStatus::Complete);
        }
        ExecutionCompleteEvent {
            action: "execution_complete".to_string(),
            schema_version: SchemaVersion::LATEST,
            execution_id: execution_id.to_string(),
            snapshot: DashboardSnapshot {
                schema_version: SchemaVersion::LATEST,
                layout: LayoutNode::new("x.benchmark.b", "benchmark"),
                panels,
                inputs: Default::default(),
                variables: Default::default(),
                search_path: vec![],
                start_time: Some(at(0)),
                end_time: Some(at(10)),
            },
        }
    }

    #[test]
    fn test_execution_complete() {
        let state = started_state(SchemaVersion::LATEST);

        let next = execution_complete(&state, &complete_event("1"));

        assert_eq!(next.state, DashboardRunState::Complete);
        assert_eq!(next.progress, 100);
        assert!(next.snapshot.is_some());
        assert_eq!(next.panels_log["x.control.b"][1].execution_time_ms, Some(10_000));

        let stale = execution_complete(&state, &complete_event("2"));
        assert!(is_unchanged(&state, &stale));
    }

    #[test]
    fn test_execution_complete_without_started_execution() {
        let state = DashboardState::new();
        let next = execution_complete(&state, &complete_event(""));

        assert_eq!(next.state, DashboardRunState::Complete);
        assert_eq!(next.schema_version, Some(SchemaVersion::LATEST));
    }

    #[test]
    fn test_execution_error_only_for_tracked_execution() {
        let state = started_state(SchemaVersion::LATEST);

        let other = execution_error(
            &state,
            &ExecutionErrorEvent {
                execution_id: "9".to_string(),
                error: "boom".to_string(),
            },
        );
        assert!(is_unchanged(&state, &other));

        let next = execution_error(
            &state,
            &ExecutionErrorEvent {
                execution_id: "1".to_string(),
                error: "boom".to_string(),
            },
        );
        assert_eq!(next.state, DashboardRunState::Error);
        assert_eq!(next.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_workspace_error_is_recorded_once() {
        let state = DashboardState::new();
        let event = WorkspaceErrorEvent {
            error: "mod.sp: parse failure".to_string(),
        };

        let next = workspace_error(&state, &event).into_owned();
        assert_eq!(next.workspace_error.as_deref(), Some("mod.sp: parse failure"));

        let again = workspace_error(&next, &event);
        assert!(is_unchanged(&next, &again));
    }

    #[test]
    fn test_replay_decoded_events() {
        let events = vec![
            json!({
                "action": "execution_started",
                "schema_version": "20220614",
                "execution_id": "1",
                "layout": {"name": "d", "panel_type": "dashboard"},
                "panels": {
                    "d": {"name": "d", "panel_type": "dashboard", "status": "ready"},
                    "c": {"name": "c", "panel_type": "chart", "status": "ready"},
                    "t": {"name": "t", "panel_type": "table", "status": "ready"},
                },
                "start_time": "2022-06-14T10:00:00Z",
            }),
            json!({
                "action": "leaf_nodes_complete",
                "nodes": [{"execution_id": "1", "timestamp": "2022-06-14T10:00:01Z",
                           "node": {"name": "c", "panel_type": "chart", "status": "complete"}}],
            }),
            json!({"action": "dashboard_metadata"}),
        ];

        let mut state = DashboardState::new();
        for event in events {
            if let Some(action) = decode_event(event).unwrap() {
                state = reduce(&state, &action).into_owned();
            }
        }

        assert_eq!(state.state, DashboardRunState::Running);
        assert_eq!(state.progress, 50);
        assert_eq!(state.panels_map["t"].status, Some(PanelStatus::Running));
    }
}
