use super::error::{EventFamily, MigrationError};
use super::events::{
    actions, DashboardSnapshot, ExecutionCompleteEvent, FlatExecutionCompleteEvent,
    VersionedExecutionComplete,
};
use super::execution_complete::ExecutionCompleteSchemaMigrator;
use super::migrator::SchemaMigrator;
use super::version::SchemaVersion;
use serde_json::Value;

const VERSIONS: &[SchemaVersion] = &[
    SchemaVersion::V20220614,
    SchemaVersion::V20220929,
    SchemaVersion::V20221222,
];

/// Wrap a snapshot as the execution complete event of the same version
pub fn to_execution_complete(
    snapshot: DashboardSnapshot,
    execution_id: &str,
) -> VersionedExecutionComplete {
    match snapshot.schema_version {
        SchemaVersion::V20220614 => {
            let DashboardSnapshot {
                schema_version,
                layout,
                panels,
                inputs,
                variables,
                search_path,
                start_time,
                end_time,
            } = snapshot;
            VersionedExecutionComplete::V20220614(FlatExecutionCompleteEvent {
                action: actions::EXECUTION_COMPLETE.to_string(),
                schema_version,
                execution_id: execution_id.to_string(),
                layout,
                panels,
                inputs,
                variables,
                search_path,
                start_time,
                end_time,
            })
        }
        SchemaVersion::V20220929 => VersionedExecutionComplete::V20220929(wrap(snapshot, execution_id)),
        SchemaVersion::V20221222 => VersionedExecutionComplete::V20221222(wrap(snapshot, execution_id)),
    }
}

fn wrap(snapshot: DashboardSnapshot, execution_id: &str) -> ExecutionCompleteEvent {
    ExecutionCompleteEvent {
        action: actions::EXECUTION_COMPLETE.to_string(),
        schema_version: snapshot.schema_version,
        execution_id: execution_id.to_string(),
        snapshot,
    }
}

/// Turns snapshot data of any version into a latest execution complete event
#[derive(Debug, Default, Clone)]
pub struct SnapshotDataToExecutionCompleteSchemaMigrator {
    execution_id: String,
}

impl SnapshotDataToExecutionCompleteSchemaMigrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execution id stamped on the produced event; empty when not set
    pub fn with_execution_id(mut self, execution_id: impl Into<String>) -> Self {
        self.execution_id = execution_id.into();
        self
    }

    pub fn migrate(
        &self,
        snapshot: DashboardSnapshot,
    ) -> Result<ExecutionCompleteEvent, MigrationError> {
        let event = to_execution_complete(snapshot, &self.execution_id);
        ExecutionCompleteSchemaMigrator::new().migrate(event)
    }
}

impl SchemaMigrator for SnapshotDataToExecutionCompleteSchemaMigrator {
    type Output = ExecutionCompleteEvent;

    const FAMILY: EventFamily = EventFamily::Snapshot;

    fn versions(&self) -> &'static [SchemaVersion] {
        VERSIONS
    }

    fn to_latest(&self, event: Value) -> Result<Self::Output, MigrationError> {
        self.source_version(&event)?;
        let snapshot: DashboardSnapshot = serde_json::from_value(event)
            .map_err(|source| MigrationError::invalid(Self::FAMILY, source))?;
        self.migrate(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::PanelStatus;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn snapshot(version: &str) -> Value {
        json!({
            "schema_version": version,
            "layout": {"name": "d", "panel_type": "dashboard", "children": [{"name": "t", "panel_type": "table"}]},
            "panels": {
                "d": {"name": "d", "panel_type": "dashboard", "status": "complete"},
                "t": {"name": "t", "panel_type": "table", "status": "ready"},
            },
            "inputs": {},
            "variables": {"var.env": "prod"},
            "search_path": ["aws"],
            "start_time": "2022-09-29T10:00:00Z",
            "end_time": "2022-09-29T10:00:02Z",
        })
    }

    #[test]
    fn test_every_version_reaches_latest() {
        let migrator = SnapshotDataToExecutionCompleteSchemaMigrator::new();
        for version in ["20220614", "20220929", "20221222"] {
            let event = migrator.to_latest(snapshot(version)).unwrap();
            assert!(event.schema_version.is_latest(), "version {}", version);
            assert!(event.snapshot.schema_version.is_latest());
            assert_eq!(event.action, actions::EXECUTION_COMPLETE);
            assert_eq!(event.snapshot.variables.get("var.env"), Some(&json!("prod")));
        }
    }

    #[test]
    fn test_ready_status_is_migrated_for_old_snapshots() {
        let migrator = SnapshotDataToExecutionCompleteSchemaMigrator::new();

        let old = migrator.to_latest(snapshot("20220614")).unwrap();
        assert_eq!(old.panels()["t"].status, Some(PanelStatus::Running));

        let latest = migrator.to_latest(snapshot("20221222")).unwrap();
        assert_eq!(latest.panels()["t"].status, Some(PanelStatus::Ready));
    }

    #[test]
    fn test_execution_id_is_stamped() {
        let event = SnapshotDataToExecutionCompleteSchemaMigrator::new()
            .with_execution_id("snap-1")
            .to_latest(snapshot("20220929"))
            .unwrap();
        assert_eq!(event.execution_id, "snap-1");

        let event = SnapshotDataToExecutionCompleteSchemaMigrator::new()
            .to_latest(snapshot("20220929"))
            .unwrap();
        assert!(event.execution_id.is_empty());
    }

    #[test]
    fn test_to_execution_complete_keeps_version() {
        let snapshot: DashboardSnapshot = serde_json::from_value(snapshot("20220614")).unwrap();
        let event = to_execution_complete(snapshot, "1");
        assert_eq!(event.schema_version(), SchemaVersion::V20220614);
        assert_matches!(event, VersionedExecutionComplete::V20220614(_));
    }

    #[test]
    fn test_unknown_snapshot_version() {
        let err = SnapshotDataToExecutionCompleteSchemaMigrator::new()
            .to_latest(snapshot("20210101"))
            .unwrap_err();
        assert_matches!(err, MigrationError::UnsupportedSchemaVersion { family: EventFamily::Snapshot, .. });
        assert!(err.to_string().contains("20210101"));
    }
}
