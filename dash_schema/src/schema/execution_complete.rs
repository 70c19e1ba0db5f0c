use super::error::{EventFamily, MigrationError};
use super::events::{
    DashboardSnapshot, ExecutionCompleteEvent, FlatExecutionCompleteEvent,
    VersionedExecutionComplete,
};
use super::migrator::{run_steps, MigrationStep, SchemaMigrator, Versioned};
use super::panel_status::migrate_panel_statuses;
use super::version::SchemaVersion;
use serde_json::Value;

impl Versioned for VersionedExecutionComplete {
    fn schema_version(&self) -> SchemaVersion {
        VersionedExecutionComplete::schema_version(self)
    }
}

const VERSIONS: &[SchemaVersion] = &[
    SchemaVersion::V20220614,
    SchemaVersion::V20220929,
    SchemaVersion::V20221222,
];

const STEPS: &[MigrationStep<VersionedExecutionComplete>] = &[
    MigrationStep {
        version: SchemaVersion::V20220614,
        up: from_20220614,
    },
    MigrationStep {
        version: SchemaVersion::V20220929,
        up: from_20220929,
    },
];

/// Result fields move under `snapshot`
fn from_20220614(
    event: VersionedExecutionComplete,
) -> Result<VersionedExecutionComplete, MigrationError> {
    let flat = match event {
        VersionedExecutionComplete::V20220614(flat) => flat,
        other => {
            return Err(MigrationError::StepMismatch {
                expected: SchemaVersion::V20220614,
                found: other.schema_version(),
            })
        }
    };

    let FlatExecutionCompleteEvent {
        action,
        execution_id,
        layout,
        panels,
        inputs,
        variables,
        search_path,
        start_time,
        end_time,
        ..
    } = flat;

    Ok(VersionedExecutionComplete::V20220929(ExecutionCompleteEvent {
        action,
        schema_version: SchemaVersion::V20220929,
        execution_id,
        snapshot: DashboardSnapshot {
            schema_version: SchemaVersion::V20220929,
            layout,
            panels: migrate_panel_statuses(&panels, SchemaVersion::V20220614),
            inputs,
            variables,
            search_path,
            start_time,
            end_time,
        },
    }))
}

fn from_20220929(
    event: VersionedExecutionComplete,
) -> Result<VersionedExecutionComplete, MigrationError> {
    let event = match event {
        VersionedExecutionComplete::V20220929(event) => event,
        other => {
            return Err(MigrationError::StepMismatch {
                expected: SchemaVersion::V20220929,
                found: other.schema_version(),
            })
        }
    };

    let panels = migrate_panel_statuses(&event.snapshot.panels, SchemaVersion::V20220929);
    Ok(VersionedExecutionComplete::V20221222(ExecutionCompleteEvent {
        schema_version: SchemaVersion::V20221222,
        snapshot: DashboardSnapshot {
            schema_version: SchemaVersion::V20221222,
            panels,
            ..event.snapshot
        },
        ..event
    }))
}

/// Lifts `execution_complete` events to the latest schema
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecutionCompleteSchemaMigrator;

impl ExecutionCompleteSchemaMigrator {
    pub fn new() -> Self {
        Self
    }

    /// Migrate an already-decoded event
    pub fn migrate(
        &self,
        event: VersionedExecutionComplete,
    ) -> Result<ExecutionCompleteEvent, MigrationError> {
        match run_steps(event, STEPS, Self::FAMILY)? {
            VersionedExecutionComplete::V20221222(latest) => Ok(latest),
            other => Err(MigrationError::StepMismatch {
                expected: SchemaVersion::LATEST,
                found: other.schema_version(),
            }),
        }
    }

    /// Decode a raw event into the shape its version uses
    pub fn decode(&self, event: Value) -> Result<VersionedExecutionComplete, MigrationError> {
        let version = self.source_version(&event)?;
        let invalid = |source| MigrationError::invalid(Self::FAMILY, source);

        Ok(match version {
            SchemaVersion::V20220614 => {
                VersionedExecutionComplete::V20220614(serde_json::from_value(event).map_err(invalid)?)
            }
            SchemaVersion::V20220929 => {
                VersionedExecutionComplete::V20220929(serde_json::from_value(event).map_err(invalid)?)
            }
            SchemaVersion::V20221222 => {
                VersionedExecutionComplete::V20221222(serde_json::from_value(event).map_err(invalid)?)
            }
        })
    }
}

impl SchemaMigrator for ExecutionCompleteSchemaMigrator {
    type Output = ExecutionCompleteEvent;

    const FAMILY: EventFamily = EventFamily::ExecutionComplete;

    fn versions(&self) -> &'static [SchemaVersion] {
        VERSIONS
    }

    fn to_latest(&self, event: Value) -> Result<Self::Output, MigrationError> {
        let versioned = self.decode(event)?;
        self.migrate(versioned)
    }
}
