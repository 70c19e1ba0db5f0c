use super::error::{EventFamily, MigrationError};
use super::events::ExecutionStartedEvent;
use super::migrator::{run_steps, MigrationStep, SchemaMigrator, Versioned};
use super::panel_status::migrate_panel_statuses;
use super::version::SchemaVersion;
use serde_json::Value;

impl Versioned for ExecutionStartedEvent {
    fn schema_version(&self) -> SchemaVersion {
        self.schema_version
    }
}

const VERSIONS: &[SchemaVersion] = &[SchemaVersion::V20220614, SchemaVersion::V20221222];

const STEPS: &[MigrationStep<ExecutionStartedEvent>] = &[MigrationStep {
    version: SchemaVersion::V20220614,
    up: from_20220614,
}];

fn from_20220614(event: ExecutionStartedEvent) -> Result<ExecutionStartedEvent, MigrationError> {
    Ok(ExecutionStartedEvent {
        schema_version: SchemaVersion::V20221222,
        panels: migrate_panel_statuses(&event.panels, SchemaVersion::V20220614),
        ..event
    })
}

/// Lifts `execution_started` events to the latest schema
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecutionStartedSchemaMigrator;

impl ExecutionStartedSchemaMigrator {
    pub fn new() -> Self {
        Self
    }

    /// Migrate an already-decoded event
    pub fn migrate(
        &self,
        event: ExecutionStartedEvent,
    ) -> Result<ExecutionStartedEvent, MigrationError> {
        run_steps(event, STEPS, Self::FAMILY)
    }
}

impl SchemaMigrator for ExecutionStartedSchemaMigrator {
    type Output = ExecutionStartedEvent;

    const FAMILY: EventFamily = EventFamily::ExecutionStarted;

    fn versions(&self) -> &'static [SchemaVersion] {
        VERSIONS
    }

    fn to_latest(&self, event: Value) -> Result<Self::Output, MigrationError> {
        self.source_version(&event)?;
        let event: ExecutionStartedEvent = serde_json::from_value(event)
            .map_err(|source| MigrationError::invalid(Self::FAMILY, source))?;
        self.migrate(event)
    }
}
