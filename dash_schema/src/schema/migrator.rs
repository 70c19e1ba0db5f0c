//! Migration chain shared by every event family

use super::error::{EventFamily, MigrationError};
use super::version::SchemaVersion;
use crate::logging::codes;
use serde_json::Value;

/// Event that knows which schema it is shaped for
pub trait Versioned {
    fn schema_version(&self) -> SchemaVersion;
}

/// One step of a migration chain: lifts an event shaped for `version` to the
/// next version in the family.
pub struct MigrationStep<E> {
    pub version: SchemaVersion,
    pub up: fn(E) -> Result<E, MigrationError>,
}

/// Migrates raw events of one family to the latest schema
pub trait SchemaMigrator {
    type Output;

    const FAMILY: EventFamily;

    /// Versions this family has ever been published in, oldest first
    fn versions(&self) -> &'static [SchemaVersion];

    fn to_latest(&self, event: Value) -> Result<Self::Output, MigrationError>;

    /// Read and check the `schema_version` of a raw event
    fn source_version(&self, event: &Value) -> Result<SchemaVersion, MigrationError> {
        let raw = event
            .get("schema_version")
            .and_then(Value::as_str)
            .ok_or(MigrationError::MissingSchemaVersion {
                family: Self::FAMILY,
            })?;

        let version = SchemaVersion::parse_for(raw, Self::FAMILY)?;
        if !self.versions().contains(&version) {
            return Err(MigrationError::unsupported(Self::FAMILY, raw));
        }
        Ok(version)
    }
}

/// Apply every step from the event's version onwards, in order
pub fn run_steps<E: Versioned>(
    event: E,
    steps: &[MigrationStep<E>],
    family: EventFamily,
) -> Result<E, MigrationError> {
    let from = event.schema_version();
    if from.is_latest() {
        return Ok(event);
    }

    let start = steps
        .iter()
        .position(|step| step.version == from)
        .ok_or_else(|| MigrationError::unsupported(family, from.as_str()))?;

    let migrated = steps[start..].iter().try_fold(event, |current, step| {
        let found = current.schema_version();
        if found != step.version {
            return Err(MigrationError::StepMismatch {
                expected: step.version,
                found,
            });
        }
        let next = (step.up)(current)?;
        log_debug!("Applied schema migration step",
            "family" => family,
            "from" => step.version,
            "to" => next.schema_version()
        );
        Ok(next)
    })?;

    log_success!(codes::success::MIGRATION_COMPLETE, "Migrated event to latest schema",
        "family" => family,
        "from" => from,
        "to" => migrated.schema_version()
    );

    Ok(migrated)
}
