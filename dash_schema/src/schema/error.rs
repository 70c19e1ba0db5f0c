use super::version::SchemaVersion;
use crate::logging::codes;
use std::fmt;

/// Event family a migration was running for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFamily {
    ExecutionStarted,
    ExecutionComplete,
    Snapshot,
    Panel,
}

impl EventFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventFamily::ExecutionStarted => "execution started",
            EventFamily::ExecutionComplete => "execution complete",
            EventFamily::Snapshot => "snapshot",
            EventFamily::Panel => "panel",
        }
    }
}

impl fmt::Display for EventFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema migration errors
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Unsupported dashboard {family} schema {version}")]
    UnsupportedSchemaVersion {
        family: EventFamily,
        version: String,
    },

    #[error("Invalid {family} payload: {source}")]
    InvalidEvent {
        family: EventFamily,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {family} payload: missing or non-string schema_version")]
    MissingSchemaVersion { family: EventFamily },

    #[error("Migration step for {expected} received a {found} event")]
    StepMismatch {
        expected: SchemaVersion,
        found: SchemaVersion,
    },
}

impl MigrationError {
    pub fn unsupported(family: EventFamily, version: &str) -> Self {
        Self::UnsupportedSchemaVersion {
            family,
            version: version.to_string(),
        }
    }

    pub fn invalid(family: EventFamily, source: serde_json::Error) -> Self {
        Self::InvalidEvent { family, source }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            MigrationError::UnsupportedSchemaVersion { .. } => {
                codes::schema::UNSUPPORTED_SCHEMA_VERSION
            }
            MigrationError::InvalidEvent { .. } | MigrationError::MissingSchemaVersion { .. } => {
                codes::schema::INVALID_EVENT_PAYLOAD
            }
            MigrationError::StepMismatch { .. } => codes::schema::MIGRATION_STEP_MISMATCH,
        }
    }
}
