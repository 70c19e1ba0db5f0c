//! # Event Schema Migration
//!
//! Every event family the backend emits has been published in several
//! schema versions. Each family has a migrator that checks the incoming
//! `schema_version` against the versions that family was published in and
//! then applies the family's steps in order until the event is shaped for
//! [`SchemaVersion::LATEST`].
//!
//! | family             | chain                              |
//! |--------------------|------------------------------------|
//! | execution started  | 20220614 → 20221222                |
//! | execution complete | 20220614 → 20220929 → 20221222     |
//! | snapshot           | any version → execution complete   |

pub mod error;
pub mod events;
pub mod execution_complete;
pub mod execution_started;
pub mod migrator;
pub mod panel_status;
pub mod snapshot;
pub mod version;

pub use error::{EventFamily, MigrationError};
pub use events::{
    actions, ControlsUpdatedEvent, DashboardSnapshot, ExecutionCompleteEvent,
    ExecutionErrorEvent, ExecutionStartedEvent, FlatExecutionCompleteEvent,
    LeafNodesUpdatedEvent, PanelUpdate, VersionedExecutionComplete, WorkspaceErrorEvent,
};
pub use execution_complete::ExecutionCompleteSchemaMigrator;
pub use execution_started::ExecutionStartedSchemaMigrator;
pub use migrator::{MigrationStep, SchemaMigrator, Versioned};
pub use panel_status::{migrate_panel_status, migrate_panel_status_from, migrate_panel_statuses};
pub use snapshot::{to_execution_complete, SnapshotDataToExecutionCompleteSchemaMigrator};
pub use version::SchemaVersion;
