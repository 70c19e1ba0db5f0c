//! Dashboard schema core: logging, configuration, the panel model and the
//! event schema migrators shared by the state crate and the CLI.

#[macro_use]
pub mod logging;
pub mod config;
pub mod panels;
pub mod schema;

pub use config::RuntimeConfig;
pub use panels::{LayoutNode, PanelDefinition, PanelStatus, PanelType, PanelsMap};
pub use schema::{
    DashboardSnapshot, ExecutionCompleteEvent, ExecutionCompleteSchemaMigrator,
    ExecutionStartedEvent, ExecutionStartedSchemaMigrator, MigrationError, SchemaMigrator,
    SchemaVersion, SnapshotDataToExecutionCompleteSchemaMigrator,
};
