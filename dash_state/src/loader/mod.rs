//! Snapshot file loading
//!
//! Snapshots are exported dashboard results (`.sps`, JSON). Loading one runs
//! it through the snapshot migrator so callers always see a latest-schema
//! execution complete event.

use crate::state::DashboardAction;
use dash_schema::config::compile_time::loader::{MAX_SNAPSHOT_FILE_SIZE, SNAPSHOT_EXTENSION};
use dash_schema::config::LoaderPreferences;
use dash_schema::logging::{codes, Code};
use dash_schema::schema::{
    ExecutionCompleteEvent, MigrationError, SchemaMigrator, SchemaVersion,
    SnapshotDataToExecutionCompleteSchemaMigrator,
};
use dash_schema::{log_debug, log_error, log_success};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Snapshot loading errors
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("Snapshot not found: {path}")]
    NotFound { path: String },

    #[error("Invalid snapshot extension: expected .{expected}, found {extension:?}")]
    InvalidExtension {
        expected: &'static str,
        extension: Option<String>,
    },

    #[error("Snapshot too large: {size} bytes (max: {max_size})")]
    TooLarge { size: u64, max_size: u64 },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Snapshot {path} could not be migrated: {source}")]
    Migration {
        path: String,
        #[source]
        source: MigrationError,
    },

    #[error("Failed to scan {path}: {source}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },
}

impl LoaderError {
    pub fn error_code(&self) -> Code {
        match self {
            LoaderError::NotFound { .. } => codes::loader::SNAPSHOT_NOT_FOUND,
            LoaderError::InvalidExtension { .. } => codes::loader::INVALID_EXTENSION,
            LoaderError::TooLarge { .. } => codes::loader::SNAPSHOT_TOO_LARGE,
            LoaderError::Io { .. } | LoaderError::Walk { .. } => codes::loader::IO_ERROR,
            LoaderError::Parse { .. } => codes::loader::SNAPSHOT_PARSE_FAILED,
            LoaderError::Migration { source, .. } => source.error_code(),
        }
    }
}

/// A snapshot migrated to the latest schema
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSnapshot {
    pub path: PathBuf,
    /// Schema version the file was written in
    pub source_version: SchemaVersion,
    pub event: ExecutionCompleteEvent,
}

#[derive(Debug, Clone)]
pub struct SnapshotLoader {
    preferences: LoaderPreferences,
    execution_id: String,
}

impl Default for SnapshotLoader {
    fn default() -> Self {
        Self::new(LoaderPreferences::default())
    }
}

impl SnapshotLoader {
    pub fn new(preferences: LoaderPreferences) -> Self {
        Self {
            preferences,
            execution_id: String::new(),
        }
    }

    /// Execution id stamped on loaded events
    pub fn with_execution_id(mut self, execution_id: impl Into<String>) -> Self {
        self.execution_id = execution_id.into();
        self
    }

    fn max_size(&self) -> u64 {
        self.preferences.max_snapshot_size.min(MAX_SNAPSHOT_FILE_SIZE)
    }

    fn check_extension(&self, path: &Path) -> Result<(), LoaderError> {
        if !self.preferences.require_sps_extension {
            return Ok(());
        }
        let extension = path.extension().and_then(|ext| ext.to_str());
        if extension == Some(SNAPSHOT_EXTENSION) {
            Ok(())
        } else {
            Err(LoaderError::InvalidExtension {
                expected: SNAPSHOT_EXTENSION,
                extension: extension.map(str::to_string),
            })
        }
    }

    pub fn load(&self, path: &Path) -> Result<LoadedSnapshot, LoaderError> {
        let result = self.load_inner(path);
        if let Err(err) = &result {
            log_error!(err.error_code(), "Failed to load snapshot",
                "path" => path.display(),
                "error" => err
            );
        }
        result
    }

    fn load_inner(&self, path: &Path) -> Result<LoadedSnapshot, LoaderError> {
        let display = path.display().to_string();
        self.check_extension(path)?;

        let metadata = fs::metadata(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => LoaderError::NotFound {
                path: display.clone(),
            },
            _ => LoaderError::Io {
                path: display.clone(),
                source,
            },
        })?;

        let max_size = self.max_size();
        if metadata.len() > max_size {
            return Err(LoaderError::TooLarge {
                size: metadata.len(),
                max_size,
            });
        }

        let contents = fs::read_to_string(path).map_err(|source| LoaderError::Io {
            path: display.clone(),
            source,
        })?;
        let value: Value = serde_json::from_str(&contents).map_err(|source| LoaderError::Parse {
            path: display.clone(),
            source,
        })?;

        let migrator =
            SnapshotDataToExecutionCompleteSchemaMigrator::new().with_execution_id(&self.execution_id);
        let migration_error = |source| LoaderError::Migration {
            path: display.clone(),
            source,
        };
        let source_version = migrator.source_version(&value).map_err(migration_error)?;
        let event = migrator.to_latest(value).map_err(migration_error)?;

        log_success!(codes::success::SNAPSHOT_LOADED, "Loaded snapshot",
            "path" => &display,
            "schema_version" => source_version,
            "panels" => event.snapshot.panels.len()
        );

        Ok(LoadedSnapshot {
            path: path.to_path_buf(),
            source_version,
            event,
        })
    }

    /// Load a snapshot as a reducer action; failures become a workspace error
    pub fn action(&self, path: &Path) -> DashboardAction {
        match self.load(path) {
            Ok(loaded) => DashboardAction::ExecutionComplete(loaded.event),
            Err(err) => DashboardAction::workspace_error(format!(
                "Unable to open snapshot {}: {}",
                path.display(),
                err
            )),
        }
    }

    /// Snapshot files below `dir`, sorted by path
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, LoaderError> {
        let mut found = Vec::new();
        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = entry.map_err(|source| LoaderError::Walk {
                path: dir.display().to_string(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let is_snapshot = entry.path().extension().and_then(|ext| ext.to_str())
                == Some(SNAPSHOT_EXTENSION);
            if is_snapshot {
                found.push(entry.into_path());
            }
        }
        found.sort();

        log_debug!("Discovered snapshot files",
            "dir" => dir.display(),
            "count" => found.len()
        );
        Ok(found)
    }
}

/// Load and migrate one snapshot file with default preferences
pub fn load_snapshot_file(path: &Path) -> Result<LoadedSnapshot, LoaderError> {
    SnapshotLoader::default().load(path)
}

/// Load a snapshot as an action, converting failures into a workspace error
pub fn snapshot_action(path: &Path) -> DashboardAction {
    SnapshotLoader::default().action(path)
}

/// Find `.sps` files below `dir`
pub fn discover_snapshots(dir: &Path) -> Result<Vec<PathBuf>, LoaderError> {
    SnapshotLoader::default().discover(dir)
}
