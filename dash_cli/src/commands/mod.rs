//! Subcommands of the `dashview` binary

pub mod checks;
pub mod replay;
pub mod snapshot;

use dash_state::state::EventDecodeError;
use dash_state::{CheckGroupingError, LoaderError};

/// Failures that end a command with a non-zero exit status
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid event on line {line}: {source}")]
    Event {
        line: usize,
        #[source]
        source: EventDecodeError,
    },

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Grouping(#[from] CheckGroupingError),

    #[error("{failed} of {total} snapshots failed to load")]
    SnapshotsFailed { failed: usize, total: usize },
}

fn read_file(path: &std::path::Path) -> Result<String, CommandError> {
    std::fs::read_to_string(path).map_err(|source| CommandError::Io {
        path: path.display().to_string(),
        source,
    })
}
