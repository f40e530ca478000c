//! JSON snapshot persistence for the task table.
//!
//! The full task list is written as one JSON document after every mutation
//! and loaded once at startup. Writes go through a temp file followed by a
//! rename, so a crash mid-write never truncates the durable copy. No other
//! state is persisted; position allocation is computed from the rows.

use std::io;
use std::path::{Path, PathBuf};

use taskdeck_model::Task;
use thiserror::Error;

/// Errors that can occur while loading or saving a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Failed to read the snapshot file.
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse the snapshot contents.
    #[error("failed to parse snapshot {path}: {source}")]
    Parse {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Failed to write the snapshot file.
    #[error("failed to write snapshot {path}: {source}")]
    Write {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Loads all tasks from a snapshot file.
///
/// A missing file is an empty store, not an error.
///
/// # Errors
///
/// Returns [`SnapshotError`] if the file exists but cannot be read or
/// parsed.
pub fn load(path: &Path) -> Result<Vec<Task>, SnapshotError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(SnapshotError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    serde_json::from_str(&contents).map_err(|e| SnapshotError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Saves all tasks to a snapshot file, replacing any previous contents.
///
/// Creates missing parent directories. The document is written to a sibling
/// temp file and renamed into place.
///
/// # Errors
///
/// Returns [`SnapshotError::Write`] on any filesystem failure.
pub fn save(path: &Path, tasks: &[Task]) -> Result<(), SnapshotError> {
    let write_err = |source: io::Error| SnapshotError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    // Serialize to a string first so the temp file only ever holds a
    // complete document.
    let contents = serde_json::to_string_pretty(tasks).map_err(|e| SnapshotError::Write {
        path: path.to_path_buf(),
        source: io::Error::other(e),
    })?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, contents).map_err(write_err)?;
    std::fs::rename(&tmp, path).map_err(write_err)
}
