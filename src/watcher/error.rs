//! Error types for the watch driver.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from watching or scanning the source tree.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("Cannot watch path {}: {reason}", .path.display())]
    PathWatchFailed { path: PathBuf, reason: String },

    #[error("Cannot scan {}: {reason}", .path.display())]
    ScanFailed { path: PathBuf, reason: String },
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}
