//! Initial enumeration of the source tree.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::error::WatchError;
use crate::source::is_excluded;

/// Every file under `root`, sorted by name per directory.
///
/// Dependency and hidden directories are pruned, not just filtered.
/// Unreadable entries are logged and skipped.
pub fn initial_scan(root: &Path) -> Result<Vec<PathBuf>, WatchError> {
    if !root.is_dir() {
        return Err(WatchError::ScanFailed {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry.path(), root));

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => tracing::warn!("[scan] skipping unreadable entry: {e}"),
        }
    }

    crate::debug_event!("scan", "found", "{} files under {}", files.len(), root.display());
    Ok(files)
}
