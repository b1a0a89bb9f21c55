//! Fatal build errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a build before any file is processed.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("unknown file type: {}", .path.display())]
    UnknownFileType { path: PathBuf },
}
