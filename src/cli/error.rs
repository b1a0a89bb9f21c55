//! Fatal command-line errors.

use std::path::PathBuf;
use thiserror::Error;

use crate::build::BuildError;
use crate::imports::RegistryError;
use crate::preprocess::PreprocessError;
use crate::watcher::WatchError;

/// Errors that end the process with a non-zero exit code.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("only one directory may be given ({} and {})", .first.display(), .second.display())]
    MultipleRoots { first: PathBuf, second: PathBuf },

    #[error("invalid path on command line: {}", .path.display())]
    InvalidPath { path: PathBuf },

    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("{message}")]
    Init { message: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
