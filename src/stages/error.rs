//! Error types for transformation stages.

use std::path::PathBuf;
use thiserror::Error;

use crate::preprocess::PreprocessError;

/// Errors from a single transformation hop.
///
/// Compiler failures keep the input text so a failing build can be
/// reproduced outside the pipeline.
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error("{command} failed: {message}")]
    Compile {
        command: String,
        message: String,
        original: String,
    },

    #[error("no {stage} command configured")]
    NotConfigured { stage: &'static str },

    #[error("cannot run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid data literal: {message}")]
    Data { message: String, original: String },

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StageError {
    /// The text the failing stage was given, when it kept it.
    pub fn original(&self) -> Option<&str> {
        match self {
            StageError::Compile { original, .. } | StageError::Data { original, .. } => {
                Some(original)
            }
            _ => None,
        }
    }
}
