//! Error types for macro expansion.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from expanding a macro script.
///
/// Every directive-level error carries the file and the 1-based line of the
/// offending directive, plus the directive text as written.
#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("{}:{line}: include target not found: {directive}", .file.display())]
    MissingInclude {
        file: PathBuf,
        line: usize,
        directive: String,
    },

    #[error("{}:{line}: literal block is never terminated: {directive}", .file.display())]
    UnterminatedLiteral {
        file: PathBuf,
        line: usize,
        directive: String,
    },

    #[error("{}:{line}: cyclic include: {directive} (chain: {})", .file.display(), format_chain(.chain))]
    IncludeCycle {
        file: PathBuf,
        line: usize,
        directive: String,
        chain: Vec<PathBuf>,
    },

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PreprocessError {
    /// File the error was raised in.
    pub fn file(&self) -> &Path {
        match self {
            PreprocessError::MissingInclude { file, .. }
            | PreprocessError::UnterminatedLiteral { file, .. }
            | PreprocessError::IncludeCycle { file, .. } => file,
            PreprocessError::Read { path, .. } => path,
        }
    }

    /// Line of the offending directive, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            PreprocessError::MissingInclude { line, .. }
            | PreprocessError::UnterminatedLiteral { line, .. }
            | PreprocessError::IncludeCycle { line, .. } => Some(*line),
            PreprocessError::Read { .. } => None,
        }
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
