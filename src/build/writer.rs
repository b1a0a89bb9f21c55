//! Artifact output.
//!
//! Writes are full overwrites through a temp file in the target directory,
//! so a reader never observes a half-written artifact. Failures are logged
//! here and handed back for the caller's bookkeeping; they never abort a
//! session.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Writes and removes derived artifacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactWriter;

impl ArtifactWriter {
    pub fn new() -> Self {
        Self
    }

    /// Replace `path` with `content`.
    pub fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let result = write_atomic(path, content);
        if let Err(e) = &result {
            tracing::error!("[write] cannot write {}: {e}", path.display());
        }
        result
    }

    /// Delete `path`. Returns `false` if it was already absent.
    pub fn remove(&self, path: &Path) -> io::Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                tracing::error!("[write] cannot remove {}: {e}", path.display());
                Err(e)
            }
        }
    }
}

fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/main.js");
        let writer = ArtifactWriter::new();

        writer.write(&path, "first\nsecond\n").unwrap();
        writer.write(&path, "third\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "third\n");

        // No temp files left behind
        let entries = fs::read_dir(dir.path().join("out")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        // Parent is a regular file
        let err = ArtifactWriter::new().write(&blocker.join("a.js"), "x").unwrap_err();
        assert_ne!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_remove_tolerates_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.js");
        let writer = ArtifactWriter::new();
        assert!(!writer.remove(&path).unwrap());
        fs::write(&path, "").unwrap();
        assert!(writer.remove(&path).unwrap());
        assert!(!path.exists());
    }
}
