//! Source vs artifact timestamp comparison.

use std::path::Path;
use std::time::SystemTime;

use super::session::BuildSession;

/// Modification time, or `None` if the file is gone or unreadable.
pub fn mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Whether `artifact` must be rebuilt from `source`.
///
/// Always true under `force` or once the initial scan is over: live edits
/// are always rebuilt. During the initial scan the artifact is up to date
/// iff it exists and is not older than its source. A source that vanished
/// in the meantime needs nothing.
pub fn needs_rebuild(source: &Path, artifact: &Path, session: &BuildSession) -> bool {
    if session.force() || session.scan_complete() {
        return true;
    }
    let Some(source_time) = mtime(source) else {
        return false;
    };
    match mtime(artifact) {
        Some(artifact_time) => artifact_time < source_time,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::session::SessionOptions;
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(path: &Path, at: SystemTime) {
        if !path.exists() {
            fs::write(path, "").unwrap();
        }
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(at)
            .unwrap();
    }

    fn pair(dir: &TempDir) -> (PathBuf, PathBuf) {
        (dir.path().join("a.coffee"), dir.path().join("a.js"))
    }

    fn session(force: bool, ready: bool) -> BuildSession {
        let mut s = BuildSession::new(SessionOptions {
            force,
            ..Default::default()
        });
        if ready {
            s.mark_ready();
        }
        s
    }

    #[test]
    fn test_initial_scan_is_incremental() {
        let dir = TempDir::new().unwrap();
        let (src, art) = pair(&dir);
        let base = SystemTime::now() - Duration::from_secs(100);

        touch(&src, base);
        assert!(needs_rebuild(&src, &art, &session(false, false)), "missing artifact");

        touch(&art, base);
        assert!(!needs_rebuild(&src, &art, &session(false, false)), "equal mtimes");

        touch(&art, base + Duration::from_secs(10));
        assert!(!needs_rebuild(&src, &art, &session(false, false)), "newer artifact");

        touch(&src, base + Duration::from_secs(20));
        assert!(needs_rebuild(&src, &art, &session(false, false)), "newer source");
    }

    #[test]
    fn test_force_or_ready_always_rebuilds() {
        let dir = TempDir::new().unwrap();
        let (src, art) = pair(&dir);
        let base = SystemTime::now() - Duration::from_secs(100);
        touch(&src, base);
        touch(&art, base + Duration::from_secs(50));

        assert!(!needs_rebuild(&src, &art, &session(false, false)));
        assert!(needs_rebuild(&src, &art, &session(true, false)));
        assert!(needs_rebuild(&src, &art, &session(false, true)));
        assert!(needs_rebuild(&src, &art, &session(true, true)));
    }

    #[test]
    fn test_vanished_source_needs_nothing() {
        let dir = TempDir::new().unwrap();
        let (src, art) = pair(&dir);
        assert!(!needs_rebuild(&src, &art, &session(false, false)));
    }
}
