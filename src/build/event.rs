use std::path::{Path, PathBuf};

/// A change the orchestrator reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    Added(PathBuf),
    Changed(PathBuf),
    Removed(PathBuf),
    /// The initial scan has reported every pre-existing file.
    Ready,
}

impl BuildEvent {
    pub fn path(&self) -> Option<&Path> {
        match self {
            BuildEvent::Added(p) | BuildEvent::Changed(p) | BuildEvent::Removed(p) => Some(p),
            BuildEvent::Ready => None,
        }
    }

    /// Short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            BuildEvent::Added(_) => "add",
            BuildEvent::Changed(_) => "change",
            BuildEvent::Removed(_) => "unlink",
            BuildEvent::Ready => "ready",
        }
    }
}
