//! Per-invocation build state.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::staleness::mtime;

/// Flags fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    /// Rebuild every artifact regardless of timestamps.
    pub force: bool,
    /// Only report errors.
    pub quiet: bool,
    pub debug: bool,
    /// Run compiled scripts after building them.
    pub execute: bool,
    /// Keep running after the initial scan.
    pub watch: bool,
}

/// Orchestrator state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// Initial directory enumeration in progress.
    Scanning,
    /// Scan complete, reacting to live events.
    Watching,
    /// Scan complete, nothing more to do.
    Done,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildState::Scanning => f.write_str("scanning"),
            BuildState::Watching => f.write_str("watching"),
            BuildState::Done => f.write_str("done"),
        }
    }
}

/// Running totals reported at session end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Artifacts successfully written.
    pub processed: usize,
    /// External commands started.
    pub executed: usize,
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} processed, {} executed", self.processed, self.executed)
    }
}

/// State of one `brew` invocation.
///
/// Owned by the orchestrator and mutated only from its event handler.
#[derive(Debug)]
pub struct BuildSession {
    options: SessionOptions,
    state: BuildState,
    counters: Counters,
    /// Artifacts this session wrote, with the mtime they had right after.
    written: HashMap<PathBuf, SystemTime>,
    /// Artifacts this session deleted whose removal event is still pending.
    removed: HashSet<PathBuf>,
}

impl BuildSession {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            state: BuildState::Scanning,
            counters: Counters::default(),
            written: HashMap::new(),
            removed: HashSet::new(),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn force(&self) -> bool {
        self.options.force
    }

    /// True once the initial scan has reported `Ready`.
    pub fn scan_complete(&self) -> bool {
        self.state != BuildState::Scanning
    }

    /// Leave `Scanning`. Returns the new state; later calls are no-ops.
    pub fn mark_ready(&mut self) -> BuildState {
        if self.state == BuildState::Scanning {
            self.state = if self.options.watch {
                BuildState::Watching
            } else {
                BuildState::Done
            };
        }
        self.state
    }

    /// End a watching session (interrupt).
    pub fn finish(&mut self) {
        self.state = BuildState::Done;
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub(crate) fn count_processed(&mut self) {
        self.counters.processed += 1;
    }

    pub(crate) fn count_executed(&mut self) {
        self.counters.executed += 1;
    }

    /// Remember an artifact this session just wrote.
    pub(crate) fn record_write(&mut self, path: &Path) {
        self.removed.remove(path);
        if let Some(time) = mtime(path) {
            self.written.insert(path.to_path_buf(), time);
        }
    }

    /// Remember an artifact this session just deleted.
    pub(crate) fn record_removal(&mut self, path: &Path) {
        self.written.remove(path);
        self.removed.insert(path.to_path_buf());
    }

    /// Consume the removal record for `path`. True if this session deleted
    /// it and the matching event has not been seen yet.
    pub(crate) fn take_removal(&mut self, path: &Path) -> bool {
        self.removed.remove(path)
    }

    pub(crate) fn forget(&mut self, path: &Path) {
        self.written.remove(path);
    }

    /// True if `path` is an artifact this session wrote and nobody has
    /// touched since.
    pub fn is_own_write(&self, path: &Path) -> bool {
        match (self.written.get(path), mtime(path)) {
            (Some(recorded), Some(current)) => *recorded == current,
            _ => false,
        }
    }
}
