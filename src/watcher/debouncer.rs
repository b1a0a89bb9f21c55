//! Shared debouncing logic for file change events.
//!
//! Debouncing collapses bursts of events for one path (editor auto-save,
//! formatters, write-then-rename) into a single rebuild.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::build::BuildEvent;

/// Debounces add/change events by path.
///
/// Records the latest event per path and releases it once the path has been
/// quiet for the configured duration. A zero duration disables debouncing.
#[derive(Debug)]
pub struct Debouncer {
    /// Pending events: path -> (last change, event to dispatch).
    pending: HashMap<PathBuf, (Instant, BuildEvent)>,
    /// How long a file must be stable before processing.
    duration: Duration,
}

impl Debouncer {
    /// Create a new debouncer with the given duration in milliseconds.
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            pending: HashMap::new(),
            duration: Duration::from_millis(debounce_ms),
        }
    }

    /// True if events should be dispatched as they arrive.
    pub fn is_immediate(&self) -> bool {
        self.duration.is_zero()
    }

    /// Record an event. Resets the debounce timer for its path.
    ///
    /// An `Added` that is still pending survives a later `Changed`.
    pub fn record(&mut self, event: BuildEvent) {
        let Some(path) = event.path().map(Path::to_path_buf) else {
            return;
        };
        let now = Instant::now();
        match self.pending.get_mut(&path) {
            Some((last, pending)) => {
                *last = now;
                if !matches!(pending, BuildEvent::Added(_)) {
                    *pending = event;
                }
            }
            None => {
                self.pending.insert(path, (now, event));
            }
        }
    }

    /// Drop a pending event (e.g., when the file is deleted).
    pub fn remove(&mut self, path: &Path) {
        self.pending.remove(path);
    }

    /// Take all events whose path has been stable for the debounce duration,
    /// oldest first.
    pub fn take_ready(&mut self) -> Vec<BuildEvent> {
        let now = Instant::now();
        let mut ready = Vec::new();

        self.pending.retain(|_, (last_change, event)| {
            if now.duration_since(*last_change) >= self.duration {
                ready.push((*last_change, event.clone()));
                false
            } else {
                true
            }
        });

        ready.sort_by_key(|(at, _)| *at);
        ready.into_iter().map(|(_, event)| event).collect()
    }

    /// Check if there are any pending changes.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
