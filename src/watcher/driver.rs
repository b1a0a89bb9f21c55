//! Event loop feeding the orchestrator.
//!
//! ```text
//! notify (started first) --unbounded--+
//!                                     |
//! walkdir scan -> Added.. -> Ready ---+--> Debouncer? --> Orchestrator
//! ```
//!
//! The watcher is running before the scan begins, so changes made while
//! the scan is in progress are queued and handled as live events.

use std::future::Future;
use std::path::{Path, PathBuf};

use notify::{Event, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};

use super::debouncer::Debouncer;
use super::error::WatchError;
use super::event::map_event;
use super::scanner::initial_scan;
use crate::build::{BuildEvent, Flow, Orchestrator};

/// How often pending debounced events are checked.
const TICK: Duration = Duration::from_millis(50);

/// Scans a root and, in watch mode, keeps feeding live events.
pub struct WatchDriver {
    root: PathBuf,
    watch: bool,
    debouncer: Debouncer,
}

impl WatchDriver {
    pub fn builder() -> WatchDriverBuilder {
        WatchDriverBuilder::new()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run until the scan ends (scan-once) or Ctrl-C (watch mode).
    pub async fn run(self, orchestrator: &mut Orchestrator) -> Result<(), WatchError> {
        self.run_until(orchestrator, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("[watch] cannot listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until the scan ends (scan-once) or `shutdown` completes.
    pub async fn run_until(
        mut self,
        orchestrator: &mut Orchestrator,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), WatchError> {
        // Start watching before the scan so nothing slips between the two
        let live = if self.watch {
            Some(self.start_watcher()?)
        } else {
            None
        };

        crate::log_event!("watch", "scanning", "{}", self.root.display());
        for path in initial_scan(&self.root)? {
            if orchestrator.handle_event(BuildEvent::Added(path)) == Flow::Stop {
                return Ok(());
            }
        }
        if orchestrator.handle_event(BuildEvent::Ready) == Flow::Stop {
            return Ok(());
        }

        let Some((_watcher, mut event_rx)) = live else {
            return Ok(());
        };

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                res = event_rx.recv() => {
                    match res {
                        Some(Ok(event)) => {
                            if self.dispatch(orchestrator, &event) == Flow::Stop {
                                break;
                            }
                        }
                        Some(Err(e)) => tracing::error!("[watch] file watch error: {e}"),
                        None => {
                            tracing::warn!("[watch] event channel closed");
                            break;
                        }
                    }
                }

                _ = sleep(TICK), if self.debouncer.has_pending() => {
                    for event in self.debouncer.take_ready() {
                        if orchestrator.handle_event(event) == Flow::Stop {
                            return Ok(());
                        }
                    }
                }

                _ = &mut shutdown => {
                    orchestrator.interrupt();
                    break;
                }
            }
        }
        Ok(())
    }

    fn start_watcher(
        &self,
    ) -> Result<
        (
            notify::RecommendedWatcher,
            mpsc::UnboundedReceiver<notify::Result<Event>>,
        ),
        WatchError,
    > {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })?;
        watcher
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: self.root.clone(),
                reason: e.to_string(),
            })?;
        crate::debug_event!("watch", "watching", "{}", self.root.display());
        Ok((watcher, rx))
    }

    /// Hand one notify event to the orchestrator, directly or via the debouncer.
    fn dispatch(&mut self, orchestrator: &mut Orchestrator, event: &Event) -> Flow {
        for build_event in map_event(event) {
            let flow = match build_event {
                BuildEvent::Removed(ref path) => {
                    self.debouncer.remove(path);
                    orchestrator.handle_event(build_event)
                }
                _ if self.debouncer.is_immediate() => orchestrator.handle_event(build_event),
                _ => {
                    self.debouncer.record(build_event);
                    Flow::Continue
                }
            };
            if flow == Flow::Stop {
                return Flow::Stop;
            }
        }
        Flow::Continue
    }
}

/// Builder for [`WatchDriver`].
pub struct WatchDriverBuilder {
    root: Option<PathBuf>,
    watch: bool,
    debounce_ms: u64,
}

impl WatchDriverBuilder {
    pub fn new() -> Self {
        Self {
            root: None,
            watch: false,
            debounce_ms: 0,
        }
    }

    /// Directory to scan and watch. Defaults to the current directory.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Keep running after the initial scan.
    pub fn watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    /// Debounce duration for live add/change events; 0 dispatches immediately.
    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn build(self) -> Result<WatchDriver, WatchError> {
        let root = match self.root {
            Some(root) => root,
            None => std::env::current_dir().map_err(|e| WatchError::InitFailed {
                reason: format!("cannot determine current directory: {e}"),
            })?,
        };
        Ok(WatchDriver {
            root,
            watch: self.watch,
            debouncer: Debouncer::new(self.debounce_ms),
        })
    }
}

impl Default for WatchDriverBuilder {
    fn default() -> Self {
        Self::new()
    }
}
