//! File watching for `brew --watch`.
//!
//! # Architecture
//!
//! ```text
//! WatchDriver
//!   - notify::RecommendedWatcher (recursive, started before the scan)
//!   - walkdir initial scan -> Added.. Ready
//!   - optional Debouncer for add/change events
//!   - feeds BuildEvents to the Orchestrator, one at a time
//! ```

mod debouncer;
mod driver;
mod error;
mod event;
mod scanner;

pub use debouncer::Debouncer;
pub use driver::{WatchDriver, WatchDriverBuilder};
pub use error::WatchError;
pub use event::map_event;
pub use scanner::initial_scan;
