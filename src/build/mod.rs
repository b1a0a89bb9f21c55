//! The build orchestrator.
//!
//! ```text
//! BuildEvent -> Classifier -> staleness -> stage chain -> ArtifactWriter
//!                                              |
//!                                          Executor (fire-and-forget)
//! ```
//!
//! [`Orchestrator`] owns the [`BuildSession`] and is the single place that
//! decides whether a failure is fatal.

mod error;
mod event;
mod executor;
mod orchestrator;
mod session;
mod staleness;
mod writer;

pub use error::BuildError;
pub use event::BuildEvent;
pub use executor::{ExecOutcome, Executor};
pub use orchestrator::{Flow, Orchestrator, Stages, final_artifact};
pub use session::{BuildSession, BuildState, Counters, SessionOptions};
pub use staleness::{mtime, needs_rebuild};
pub use writer::ArtifactWriter;
