//! Incremental, file-watch-driven brewing of cielo sources.
//!
//! A source tree of `.cielo` macro scripts, `.coffee` scripts, `.starbucks`
//! templates and `.json5` data stores is kept in sync with its derived
//! artifacts: scripts become JavaScript, templates become Svelte components,
//! data stores become ES modules.

pub mod build;
pub mod cli;
pub mod config;
pub mod imports;
pub mod logging;
pub mod preprocess;
pub mod source;
pub mod stages;
pub mod watcher;

pub use build::{BuildEvent, BuildSession, Orchestrator, SessionOptions};
pub use config::Settings;
pub use imports::{ImportResolver, ImportSymbolTable};
pub use preprocess::{PreprocessError, Preprocessor};
pub use source::{Classifier, SourceKind};
