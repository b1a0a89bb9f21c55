//! Unified logging for build output.
//!
//! Provides compact timestamped logging on stderr with per-module level
//! configuration. Supports the `RUST_LOG` environment variable for runtime
//! overrides.
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! default = "info"  # every processed file
//!
//! [logging.modules]
//! cielo = "debug"   # staleness decisions, skipped files
//! ```
//!
//! # Environment Variable
//!
//! `RUST_LOG` takes precedence over config and flags:
//! ```bash
//! RUST_LOG=debug cielo brew
//! RUST_LOG=cielo::watcher=trace cielo brew -w
//! ```

use std::sync::Once;

use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Compact time format: HH:MM:SS.mmm
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Verbosity requested on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Use the configured levels.
    #[default]
    Normal,
    /// Errors only.
    Quiet,
    /// Everything down to debug.
    Debug,
}

impl Verbosity {
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        match (quiet, debug) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Debug,
            (false, false) => Verbosity::Normal,
        }
    }
}

/// Filter directive string for a config and verbosity.
///
/// Quiet and debug replace the default level; per-module overrides still
/// apply unless quiet.
pub fn filter_directives(config: &LoggingConfig, verbosity: Verbosity) -> String {
    let mut filter = match verbosity {
        Verbosity::Quiet => return "error".to_string(),
        Verbosity::Debug => "debug".to_string(),
        Verbosity::Normal => config.default.clone(),
    };
    let mut modules: Vec<_> = config.modules.iter().collect();
    modules.sort();
    for (module, level) in modules {
        filter.push_str(&format!(",{module}={level}"));
    }
    filter
}

/// Initialize logging with configuration.
///
/// Call once at startup. Safe to call multiple times (only first call takes effect).
///
/// Log levels control visibility:
/// - `error` - errors only (`--quiet`)
/// - `warn` - errors + warnings
/// - `info` - every processed file (default)
/// - `debug` - staleness decisions and skipped files (`--debug`)
/// - `trace` - everything
///
/// The `RUST_LOG` environment variable takes precedence over config settings.
pub fn init_with_config(config: &LoggingConfig, verbosity: Verbosity) {
    INIT.call_once(|| {
        // RUST_LOG env var takes precedence over config
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(filter_directives(config, verbosity))
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(is_terminal::is_terminal(std::io::stderr()))
            .with_target(verbosity == Verbosity::Debug)
            .with_timer(CompactTime)
            .with_level(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}

/// Initialize logging with default configuration.
pub fn init() {
    init_with_config(&LoggingConfig::default(), Verbosity::Normal);
}

/// Log an event with component context.
///
/// # Examples
/// ```ignore
/// log_event!("brew", "compiled", "{} => {}", src, dst);
/// log_event!("watch", "started");
/// ```
#[macro_export]
macro_rules! log_event {
    ($component:expr, $event:expr) => {
        tracing::info!("[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        tracing::info!("[{}] {}: {}", $component, $event, format!($($arg)*))
    };
}

/// Debug-only event logging.
///
/// # Examples
/// ```ignore
/// debug_event!("brew", "up to date", "{}", path.display());
/// ```
#[macro_export]
macro_rules! debug_event {
    ($component:expr, $event:expr) => {
        tracing::debug!("[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        tracing::debug!("[{}] {}: {}", $component, $event, format!($($arg)*))
    };
}
