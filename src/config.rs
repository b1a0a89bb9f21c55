//! Configuration for the cielo brewer.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.cielo/settings.toml`)
//! - Environment variable overrides
//! - CLI argument overrides (applied by the `brew` command)
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `CIELO_` and use double
//! underscores to separate nested levels:
//! - `CIELO_STORES_DIR=src/stores` sets `stores_dir`
//! - `CIELO_WATCH__DEBOUNCE_MS=200` sets `watch.debounce_ms`
//! - `CIELO_FORMATS__STARBUCKS=false` sets `formats.starbucks`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::source::SourceKind;

/// Directory holding the settings and symbol registry.
pub const CONFIG_DIR: &str = ".cielo";

/// Settings file name inside [`CONFIG_DIR`].
pub const SETTINGS_FILE: &str = "settings.toml";

const ENV_PREFIX: &str = "CIELO_";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory to brew when no path is given (defaults to cwd)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Data literals are only wrapped below this directory (relative to root)
    #[serde(default = "default_stores_dir")]
    pub stores_dir: PathBuf,

    /// Fallback directories for `include` directives
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,

    /// Import symbol registry (relative to the workspace root)
    #[serde(default = "default_symbols_file")]
    pub symbols_file: PathBuf,

    /// Which source formats are brewed
    #[serde(default)]
    pub formats: FormatsConfig,

    /// External commands used as stages
    #[serde(default)]
    pub compilers: CompilersConfig,

    /// Watch mode settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct FormatsConfig {
    /// `.cielo` macro scripts
    #[serde(default = "default_true")]
    pub cielo: bool,

    /// `.coffee` scripts
    #[serde(default = "default_true")]
    pub coffee: bool,

    /// `.starbucks` component templates
    #[serde(default = "default_true")]
    pub starbucks: bool,

    /// `.json5` data literals
    #[serde(default = "default_true")]
    pub data: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CompilersConfig {
    /// CoffeeScript compiler; reads stdin, writes JavaScript to stdout
    #[serde(default = "default_script_command")]
    pub script: Vec<String>,

    /// Template compiler; empty means templates fail to build
    #[serde(default)]
    pub template: Vec<String>,

    /// Command prefix used to run compiled scripts (`brew -x`)
    #[serde(default = "default_execute_command")]
    pub execute: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatchConfig {
    /// Quiet period before a changed file is rebuilt; 0 rebuilds immediately
    #[serde(default)]
    pub debounce_ms: u64,
}

/// Logging configuration.
///
/// Controls log levels for different modules. Use `RUST_LOG` env var to override.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default log level: "error", "warn", "info", "debug", "trace"
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module log level overrides (target = level)
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_stores_dir() -> PathBuf {
    PathBuf::from("stores")
}
fn default_symbols_file() -> PathBuf {
    PathBuf::from(CONFIG_DIR).join("symbols.toml")
}
fn default_true() -> bool {
    true
}
fn default_script_command() -> Vec<String> {
    ["coffee", "--compile", "--bare", "--stdio"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_execute_command() -> Vec<String> {
    vec!["node".to_string()]
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            root: None,
            stores_dir: default_stores_dir(),
            include_dirs: Vec::new(),
            symbols_file: default_symbols_file(),
            formats: FormatsConfig::default(),
            compilers: CompilersConfig::default(),
            watch: WatchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for FormatsConfig {
    fn default() -> Self {
        Self {
            cielo: true,
            coffee: true,
            starbucks: true,
            data: true,
        }
    }
}

impl FormatsConfig {
    pub fn is_enabled(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::MacroScript => self.cielo,
            SourceKind::IntermediateScript => self.coffee,
            SourceKind::ComponentTemplate => self.starbucks,
            SourceKind::DataLiteral => self.data,
            SourceKind::Unrecognized => false,
        }
    }

    /// Enabled kinds, in declaration order.
    pub fn enabled(&self) -> Vec<SourceKind> {
        SourceKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }

    /// Only the given kinds enabled.
    pub fn only(kinds: &[SourceKind]) -> Self {
        Self {
            cielo: kinds.contains(&SourceKind::MacroScript),
            coffee: kinds.contains(&SourceKind::IntermediateScript),
            starbucks: kinds.contains(&SourceKind::ComponentTemplate),
            data: kinds.contains(&SourceKind::DataLiteral),
        }
    }
}

impl Default for CompilersConfig {
    fn default() -> Self {
        Self {
            script: default_script_command(),
            template: Vec::new(),
            execute: default_execute_command(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 0 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources.
    ///
    /// The settings file is found by searching for a `.cielo` directory from
    /// the current directory upwards.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(SETTINGS_FILE));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file (plus defaults and env).
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nesting; single underscores stay
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find `.cielo/settings.toml` from the current directory upwards.
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join(SETTINGS_FILE))
    }

    /// The nearest ancestor of the current directory holding `.cielo/`.
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Resolve a configured path against `base` unless it is absolute.
    pub fn resolve(base: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }
    }

    /// Absolute stores directory for a brewed root.
    pub fn stores_path(&self, root: &Path) -> PathBuf {
        Self::resolve(root, &self.stores_dir)
    }

    /// Include directories resolved against a brewed root.
    pub fn include_paths(&self, root: &Path) -> Vec<PathBuf> {
        self.include_dirs
            .iter()
            .map(|dir| Self::resolve(root, dir))
            .collect()
    }

    /// Symbol registry path: relative to the workspace root when there is
    /// one, else to `fallback`.
    pub fn symbols_path(&self, fallback: &Path) -> PathBuf {
        let base = Self::workspace_root().unwrap_or_else(|| fallback.to_path_buf());
        Self::resolve(&base, &self.symbols_file)
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create `.cielo/settings.toml` and a starter symbol registry in `dir`.
    pub fn init_config_file(dir: &Path, force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = dir.join(CONFIG_DIR).join(SETTINGS_FILE);
        let existed = config_path.exists();

        if !force && existed {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        if existed {
            println!("Overwrote configuration at: {}", config_path.display());
        } else {
            println!("Created default configuration at: {}", config_path.display());
        }

        Self::create_default_symbols_file(&dir.join(default_symbols_file()), force)?;

        Ok(config_path)
    }

    /// Create a starter symbol registry with a few common entries.
    fn create_default_symbols_file(
        path: &Path,
        force: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if !force && path.exists() {
            println!("Found existing {}", path.display());
            return Ok(());
        }

        let default_content = r#"# Import symbol registry
#
# Maps a bare identifier to the import statement that binds it. When a
# brewed script uses one of these names without defining it, the statement
# is prepended to the generated CoffeeScript. Entries are emitted in the
# order they appear here.

[symbols]
undef = "import {undef} from '@jdeighan/coffee-utils'"
say = "import {say} from '@jdeighan/coffee-utils'"
croak = "import {croak} from '@jdeighan/coffee-utils'"
log = "import {log} from '@jdeighan/coffee-utils/log'"
writable = "import {writable} from 'svelte/store'"
readable = "import {readable} from 'svelte/store'"
"#;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_content)?;
        println!("Created symbol registry at: {}", path.display());

        Ok(())
    }
}
