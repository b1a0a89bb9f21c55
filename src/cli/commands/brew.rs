//! Brew command: scan, optionally watch, or build explicit files.

use std::path::{Path, PathBuf};

use crate::build::{BuildSession, Counters, Executor, Orchestrator, SessionOptions, Stages};
use crate::cli::CliError;
use crate::config::{FormatsConfig, Settings};
use crate::imports::{ImportResolver, ImportSymbolTable};
use crate::logging::{self, Verbosity};
use crate::preprocess::Preprocessor;
use crate::source::{Classifier, SourceKind};
use crate::stages::CommandCompiler;
use crate::watcher::WatchDriver;

/// Parsed `brew` arguments.
#[derive(Debug, Clone, Default)]
pub struct BrewArgs {
    pub paths: Vec<PathBuf>,
    /// Formats chosen by flags; empty means configured defaults.
    pub formats: Vec<SourceKind>,
    pub options: SessionOptions,
}

/// Root directory and explicit files named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Split command-line paths into at most one root directory and files.
///
/// Every path must exist. Without a directory argument the root is
/// `default_root`.
pub fn resolve_targets(paths: &[PathBuf], default_root: &Path) -> Result<Targets, CliError> {
    let mut root: Option<PathBuf> = None;
    let mut files = Vec::new();

    for path in paths {
        let full = path
            .canonicalize()
            .map_err(|_| CliError::InvalidPath { path: path.clone() })?;
        if full.is_dir() {
            if let Some(first) = &root {
                return Err(CliError::MultipleRoots {
                    first: first.clone(),
                    second: full,
                });
            }
            root = Some(full);
        } else if full.is_file() {
            files.push(full);
        } else {
            return Err(CliError::InvalidPath { path: path.clone() });
        }
    }

    let root = match root {
        Some(root) => root,
        None => default_root
            .canonicalize()
            .map_err(|_| CliError::InvalidPath {
                path: default_root.to_path_buf(),
            })?,
    };
    Ok(Targets { root, files })
}

/// Run the brew command.
pub async fn run_brew(args: BrewArgs, settings: &Settings) -> Result<Counters, CliError> {
    let options = args.options;
    logging::init_with_config(
        &settings.logging,
        Verbosity::from_flags(options.quiet, options.debug),
    );

    let cwd = std::env::current_dir().map_err(|source| CliError::Read {
        path: PathBuf::from("."),
        source,
    })?;
    let default_root = settings
        .root
        .as_ref()
        .map(|root| Settings::resolve(&cwd, root))
        .unwrap_or(cwd);
    let targets = resolve_targets(&args.paths, &default_root)?;
    let root = targets.root.clone();

    let formats = if args.formats.is_empty() {
        settings.formats.clone()
    } else {
        FormatsConfig::only(&args.formats)
    };
    crate::debug_event!(
        "brew",
        "formats",
        "{}",
        formats
            .enabled()
            .iter()
            .map(|k| k.config_key())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let table = ImportSymbolTable::load(&settings.symbols_path(&root))?;
    let stages = Stages {
        preprocessor: Preprocessor::new().include_dirs(settings.include_paths(&root)),
        resolver: ImportResolver::new(table),
        script: Box::new(CommandCompiler::new(
            "script",
            settings.compilers.script.clone(),
        )),
        template: Box::new(CommandCompiler::new(
            "template",
            settings.compilers.template.clone(),
        )),
    };

    let mut orchestrator = Orchestrator::new(
        Classifier::new(&root, formats.enabled()),
        stages,
        settings.stores_path(&root),
        BuildSession::new(options),
    );
    if options.execute {
        orchestrator =
            orchestrator.with_executor(Executor::start(settings.compilers.execute.clone()));
    }

    if targets.files.is_empty() {
        crate::log_event!("brew", "root", "{}", root.display());
        let driver = WatchDriver::builder()
            .root(&root)
            .watch(options.watch)
            .debounce_ms(settings.watch.debounce_ms)
            .build()?;
        driver.run(&mut orchestrator).await?;
    } else {
        orchestrator.build_files(&targets.files)?;
    }

    Ok(orchestrator.finish().await)
}
