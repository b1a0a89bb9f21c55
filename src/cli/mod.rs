//! CLI module for the cielo brewer.
//!
//! Provides command-line interface parsing and command dispatch.

pub mod args;
pub mod commands;
mod error;

pub use args::{Cli, Commands};
pub use error::CliError;

use crate::build::SessionOptions;
use crate::config::Settings;
use commands::brew::{BrewArgs, run_brew};

/// Load settings from `--config` or the workspace search.
pub fn load_settings(config: Option<&std::path::Path>) -> Result<Settings, CliError> {
    let settings = match config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    Ok(settings)
}

/// Dispatch a parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let selected = cli.command.selected_formats();

    match cli.command {
        Commands::Init { force } => {
            let cwd = std::env::current_dir()?;
            commands::init::run_init(&cwd, force)?;
        }

        Commands::Config => {
            let settings = load_settings(cli.config.as_deref())?;
            commands::init::run_config(&settings);
        }

        Commands::Expand {
            file,
            strip,
            no_imports,
        } => {
            let settings = load_settings(cli.config.as_deref())?;
            crate::logging::init_with_config(&settings.logging, crate::logging::Verbosity::Normal);
            commands::expand::run_expand(&settings, &file, strip, !no_imports)?;
        }

        Commands::Symbols { files } => {
            let settings = load_settings(cli.config.as_deref())?;
            crate::logging::init_with_config(&settings.logging, crate::logging::Verbosity::Normal);
            commands::expand::run_symbols(&settings, &files)?;
        }

        Commands::Brew {
            paths,
            force,
            quiet,
            debug,
            watch,
            execute,
            ..
        } => {
            let settings = load_settings(cli.config.as_deref())?;
            let args = BrewArgs {
                paths,
                formats: selected,
                options: SessionOptions {
                    force,
                    quiet,
                    debug,
                    execute,
                    watch,
                },
            };
            run_brew(args, &settings).await?;
        }
    }

    Ok(())
}
