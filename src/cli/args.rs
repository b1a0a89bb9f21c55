//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

use crate::source::SourceKind;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Incremental brewer for cielo macro scripts, templates and data stores
#[derive(Parser, Debug)]
#[command(
    name = "cielo",
    version = env!("CARGO_PKG_VERSION"),
    about = "Brew .cielo, .coffee, .starbucks and .json5 sources into JavaScript and Svelte",
    next_line_help = true,
    styles = clap_cargo_style(),
    after_help = "Quick Start:\n  $ cielo init                  # Create .cielo/settings.toml\n  $ cielo brew                  # Brew the current directory once\n  $ cielo brew -w src           # Brew src/ and keep watching\n  $ cielo brew -x app.cielo     # Brew one script and run it"
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build derived artifacts for a directory tree or explicit files
    #[command(
        about = "Brew a directory tree (and optionally watch it) or a list of files",
        after_help = "Examples:\n  cielo brew\n  cielo brew src --watch\n  cielo brew --cielo --force\n  cielo brew app.cielo --execute\n\nAt most one directory may be given; files are brewed once and always rebuilt."
    )]
    Brew {
        /// One root directory and/or any number of files
        #[arg(value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Brew .cielo macro scripts
        #[arg(long)]
        cielo: bool,

        /// Brew .coffee scripts
        #[arg(long)]
        coffee: bool,

        /// Brew .starbucks templates
        #[arg(long)]
        starbucks: bool,

        /// Brew .json5 data stores
        #[arg(long)]
        data: bool,

        /// Rebuild every artifact regardless of timestamps
        #[arg(short, long)]
        force: bool,

        /// Only report errors
        #[arg(short, long, conflicts_with = "debug")]
        quiet: bool,

        /// Verbose debug output
        #[arg(short, long)]
        debug: bool,

        /// Keep watching after the initial scan
        #[arg(short, long)]
        watch: bool,

        /// Run compiled macro scripts after brewing them
        #[arg(short = 'x', long)]
        execute: bool,
    },

    /// Print the macro-expanded CoffeeScript of one file
    #[command(about = "Expand a .cielo file to stdout")]
    Expand {
        /// Macro script to expand
        file: PathBuf,

        /// Drop blank and comment lines
        #[arg(long)]
        strip: bool,

        /// Skip the import prelude
        #[arg(long)]
        no_imports: bool,
    },

    /// List registry symbols each file needs
    #[command(about = "Show which registry symbols files would import")]
    Symbols {
        /// .cielo or .coffee files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Initialize project
    #[command(about = "Set up .cielo directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings from .cielo/settings.toml")]
    Config,
}

impl Commands {
    /// Formats selected by `brew` flags; empty means "use configuration".
    pub fn selected_formats(&self) -> Vec<SourceKind> {
        match self {
            Commands::Brew {
                cielo,
                coffee,
                starbucks,
                data,
                ..
            } => [
                (*cielo, SourceKind::MacroScript),
                (*coffee, SourceKind::IntermediateScript),
                (*starbucks, SourceKind::ComponentTemplate),
                (*data, SourceKind::DataLiteral),
            ]
            .into_iter()
            .filter_map(|(on, kind)| on.then_some(kind))
            .collect(),
            _ => Vec::new(),
        }
    }
}
