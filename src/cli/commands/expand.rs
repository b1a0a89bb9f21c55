//! Expand and Symbols commands.

use std::path::Path;

use crate::cli::CliError;
use crate::config::Settings;
use crate::imports::{ImportResolver, ImportSymbolTable};
use crate::preprocess::{Preprocessor, Strip};
use crate::source::{SourceKind, kind_of, short_path};

fn base_dir(file: &Path) -> &Path {
    file.parent().unwrap_or_else(|| Path::new("."))
}

fn load_resolver(settings: &Settings, file: &Path) -> Result<ImportResolver, CliError> {
    let table = ImportSymbolTable::load(&settings.symbols_path(base_dir(file)))?;
    Ok(ImportResolver::new(table))
}

/// Macro-expand one file, optionally with its import prelude.
pub fn expand_text(
    settings: &Settings,
    file: &Path,
    strip: bool,
    imports: bool,
) -> Result<String, CliError> {
    let include_dirs = settings.include_paths(base_dir(file));
    let expanded = if strip {
        Preprocessor::with_policy(Strip)
            .include_dirs(include_dirs)
            .expand_file(file)?
    } else {
        Preprocessor::new()
            .include_dirs(include_dirs)
            .expand_file(file)?
    };
    if !imports {
        return Ok(expanded);
    }
    Ok(load_resolver(settings, file)?.apply(&expanded))
}

/// Run expand command - print expanded CoffeeScript to stdout.
pub fn run_expand(
    settings: &Settings,
    file: &Path,
    strip: bool,
    imports: bool,
) -> Result<(), CliError> {
    print!("{}", expand_text(settings, file, strip, imports)?);
    Ok(())
}

/// Registry symbols `file` needs. Macro scripts are expanded first.
pub fn needed_symbols(settings: &Settings, file: &Path) -> Result<Vec<String>, CliError> {
    let text = if kind_of(file) == SourceKind::MacroScript {
        expand_text(settings, file, false, false)?
    } else {
        std::fs::read_to_string(file).map_err(|source| CliError::Read {
            path: file.to_path_buf(),
            source,
        })?
    };
    Ok(load_resolver(settings, file)?.needed_symbols(&text))
}

/// Run symbols command - report needed symbols per file.
pub fn run_symbols(settings: &Settings, files: &[impl AsRef<Path>]) -> Result<(), CliError> {
    let cwd = std::env::current_dir().unwrap_or_default();
    for file in files {
        let file = file.as_ref();
        let needed = needed_symbols(settings, file)?;
        let name = short_path(file, &cwd);
        match needed.len() {
            0 => println!("NO NEEDED SYMBOLS in {name}"),
            n => {
                let word = if n == 1 { "SYMBOL" } else { "SYMBOLS" };
                println!("{n} NEEDED {word} in {name}:");
                for sym in &needed {
                    println!("   - {sym}");
                }
            }
        }
    }
    Ok(())
}
