//! Init and Config commands.

use std::path::Path;

use crate::cli::CliError;
use crate::config::Settings;

/// Run init command - create configuration and symbol registry in `dir`.
pub fn run_init(dir: &Path, force: bool) -> Result<(), CliError> {
    let path = Settings::init_config_file(dir, force).map_err(|e| CliError::Init {
        message: e.to_string(),
    })?;
    println!("Edit {} to customize your settings.", path.display());
    Ok(())
}

/// Run config command - display current configuration.
pub fn run_config(config: &Settings) {
    println!("Current Configuration:");
    println!("{}", "=".repeat(50));
    match toml::to_string_pretty(config) {
        Ok(toml_str) => println!("{toml_str}"),
        Err(e) => eprintln!("Error displaying config: {e}"),
    }
}
