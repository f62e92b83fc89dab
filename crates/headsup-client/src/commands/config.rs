//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {e}")))?;
    println!("# config.toml ({})", path.display());
    println!("{toml_str}");
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.validate()?;
    match config.calendar.source {
        Some(ref source) => println!("Calendar source: {source}"),
        None => println!("No calendar source configured; calendar access will be denied."),
    }
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration and settings file paths.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    println!("settings: {}", ClientConfig::settings_path_for(path).display());
    Ok(())
}
