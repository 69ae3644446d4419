//! Config Command
//!
//! Manage prompt-router configuration.
//!
//! Usage:
//!   prompt-router config show [-f json]
//!   prompt-router config path
//!   prompt-router config init [PATH] [--force]

use std::path::Path;

use crate::cli::{Output, is_json};
use crate::config::{Config, ConfigLoader};
use crate::types::Result;

/// Show the effective configuration (merged from all sources)
pub fn show(config: &Config, format: &str) -> Result<()> {
    println!("{}", ConfigLoader::render(config, is_json(format))?);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Write a default config file
pub fn init(path: Option<&Path>, force: bool) -> Result<()> {
    let existed = path
        .map(Path::to_path_buf)
        .unwrap_or_else(ConfigLoader::project_config_path)
        .exists();

    let written = ConfigLoader::init(path, force)?;
    let output = Output::new();
    if existed && !force {
        output.warning(&format!(
            "Config already exists: {} (use --force to overwrite)",
            written.display()
        ));
    } else {
        output.success(&format!("Initialized configuration: {}", written.display()));
    }
    Ok(())
}
