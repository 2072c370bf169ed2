//! Config Command
//!
//! Manage SkillForge configuration.
//!
//! Usage:
//!   skillforge config show [-f toml|json]
//!   skillforge config path
//!   skillforge config init [-g] [--force]

use std::path::Path;

use crate::cli::{CommandContext, Output};
use crate::config::ConfigLoader;
use crate::types::{Result, SkillError};

/// Print the effective configuration (secrets are never serialized)
pub fn show(config_file: Option<&Path>, format: &str) -> Result<()> {
    let as_json = match format {
        "json" => true,
        "toml" | "text" => false,
        other => {
            return Err(SkillError::Config(format!(
                "Invalid format '{}'. Valid values: toml, json",
                other
            )));
        }
    };

    let ctx = CommandContext::load(config_file)?;
    println!("{}", ConfigLoader::render(&ctx.config, as_json)?);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Write a default config file, globally or for the current project
pub fn init(global: bool, force: bool) -> Result<()> {
    let out = Output::new();
    let path = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(force)?
    };

    let scope = if global { "global" } else { "project" };
    out.success(&format!("Initialized {} configuration", scope));
    out.field("Config:", &path.display().to_string());
    Ok(())
}
