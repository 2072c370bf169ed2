//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/skillforge/config.toml)
//! 3. Project config (.skillforge/config.toml)
//! 4. Environment variables (SKILLFORGE_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{Result, SkillError};

const ENV_PREFIX: &str = "SKILLFORGE_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        figment = figment.merge(Self::env_provider());

        let config: Config = figment
            .extract()
            .map_err(|e| SkillError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| SkillError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Environment provider: only the first `_` after the prefix separates the
    /// section from the field, so `SKILLFORGE_SOURCE_FETCH_CONCURRENCY` maps to
    /// `source.fetch_concurrency`.
    fn env_provider() -> Env {
        Env::prefixed(ENV_PREFIX)
            .map(|key| key.as_str().replacen('_', ".", 1).into())
            .lowercase(true)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/skillforge/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("skillforge"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".skillforge")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Render the effective configuration
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| SkillError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a default config file into `dir`, returning its path
    pub fn init_at(dir: &Path, force: bool) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config_file())?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            SkillError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::init_at(&global_dir, force)
    }

    /// Initialize project configuration
    pub fn init_project(force: bool) -> Result<PathBuf> {
        Self::init_at(&Self::project_dir(), force)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn default_config_file() -> String {
        r#"# SkillForge Configuration
# Project settings in .skillforge/config.toml override the global file.

version = "1.0"

[source]
host = "github.com"
api_base = "https://api.github.com"
raw_base = "https://raw.githubusercontent.com"
timeout_secs = 30
fetch_concurrency = 15
# token = "ghp_..."   # or SKILLFORGE_SOURCE_TOKEN

[ranking]
max_file_size = 80000
max_files = 15

[prompt]
readme_max_chars = 15000
file_max_chars = 5000

[llm]
provider = "gemini"
model = "gemini-flash-lite-latest"
temperature = 0.2
timeout_secs = 300
# api_key = "..."     # or GEMINI_API_KEY / OPENAI_API_KEY
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_file_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = ConfigLoader::init_at(temp_dir.path(), false).unwrap();
        assert!(path.exists());

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.ranking.max_files, 15);
        assert_eq!(config.source.fetch_concurrency, 15);
        // Lists not present in the file keep their defaults
        assert!(config.ranking.ignored_dirs.contains(&"node_modules".to_string()));
    }

    #[test]
    fn test_init_does_not_overwrite_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "version = \"custom\"\n").unwrap();

        ConfigLoader::init_at(temp_dir.path(), false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "version = \"custom\"\n");

        ConfigLoader::init_at(temp_dir.path(), true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("[ranking]"));
    }

    #[test]
    fn test_file_overrides_ranking_policy() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[ranking]\nmax_files = 5\nallowed_extensions = [\".rs\"]\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.ranking.max_files, 5);
        assert_eq!(config.ranking.allowed_extensions, vec![".rs".to_string()]);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[llm]\ntemperature = 5.0\n").unwrap();

        assert!(matches!(
            ConfigLoader::load_from_file(&path),
            Err(SkillError::Config(_))
        ));
    }

    #[test]
    fn test_render_formats() {
        let config = Config::default();
        let json = ConfigLoader::render(&config, true).unwrap();
        assert!(json.contains("\"max_files\": 15"));
        let toml = ConfigLoader::render(&config, false).unwrap();
        assert!(toml.contains("[ranking]"));
    }
}
