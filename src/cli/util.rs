//! CLI Common Utilities
//!
//! Shared configuration loading and collaborator construction for command
//! handlers.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::ai::{SharedProvider, create_provider};
use crate::config::{Config, ConfigLoader};
use crate::source::SnapshotFetcher;
use crate::types::Result;

/// Command execution context
///
/// Holds the effective configuration after file, environment and CLI flag
/// overrides have been applied.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
}

impl CommandContext {
    /// Load the merged configuration, or only `config_file` when given
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let config = match config_file {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        Ok(Self { config })
    }

    /// Apply `--provider` / `--model` flags on top of the loaded config
    pub fn with_llm_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
    ) -> Result<Self> {
        if let Some(provider) = provider {
            self.config.llm.provider = provider;
        }
        if let Some(model) = model {
            self.config.llm.model = model;
        }
        self.config.validate()?;
        Ok(self)
    }

    pub fn fetcher(&self) -> Result<Arc<SnapshotFetcher>> {
        Ok(Arc::new(SnapshotFetcher::github(&self.config)?))
    }

    pub fn provider(&self) -> Result<SharedProvider> {
        create_provider(&self.config.llm)
    }
}

/// Token cancelled on Ctrl-C. Must be called inside a Tokio runtime.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; cancelling in-flight requests");
            trigger.cancel();
        }
    });
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SkillError;

    fn context() -> CommandContext {
        CommandContext {
            config: Config::default(),
        }
    }

    #[test]
    fn test_llm_overrides() {
        let ctx = context()
            .with_llm_overrides(Some("ollama".into()), Some("llama3:latest".into()))
            .unwrap();
        assert_eq!(ctx.config.llm.provider, "ollama");
        assert_eq!(ctx.config.llm.model, "llama3:latest");
    }

    #[test]
    fn test_no_overrides_keeps_defaults() {
        let ctx = context().with_llm_overrides(None, None).unwrap();
        assert_eq!(ctx.config.llm.model, "gemini-flash-lite-latest");
    }

    #[test]
    fn test_load_from_explicit_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[llm]\nmodel = \"gpt-4o-mini\"\nprovider = \"openai\"\n").unwrap();

        let ctx = CommandContext::load(Some(&path)).unwrap();
        assert_eq!(ctx.config.llm.provider, "openai");
        assert_eq!(ctx.config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn test_unknown_provider_fails_at_construction() {
        let ctx = context()
            .with_llm_overrides(Some("nope".into()), None)
            .unwrap();
        assert!(matches!(ctx.provider(), Err(SkillError::Config(_))));
    }
}
