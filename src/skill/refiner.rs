//! Document generation and refinement transforms
//!
//! [`SkillWriter`] turns a snapshot into the first document; [`Refiner`] is
//! the pure `(document, instruction) → document'` step used for every
//! refinement turn. Both make exactly one generation call and never diff
//! against the previous document.

use std::time::Duration;
use tracing::{debug, info};

use super::fence::strip_fences;
use super::prompt::PromptAssembler;
use crate::ai::{GenerationRequest, SharedProvider};
use crate::config::Config;
use crate::timeout::{TimeoutConfig, with_timeout};
use crate::types::{RepositorySnapshot, Result, SkillError};

/// Model parameters fixed at session creation
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl GenerationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            timeout: TimeoutConfig::from_config(config).llm_request,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// One provider call under the configured timeout, fence-stripped.
/// An empty body is returned as-is; callers decide whether that is fatal.
async fn complete(
    provider: &SharedProvider,
    settings: &GenerationSettings,
    prompt: String,
    operation: &str,
) -> Result<String> {
    let request = GenerationRequest {
        model: settings.model.clone(),
        prompt,
        temperature: settings.temperature,
    };
    debug!(
        "{} via {} ({} prompt chars)",
        operation,
        provider.name(),
        request.prompt.chars().count()
    );

    let response = with_timeout(settings.timeout, provider.generate(&request), operation).await?;
    info!(
        "{} finished in {}ms ({} tokens)",
        operation,
        response.timing.total_ms,
        response.usage.total()
    );
    Ok(strip_fences(&response.text).to_string())
}

// =============================================================================
// Initial generation
// =============================================================================

/// Writes the first document for a snapshot
#[derive(Clone)]
pub struct SkillWriter {
    provider: SharedProvider,
    settings: GenerationSettings,
    assembler: PromptAssembler,
}

impl SkillWriter {
    pub fn new(
        provider: SharedProvider,
        settings: GenerationSettings,
        assembler: PromptAssembler,
    ) -> Self {
        Self {
            provider,
            settings,
            assembler,
        }
    }

    /// Generate the initial document. Any failure, including an empty
    /// response, is a [`SkillError::Generation`].
    pub async fn write(&self, snapshot: &RepositorySnapshot) -> Result<String> {
        let prompt = self.assembler.initial(snapshot);
        let text = complete(&self.provider, &self.settings, prompt, "initial generation")
            .await
            .map_err(|e| SkillError::Generation(e.to_string()))?;

        if text.is_empty() {
            return Err(SkillError::Generation(
                "model returned an empty response".to_string(),
            ));
        }
        Ok(text)
    }

    /// Refiner for documents about `repository`
    pub fn refiner(&self, repository: impl Into<String>) -> Refiner {
        Refiner {
            provider: self.provider.clone(),
            settings: self.settings.clone(),
            assembler: self.assembler.clone(),
            repository: repository.into(),
        }
    }
}

// =============================================================================
// Refinement
// =============================================================================

/// Full-document regeneration from a free-text instruction
#[derive(Clone)]
pub struct Refiner {
    provider: SharedProvider,
    settings: GenerationSettings,
    assembler: PromptAssembler,
    repository: String,
}

impl Refiner {
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Produce the replacement for `document`. Failures, including an
    /// empty response, are reported as [`SkillError::Refinement`] so the
    /// caller keeps its current document.
    pub async fn refine(&self, document: &str, instruction: &str) -> Result<String> {
        let prompt = self
            .assembler
            .refinement(&self.repository, document, instruction);
        let text = complete(&self.provider, &self.settings, prompt, "refinement")
            .await
            .map_err(|e| SkillError::Refinement(e.to_string()))?;

        if text.is_empty() {
            return Err(SkillError::Refinement(
                "model returned an empty response".to_string(),
            ));
        }
        Ok(text)
    }
}
