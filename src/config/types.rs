//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/skillforge/) and project (.skillforge/) level configuration.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::types::{Result, SkillError};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Source host access
    pub source: SourceConfig,

    /// Candidate filtering and ranking policy
    pub ranking: RankingConfig,

    /// Prompt size bounds
    pub prompt: PromptConfig,

    /// LLM provider settings
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            source: SourceConfig::default(),
            ranking: RankingConfig::default(),
            prompt: PromptConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `SkillError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(SkillError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(SkillError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.source.timeout_secs == 0 {
            return Err(SkillError::Config(
                "Source timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.source.fetch_concurrency == 0 {
            return Err(SkillError::Config(
                "Source fetch_concurrency must be greater than 0".to_string(),
            ));
        }

        if self.ranking.max_files == 0 {
            return Err(SkillError::Config(
                "Ranking max_files must be greater than 0".to_string(),
            ));
        }

        if let Some(bad) = self
            .ranking
            .allowed_extensions
            .iter()
            .find(|ext| !ext.starts_with('.'))
        {
            return Err(SkillError::Config(format!(
                "Allowed extension '{}' must start with '.'",
                bad
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Source Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Host segment matched in repository URLs
    pub host: String,

    /// REST API base URL
    pub api_base: String,

    /// Raw content base URL
    pub raw_base: String,

    /// User-Agent header
    pub user_agent: String,

    /// Optional access token (raises rate limits)
    /// Never serialized to output for security
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Per-call timeout in seconds
    pub timeout_secs: u64,

    /// Maximum concurrent file-content fetches
    pub fetch_concurrency: usize,
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("host", &self.host)
            .field("api_base", &self.api_base)
            .field("raw_base", &self.raw_base)
            .field("user_agent", &self.user_agent)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("fetch_concurrency", &self.fetch_concurrency)
            .finish()
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            host: constants::source::HOST.to_string(),
            api_base: constants::source::API_BASE.to_string(),
            raw_base: constants::source::RAW_BASE.to_string(),
            user_agent: constants::source::USER_AGENT.to_string(),
            token: None,
            timeout_secs: constants::source::TIMEOUT_SECS,
            fetch_concurrency: constants::source::FETCH_CONCURRENCY,
        }
    }
}

// =============================================================================
// Ranking Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Maximum file size in bytes
    pub max_file_size: u64,

    /// Number of top-ranked files to fetch
    pub max_files: usize,

    /// Path segments that exclude an entry
    pub ignored_dirs: Vec<String>,

    /// Extensions (with leading dot) eligible for selection
    pub allowed_extensions: Vec<String>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_file_size: constants::ranking::MAX_FILE_SIZE,
            max_files: constants::ranking::MAX_FILES,
            ignored_dirs: constants::ranking::IGNORED_DIRS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_extensions: constants::ranking::ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

// =============================================================================
// Prompt Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// README characters embedded in the generation prompt
    pub readme_max_chars: usize,

    /// Characters embedded per file
    pub file_max_chars: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            readme_max_chars: constants::prompt::README_MAX_CHARS,
            file_max_chars: constants::prompt::FILE_MAX_CHARS,
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "gemini", "openai", "ollama"
    pub provider: String,

    /// Model name
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Temperature for generation
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: usize,

    /// API key; falls back to the provider's environment variable
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: constants::llm::PROVIDER.to_string(),
            model: constants::llm::MODEL.to_string(),
            timeout_secs: constants::llm::TIMEOUT_SECS,
            temperature: constants::llm::TEMPERATURE,
            max_tokens: constants::llm::MAX_TOKENS,
            api_key: None,
            api_base: None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
