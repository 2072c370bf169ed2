//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait: prompt in, text out. Provider identity,
//! authentication and rate limits stay behind this boundary; callers only see
//! a single text response or an error.
//!
//! Providers perform single-shot execution. Nothing in the crate retries a
//! failed generation automatically.

mod gemini;
mod ollama;
mod openai;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::types::{Result, SkillError};

// =============================================================================
// Request / Response
// =============================================================================

/// One outbound generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
}

/// Generated text plus usage metrics
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub usage: TokenUsage,
    pub timing: ResponseTiming,
    pub metadata: ResponseMetadata,
}

impl LlmResponse {
    /// Create response with text only (usage unknown)
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: TokenUsage::default(),
            timing: ResponseTiming::default(),
            metadata: ResponseMetadata::default(),
        }
    }
}

/// Token usage metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Default)]
pub struct ResponseTiming {
    /// Total response time in milliseconds (wall clock)
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Response metadata
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    pub model: String,
    pub provider: String,
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// Opaque text-generation backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one generation call
    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Shared LLM provider type
pub type SharedProvider = Arc<dyn LlmProvider>;

/// Create a shared provider from configuration
pub fn create_provider(config: &LlmConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiProvider::new(config)?)),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config)?)),
        _ => Err(SkillError::Config(format!(
            "Unknown provider: {}. Supported: gemini, openai, ollama",
            config.provider
        ))),
    }
}

/// Resolve an API key from config or the provider's environment variable
pub(crate) fn resolve_api_key(config: &LlmConfig, env_var: &str, provider: &str) -> Result<String> {
    config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .or_else(|| std::env::var(env_var).ok().filter(|k| !k.is_empty()))
        .ok_or_else(|| {
            SkillError::Config(format!(
                "{} API key not found. Set {} env var or llm.api_key in config",
                provider, env_var
            ))
        })
}

/// Build the HTTP client shared by the REST providers
pub(crate) fn http_client(config: &LlmConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| SkillError::Config(format!("Failed to create HTTP client: {}", e)))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Scripted provider: pops one queued outcome per call and records prompts
    #[derive(Default)]
    pub struct MockProvider {
        outcomes: Mutex<VecDeque<Result<String>>>,
        requests: Mutex<Vec<GenerationRequest>>,
        stalled: AtomicBool,
    }

    impl MockProvider {
        pub fn replying(texts: &[&str]) -> Self {
            let provider = Self::default();
            for text in texts {
                provider.push_ok(text);
            }
            provider
        }

        pub fn push_ok(&self, text: &str) {
            self.outcomes
                .lock()
                .unwrap()
                .push_back(Ok(text.to_string()));
        }

        pub fn push_err(&self, err: SkillError) {
            self.outcomes.lock().unwrap().push_back(Err(err));
        }

        /// Every later call records its request and then never completes
        pub fn stall(&self) {
            self.stalled.store(true, Ordering::SeqCst);
        }

        pub fn requests(&self) -> Vec<GenerationRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse> {
            self.requests.lock().unwrap().push(request.clone());
            if self.stalled.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            let outcome = self
                .outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(SkillError::Generation("no scripted reply".into())));
            outcome.map(LlmResponse::text_only)
        }

        fn name(&self) -> &str {
            "mock"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider() {
        let config = LlmConfig {
            provider: "carrier-pigeon".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(
            create_provider(&config),
            Err(SkillError::Config(_))
        ));
    }

    #[test]
    fn test_explicit_key_wins() {
        let config = LlmConfig {
            api_key: Some("from-config".to_string()),
            ..LlmConfig::default()
        };
        let key = resolve_api_key(&config, "SKILLFORGE_TEST_UNSET_KEY", "Test").unwrap();
        assert_eq!(key, "from-config");
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let config = LlmConfig::default();
        assert!(matches!(
            resolve_api_key(&config, "SKILLFORGE_TEST_UNSET_KEY", "Test"),
            Err(SkillError::Config(_))
        ));
    }

    #[test]
    fn test_token_usage_total() {
        assert_eq!(TokenUsage::new(100, 50).total(), 150);
    }
}
