//! Ollama Local LLM Provider
//!
//! LLM provider for locally-running Ollama models.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::{
    GenerationRequest, LlmProvider, LlmResponse, ResponseMetadata, ResponseTiming, TokenUsage,
    http_client,
};
use crate::config::LlmConfig;
use crate::types::{ErrorCategory, ErrorClassifier, LlmError, Result, SkillError};

const DEFAULT_API_BASE: &str = "http://localhost:11434";
const PROVIDER: &str = "ollama";

/// Ollama Local LLM Provider
#[derive(Debug)]
pub struct OllamaProvider {
    api_base: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_base = config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);

        // Validate endpoint URL for security (SSRF prevention)
        let api_base = Self::validate_endpoint(api_base)?;

        Ok(Self {
            api_base,
            client: http_client(config)?,
        })
    }

    /// Only allows http/https schemes and warns for non-localhost endpoints.
    fn validate_endpoint(endpoint: &str) -> Result<String> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            SkillError::Config(format!("Invalid Ollama endpoint URL '{}': {}", endpoint, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(SkillError::Config(format!(
                "Ollama endpoint must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        if let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "[::1]")
        {
            warn!(
                "Ollama endpoint is not localhost: {}. Ensure this is intentional.",
                host
            );
        }

        Ok(url.as_str().trim_end_matches('/').to_string())
    }

    fn build_request(&self, request: &GenerationRequest) -> OllamaRequest {
        OllamaRequest {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
            },
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse> {
        info!(
            "Generating with Ollama (model: {}, temperature: {})",
            request.model, request.temperature
        );

        let start_time = Instant::now();
        let url = format!("{}/api/generate", self.api_base);

        debug!("Sending request to Ollama API");

        let response = self
            .client
            .post(&url)
            .json(&self.build_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::with_provider(
                        ErrorCategory::Network,
                        format!(
                            "Failed to connect to Ollama at {}. Is Ollama running? Start with: ollama serve",
                            self.api_base
                        ),
                        PROVIDER,
                    )
                } else {
                    ErrorClassifier::classify_transport(&e, PROVIDER)
                }
            })?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Ollama API error ({}): {}", status, body),
                PROVIDER,
            )
            .into());
        }

        let response_body: OllamaResponse = response.json().await.map_err(|e| {
            LlmError::with_provider(
                ErrorCategory::Unknown,
                format!("Failed to parse Ollama response: {}", e),
                PROVIDER,
            )
        })?;

        let usage = TokenUsage::new(
            response_body.prompt_eval_count.unwrap_or(0),
            response_body.eval_count.unwrap_or(0),
        );

        Ok(LlmResponse {
            text: response_body.response,
            usage,
            timing: ResponseTiming::from_duration(elapsed),
            metadata: ResponseMetadata {
                model: request.model.clone(),
                provider: PROVIDER.to_string(),
            },
        })
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ollama_config(api_base: Option<&str>) -> LlmConfig {
        LlmConfig {
            provider: "ollama".to_string(),
            api_base: api_base.map(str::to_string),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn test_default_endpoint() {
        let provider = OllamaProvider::new(&ollama_config(None)).unwrap();
        assert_eq!(provider.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let result = OllamaProvider::new(&ollama_config(Some("file:///etc/passwd")));
        assert!(matches!(result, Err(SkillError::Config(_))));
    }

    #[test]
    fn test_request_disables_streaming() {
        let provider = OllamaProvider::new(&ollama_config(Some("http://localhost:11434/"))).unwrap();
        let request = GenerationRequest {
            model: "llama3:latest".to_string(),
            prompt: "Write".to_string(),
            temperature: 0.2,
        };
        let json = serde_json::to_value(provider.build_request(&request)).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["model"], "llama3:latest");
        assert_eq!(provider.api_base, "http://localhost:11434");
    }

    #[test]
    fn test_parse_response() {
        let json = r##"{"response": "# Doc", "prompt_eval_count": 12, "eval_count": 4, "done": true}"##;
        let body: OllamaResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.response, "# Doc");
        assert_eq!(body.eval_count, Some(4));
    }
}
