//! Gemini API Provider
//!
//! LLM provider using the Generative Language `generateContent` endpoint.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use super::{
    GenerationRequest, LlmProvider, LlmResponse, ResponseMetadata, ResponseTiming, TokenUsage,
    http_client, resolve_api_key,
};
use crate::config::LlmConfig;
use crate::types::{ErrorCategory, ErrorClassifier, LlmError, Result};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const PROVIDER: &str = "gemini";

/// Gemini provider with secure API key handling
pub struct GeminiProvider {
    api_key: SecretString,
    api_base: String,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = resolve_api_key(config, "GEMINI_API_KEY", "Gemini")?;
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_base,
            max_tokens: config.max_tokens,
            client: http_client(config)?,
        })
    }

    fn build_request(&self, request: &GenerationRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(request.prompt.clone()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: self.max_tokens,
            },
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse> {
        info!(
            "Generating with Gemini (model: {}, temperature: {})",
            request.model, request.temperature
        );

        let start_time = Instant::now();
        let url = format!("{}/models/{}:generateContent", self.api_base, request.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&self.build_request(request))
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER))?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Gemini API error ({}): {}", status, body),
                PROVIDER,
            )
            .into());
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            LlmError::with_provider(
                ErrorCategory::Unknown,
                format!("Failed to parse Gemini response: {}", e),
                PROVIDER,
            )
        })?;

        debug!("Received response from Gemini");

        let usage = body
            .usage_metadata
            .as_ref()
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        Ok(LlmResponse {
            text: body.text(),
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
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiProvider {
        GeminiProvider::new(&LlmConfig {
            api_key: Some("test-key".to_string()),
            ..LlmConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_request_shape() {
        let request = GenerationRequest {
            model: "gemini-flash-lite-latest".to_string(),
            prompt: "Describe".to_string(),
            temperature: 0.2,
        };
        let json = serde_json::to_value(provider().build_request(&request)).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Describe");
        assert_eq!(json["contents"][0]["role"], "user");
        assert!((json["generationConfig"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert!(json["generationConfig"]["maxOutputTokens"].is_number());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let json = r##"{
            "candidates": [{"content": {"role": "model", "parts": [{"text": "# Doc"}, {"text": " v1"}]}}],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 3}
        }"##;
        let body: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.text(), "# Doc v1");
        assert_eq!(body.usage_metadata.unwrap().candidates_token_count, 3);
    }

    #[test]
    fn test_blocked_response_has_empty_text() {
        let json = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let body: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.text(), "");
    }

    #[test]
    fn test_debug_redacts_key() {
        assert!(!format!("{:?}", provider()).contains("test-key"));
    }
}
