//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Failure Taxonomy
//!
//! - **InvalidReference**: malformed repository URL, no network attempted
//! - **RepositoryUnavailable**: metadata lookup failed (carries upstream status)
//! - **Generation**: initial generation failed or returned empty text
//! - **Refinement**: a refinement turn failed (recoverable, never fatal)
//!
//! README/tree degradation and per-file fetch omissions are not errors; they
//! are logged and dropped where they happen.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for provider failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited by the provider
    RateLimit,
    /// Authentication failed
    Auth,
    /// Network/connectivity issues
    Network,
    /// Provider or model unavailable
    Unavailable,
    /// Invalid request
    BadRequest,
    /// Temporary server issues
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Provider error with category and origin
#[derive(Debug, Clone)]
pub struct LlmError {
    pub category: ErrorCategory,
    pub message: String,
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }
}

/// Maps provider responses onto error categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP status code returned by a provider
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 | 422 => ErrorCategory::BadRequest,
            404 => ErrorCategory::Unavailable,
            500 | 502 | 503 | 504 => ErrorCategory::Transient,
            _ => ErrorCategory::Unknown,
        };
        LlmError::with_provider(category, message, provider)
    }

    /// Classify a transport-level failure
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> LlmError {
        let category = if err.is_timeout() || err.is_connect() {
            ErrorCategory::Network
        } else if let Some(status) = err.status() {
            return Self::classify_http_status(status.as_u16(), &err.to_string(), provider);
        } else {
            ErrorCategory::Unknown
        };
        LlmError::with_provider(category, err.to_string(), provider)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum SkillError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // -------------------------------------------------------------------------
    // Extraction Errors
    // -------------------------------------------------------------------------
    #[error("Invalid repository URL: {input}")]
    InvalidReference { input: String },

    /// Metadata lookup failed; `status` is the upstream HTTP status when known
    #[error("Repository not found or API rate limit exceeded: {message}")]
    RepositoryUnavailable {
        status: Option<u16>,
        message: String,
    },

    // -------------------------------------------------------------------------
    // Generation Errors
    // -------------------------------------------------------------------------
    #[error("LLM error: {0}")]
    Llm(LlmError),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Refinement failed: {0}")]
    Refinement(String),

    #[error("Invalid session state: {0}")]
    Session(String),

    // -------------------------------------------------------------------------
    // Runtime Errors
    // -------------------------------------------------------------------------
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<LlmError> for SkillError {
    fn from(err: LlmError) -> Self {
        SkillError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, SkillError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl SkillError {
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    pub fn invalid_reference(input: impl Into<String>) -> Self {
        Self::InvalidReference {
            input: input.into(),
        }
    }

    pub fn unavailable(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::RepositoryUnavailable {
            status,
            message: message.into(),
        }
    }

    /// HTTP status surfaced to callers of the extraction endpoint
    ///
    /// Malformed input is a client error, a failed repository lookup passes
    /// the upstream status through unchanged, everything else is a 500.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidReference { .. } => 400,
            Self::RepositoryUnavailable { status, .. } => status.unwrap_or(502),
            _ => 500,
        }
    }

    /// Whether this error ends the current generation attempt
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Refinement(_))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
        assert_eq!(ErrorCategory::Transient.to_string(), "TRANSIENT");
    }

    #[test]
    fn test_classify_http_status() {
        let rate_limit = ErrorClassifier::classify_http_status(429, "Rate limited", "gemini");
        assert_eq!(rate_limit.category, ErrorCategory::RateLimit);

        let auth = ErrorClassifier::classify_http_status(403, "Forbidden", "gemini");
        assert_eq!(auth.category, ErrorCategory::Auth);

        let server_error = ErrorClassifier::classify_http_status(503, "Overloaded", "openai");
        assert_eq!(server_error.category, ErrorCategory::Transient);

        let odd = ErrorClassifier::classify_http_status(418, "Teapot", "openai");
        assert_eq!(odd.category, ErrorCategory::Unknown);
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::with_provider(ErrorCategory::RateLimit, "Too many requests", "gemini");
        assert_eq!(err.to_string(), "[gemini:RATE_LIMIT] Too many requests");

        let err_no_provider = LlmError::new(ErrorCategory::Network, "Connection failed");
        assert_eq!(err_no_provider.to_string(), "[NETWORK] Connection failed");
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(SkillError::invalid_reference("nope").http_status(), 400);
        assert_eq!(SkillError::unavailable(Some(404), "gone").http_status(), 404);
        assert_eq!(SkillError::unavailable(Some(403), "limit").http_status(), 403);
        assert_eq!(SkillError::unavailable(None, "dns").http_status(), 502);
        assert_eq!(SkillError::Generation("empty".into()).http_status(), 500);
    }

    #[test]
    fn test_refinement_is_not_fatal() {
        assert!(!SkillError::Refinement("boom".into()).is_fatal());
        assert!(SkillError::Generation("boom".into()).is_fatal());
        assert!(SkillError::invalid_reference("x").is_fatal());
    }
}
