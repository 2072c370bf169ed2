//! AI Integration Layer
//!
//! Text-generation providers used to write and refine skill documents.

pub mod provider;

pub use provider::{
    GeminiProvider, GenerationRequest, LlmProvider, LlmResponse, OllamaProvider, OpenAiProvider,
    ResponseMetadata, ResponseTiming, SharedProvider, TokenUsage, create_provider,
};
