//! SkillForge - Repository-to-SKILL.md Generator
//!
//! Extracts a bounded, relevance-ranked slice of a public repository and
//! drives a conversation-style generation loop that produces a SKILL.md
//! reference document.
//!
//! ## Core Features
//!
//! - **Snapshot Extraction**: metadata, README and a ranked file subset
//!   fetched through a bounded worker pool
//! - **Graceful Degradation**: only the metadata lookup is fatal
//! - **Refinement Loop**: every instruction regenerates the full document
//! - **Pluggable Providers**: Gemini, OpenAI and Ollama backends
//!
//! ## Quick Start
//!
//! ```ignore
//! use skillforge::{Config, GenerationSession, SnapshotFetcher, create_provider};
//!
//! let config = Config::default();
//! let fetcher = Arc::new(SnapshotFetcher::github(&config)?);
//! let provider = create_provider(&config.llm)?;
//! let mut session = GenerationSession::new(fetcher, provider, &config);
//!
//! session.start("https://github.com/acme/widget", &CancellationToken::new()).await?;
//! session.refine("add more examples").await?;
//! ```
//!
//! ## Modules
//!
//! - [`source`]: reference resolution, source host client, ranking, retrieval
//! - [`skill`]: prompts, generation session, refinement, export
//! - [`ai`]: LLM provider abstraction
//! - [`server`]: HTTP extraction endpoint
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod server;
pub mod skill;
pub mod source;
pub mod timeout;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{ErrorCategory, LlmError, Result, SkillError};

// Domain Types
pub use types::{
    FetchedFile, FileCandidate, RepositoryMetadata, RepositoryReference, RepositorySnapshot,
    ScoredFile, SessionId, SnapshotResponse,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use source::{CandidateRanker, GitHubHost, SnapshotFetcher, SourceHost};

pub use skill::{
    ConversationTurn, GenerationSession, LifecycleState, PromptAssembler, Refiner, SkillWriter,
    strip_fences,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{GenerationRequest, LlmProvider, LlmResponse, SharedProvider, create_provider};

pub use timeout::{TimeoutConfig, with_timeout};
