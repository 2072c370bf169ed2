//! Generation Session
//!
//! State machine for one repository's document:
//!
//! ```text
//! idle ─▶ fetching ─▶ analyzing ─▶ success ⟲ refine
//!            │            │
//!            └────────────┴──▶ error
//! ```
//!
//! `success` and `error` are terminal for the initial request. From
//! `success` any number of refinement turns may run; a failed turn appends a
//! failure message and keeps the current document. Turns are serialized by
//! `&mut self`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::prompt::{PromptAssembler, skill_name};
use super::refiner::{GenerationSettings, SkillWriter};
use crate::ai::SharedProvider;
use crate::config::Config;
use crate::source::SnapshotFetcher;
use crate::types::{RepositorySnapshot, Result, SessionId, SkillError};

pub const GENERATED_MESSAGE: &str = "Skill generated successfully! Let me know if you want to modify anything (e.g., \"add more examples\", \"make the description shorter\").";
pub const REFINED_MESSAGE: &str = "SKILL.md updated successfully based on your request.";
pub const REFINE_FAILED_MESSAGE: &str = "Sorry, I encountered an error while updating the skill.";

// =============================================================================
// Lifecycle & Turns
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    #[default]
    Idle,
    Fetching,
    Analyzing,
    Success,
    Error,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Fetching => "fetching",
            LifecycleState::Analyzing => "analyzing",
            LifecycleState::Success => "success",
            LifecycleState::Error => "error",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the append-only conversation log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

// =============================================================================
// Session
// =============================================================================

pub struct GenerationSession {
    id: SessionId,
    fetcher: Arc<SnapshotFetcher>,
    writer: SkillWriter,
    state: LifecycleState,
    snapshot: Option<RepositorySnapshot>,
    document: String,
    turns: Vec<ConversationTurn>,
    error: Option<String>,
}

impl GenerationSession {
    /// New idle session; model settings and prompt limits are taken from
    /// `config` now and never re-read.
    pub fn new(fetcher: Arc<SnapshotFetcher>, provider: SharedProvider, config: &Config) -> Self {
        let writer = SkillWriter::new(
            provider,
            GenerationSettings::from_config(config),
            PromptAssembler::new(config.prompt.clone()),
        );
        Self {
            id: SessionId::generate(),
            fetcher,
            writer,
            state: LifecycleState::Idle,
            snapshot: None,
            document: String::new(),
            turns: Vec::new(),
            error: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Current document; only present in `success`
    pub fn document(&self) -> Option<&str> {
        (self.state == LifecycleState::Success).then_some(self.document.as_str())
    }

    pub fn snapshot(&self) -> Option<&RepositorySnapshot> {
        self.snapshot.as_ref()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Message of the failure that moved the session to `error`
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// `use-<slug>` identifier of the generated skill
    pub fn skill_name(&self) -> Option<String> {
        self.snapshot
            .as_ref()
            .map(|s| skill_name(&s.metadata.display_name))
    }

    /// Run the initial request: resolve, fetch, generate.
    pub async fn start(&mut self, input: &str, cancel: &CancellationToken) -> Result<&str> {
        if self.state != LifecycleState::Idle {
            return Err(SkillError::Session(format!(
                "session {} already started (state: {})",
                self.id, self.state
            )));
        }

        self.state = LifecycleState::Fetching;
        info!("Session {}: fetching {}", self.id, input.trim());
        let fetched = self.fetcher.extract(input, cancel).await;
        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(e) => return Err(self.fail(e)),
        };

        self.state = LifecycleState::Analyzing;
        info!(
            "Session {}: generating from {} files",
            self.id,
            snapshot.files.len()
        );
        let written = self.writer.write(&snapshot).await;
        let document = match written {
            Ok(document) => document,
            Err(e) => return Err(self.fail(e)),
        };

        self.snapshot = Some(snapshot);
        self.document = document;
        self.state = LifecycleState::Success;
        self.push(Role::Assistant, GENERATED_MESSAGE);
        Ok(&self.document)
    }

    /// Apply one refinement turn. On failure the document is unchanged, a
    /// failure turn is appended and the session stays in `success`.
    ///
    /// Cancel-safe: dropping the future before it completes leaves the
    /// document and the turn log untouched.
    pub async fn refine(&mut self, instruction: &str) -> Result<&str> {
        let refiner = match (&self.state, &self.snapshot) {
            (LifecycleState::Success, Some(snapshot)) => {
                self.writer.refiner(snapshot.metadata.display_name.clone())
            }
            _ => {
                return Err(SkillError::Session(format!(
                    "refinement requires a generated document (state: {})",
                    self.state
                )));
            }
        };

        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(SkillError::Session("empty refinement instruction".to_string()));
        }

        // Turns are appended only once the call has returned
        let refined = refiner.refine(&self.document, instruction).await;
        self.push(Role::User, instruction);
        match refined {
            Ok(document) => {
                self.document = document;
                self.push(Role::Assistant, REFINED_MESSAGE);
                Ok(&self.document)
            }
            Err(e) => {
                warn!("Session {}: {}", self.id, e);
                self.push(Role::Assistant, REFINE_FAILED_MESSAGE);
                Err(e)
            }
        }
    }

    fn fail(&mut self, err: SkillError) -> SkillError {
        warn!("Session {} failed in {}: {}", self.id, self.state, err);
        self.state = LifecycleState::Error;
        self.snapshot = None;
        self.document.clear();
        self.error = Some(err.to_string());
        err
    }

    fn push(&mut self, role: Role, text: &str) {
        self.turns.push(ConversationTurn {
            role,
            text: text.to_string(),
            at: Utc::now(),
        });
    }
}
