//! Repository Content Extraction
//!
//! Resolves a repository URL, pulls metadata/README/tree from the source host,
//! ranks the tree and fetches the selected files into a [`RepositorySnapshot`].
//!
//! ## Modules
//!
//! - `reference`: URL → `owner/name`
//! - `github`: REST + raw-content client implementing [`SourceHost`]
//! - `ranking`: candidate filter and scorer
//! - `retriever`: bounded, failure-isolated content fetch
//! - `snapshot`: stage orchestration and degradation rules
//!
//! [`RepositorySnapshot`]: crate::types::RepositorySnapshot

pub mod github;
pub mod ranking;
pub mod reference;
pub mod retriever;
pub mod snapshot;

pub use github::GitHubHost;
pub use ranking::{CandidateRanker, extension, score_path};
pub use reference::{ReferenceResolver, resolve};
pub use retriever::ContentRetriever;
pub use snapshot::SnapshotFetcher;

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::{FileCandidate, RepositoryMetadata, RepositoryReference};

/// Failure of a single source-host call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HostError {
    /// Upstream HTTP status, when a response was received
    pub status: Option<u16>,
    pub message: String,
}

impl HostError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

pub type HostResult<T> = std::result::Result<T, HostError>;

/// Read-only access to a repository hosting service
///
/// Each call is attempted exactly once by the pipeline; implementations must
/// not retry internally.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Repository metadata, including the default branch
    async fn repository(&self, reference: &RepositoryReference) -> HostResult<RepositoryMetadata>;

    /// Decoded README text
    async fn readme(&self, reference: &RepositoryReference) -> HostResult<String>;

    /// Whole tree of `branch` in a single recursive listing
    async fn tree(
        &self,
        reference: &RepositoryReference,
        branch: &str,
    ) -> HostResult<Vec<FileCandidate>>;

    /// Raw text of one file on `branch`
    async fn raw_file(
        &self,
        reference: &RepositoryReference,
        branch: &str,
        path: &str,
    ) -> HostResult<String>;
}

pub type SharedHost = Arc<dyn SourceHost>;
