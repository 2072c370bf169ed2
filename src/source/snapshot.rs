//! Snapshot Fetcher
//!
//! Runs the extraction stages in causal order and applies the degradation
//! rules:
//!
//! | Stage    | On failure                                        |
//! |----------|---------------------------------------------------|
//! | metadata | `RepositoryUnavailable` with the upstream status  |
//! | README   | empty string                                      |
//! | tree     | no files; README/metadata-only snapshot           |
//! | file     | that file is omitted                              |
//!
//! Each upstream call is attempted exactly once.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{CandidateRanker, ContentRetriever, GitHubHost, ReferenceResolver, SharedHost};
use crate::config::Config;
use crate::timeout::{TimeoutConfig, with_timeout_map};
use crate::types::{RepositoryReference, RepositorySnapshot, Result, SkillError};

/// Builds a [`RepositorySnapshot`] from a repository reference
pub struct SnapshotFetcher {
    host: SharedHost,
    resolver: ReferenceResolver,
    ranker: CandidateRanker,
    concurrency: usize,
    timeout: Duration,
}

impl SnapshotFetcher {
    pub fn new(host: SharedHost, config: &Config) -> Result<Self> {
        Ok(Self {
            host,
            resolver: ReferenceResolver::for_host(&config.source.host)?,
            ranker: CandidateRanker::new(config.ranking.clone()),
            concurrency: config.source.fetch_concurrency,
            timeout: TimeoutConfig::from_config(config).source_request,
        })
    }

    /// Fetcher backed by the GitHub client configured in `config`
    pub fn github(config: &Config) -> Result<Self> {
        let host = GitHubHost::new(&config.source)?;
        Self::new(Arc::new(host), config)
    }

    pub fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    /// Resolve `input` and build its snapshot
    pub async fn extract(
        &self,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<RepositorySnapshot> {
        let reference = self.resolver.resolve(input)?;
        self.fetch(&reference, cancel).await
    }

    pub async fn fetch(
        &self,
        reference: &RepositoryReference,
        cancel: &CancellationToken,
    ) -> Result<RepositorySnapshot> {
        info!("Fetching snapshot for {}", reference);

        let metadata = self
            .guarded(cancel, "repository metadata", self.host.repository(reference))
            .await?
            .map_err(|e| {
                warn!("Metadata lookup for {} failed: {}", reference, e);
                SkillError::unavailable(e.status, e.message)
            })?;

        let readme = match self
            .guarded(cancel, "readme", self.host.readme(reference))
            .await?
        {
            Ok(readme) => readme,
            Err(e) => {
                warn!("README unavailable for {}: {}", reference, e);
                String::new()
            }
        };

        let branch = metadata.default_branch.clone();
        let tree = match self
            .guarded(cancel, "tree listing", self.host.tree(reference, &branch))
            .await?
        {
            Ok(tree) => tree,
            Err(e) => {
                warn!(
                    "Tree unavailable for {}@{}: {}; continuing without files",
                    reference, branch, e
                );
                Vec::new()
            }
        };

        let selected = self.ranker.select(tree);
        let files = ContentRetriever::new(self.host.as_ref(), self.concurrency, self.timeout)
            .retrieve(reference, &branch, &selected, cancel)
            .await;

        if cancel.is_cancelled() {
            return Err(SkillError::Cancelled(format!("snapshot of {}", reference)));
        }

        info!(
            "Snapshot for {}: readme {} chars, {}/{} files",
            reference,
            readme.len(),
            files.len(),
            selected.len()
        );

        Ok(RepositorySnapshot {
            reference: reference.clone(),
            metadata,
            readme,
            files,
        })
    }

    /// Await one host call under the per-call timeout and the request's
    /// cancellation token. A timeout becomes an ordinary host failure so the
    /// stage's own degradation rule applies; cancellation aborts the snapshot.
    async fn guarded<T, F>(
        &self,
        cancel: &CancellationToken,
        operation: &str,
        call: F,
    ) -> Result<super::HostResult<T>>
    where
        F: std::future::Future<Output = super::HostResult<T>>,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SkillError::Cancelled(operation.to_string())),
            outcome = with_timeout_map(self.timeout, call, operation) => Ok(match outcome {
                Ok(inner) => inner,
                Err(e) => Err(super::HostError::transport(e.to_string())),
            }),
        }
    }
}
