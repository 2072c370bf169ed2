//! Candidate filter and ranker
//!
//! Reduces a recursive tree listing to the handful of files most useful for
//! describing a repository. Filtering is a conjunction of hard exclusions;
//! ranking is a path-only additive score with a stable sort, so equal scores
//! keep their tree order and selection is deterministic across runs.

use tracing::debug;

use crate::config::RankingConfig;
use crate::constants::ranking::score;
use crate::types::{EntryKind, FileCandidate, ScoredFile};

/// Relevance score of a path. Case-insensitive, depends on nothing else.
pub fn score_path(path: &str) -> u32 {
    let lower = path.to_lowercase();
    let mut total = 0;

    if lower == "package.json" {
        total += score::PACKAGE_MANIFEST;
    }
    if lower.contains("readme") {
        total += score::README;
    }
    if lower.contains("doc") {
        total += score::DOCS;
    }
    if lower.contains("example") {
        total += score::EXAMPLE;
    }
    if lower.contains("src/index") || lower.contains("src/main") {
        total += score::ENTRY_POINT;
    }
    if lower.ends_with(".ts") || lower.ends_with(".tsx") {
        total += score::TYPESCRIPT;
    }

    total
}

/// Substring from the final `.` to the end of the path
pub fn extension(path: &str) -> Option<&str> {
    path.rfind('.').map(|idx| &path[idx..])
}

/// Applies a [`RankingConfig`] to tree listings
#[derive(Debug, Clone)]
pub struct CandidateRanker {
    policy: RankingConfig,
}

impl Default for CandidateRanker {
    fn default() -> Self {
        Self::new(RankingConfig::default())
    }
}

impl CandidateRanker {
    pub fn new(policy: RankingConfig) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RankingConfig {
        &self.policy
    }

    /// Whether a single entry survives every exclusion rule
    pub fn is_eligible(&self, candidate: &FileCandidate) -> bool {
        if candidate.kind != EntryKind::Blob {
            return false;
        }
        if candidate.size_bytes > self.policy.max_file_size {
            return false;
        }
        if candidate
            .path
            .split('/')
            .any(|segment| self.policy.ignored_dirs.iter().any(|d| d == segment))
        {
            return false;
        }
        match extension(&candidate.path) {
            Some(ext) => self.policy.allowed_extensions.iter().any(|a| a == ext),
            None => false,
        }
    }

    /// Survivors of the exclusion rules, in tree order
    pub fn filter(&self, tree: Vec<FileCandidate>) -> Vec<FileCandidate> {
        tree.into_iter().filter(|c| self.is_eligible(c)).collect()
    }

    /// Survivors scored and sorted by descending score (stable)
    pub fn rank(&self, tree: Vec<FileCandidate>) -> Vec<ScoredFile> {
        let mut scored: Vec<ScoredFile> = self
            .filter(tree)
            .into_iter()
            .map(|candidate| ScoredFile {
                score: score_path(&candidate.path),
                candidate,
            })
            .collect();

        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored
    }

    /// Top `max_files` ranked entries
    pub fn select(&self, tree: Vec<FileCandidate>) -> Vec<ScoredFile> {
        let total = tree.len();
        let mut ranked = self.rank(tree);
        let eligible = ranked.len();
        ranked.truncate(self.policy.max_files);

        debug!(
            "Ranked {} tree entries: {} eligible, {} selected",
            total,
            eligible,
            ranked.len()
        );

        ranked
    }
}
