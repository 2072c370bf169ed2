//! Repository snapshot types
//!
//! Everything the extraction pipeline produces, from the resolved reference
//! down to the fetched file contents.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical `owner/name` pair for a hosted repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ReferenceParts")]
pub struct RepositoryReference {
    owner: String,
    name: String,
}

impl RepositoryReference {
    /// Build a reference, rejecting empty or slash-containing parts
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Option<Self> {
        let owner = owner.into();
        let name = name.into();
        let valid = |s: &str| !s.is_empty() && !s.contains('/');
        (valid(&owner) && valid(&name)).then_some(Self { owner, name })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Unchecked wire form; deserialization goes through [`RepositoryReference::new`]
#[derive(Deserialize)]
struct ReferenceParts {
    owner: String,
    name: String,
}

impl TryFrom<ReferenceParts> for RepositoryReference {
    type Error = String;

    fn try_from(parts: ReferenceParts) -> Result<Self, Self::Error> {
        let rendered = format!("{}/{}", parts.owner, parts.name);
        Self::new(parts.owner, parts.name)
            .ok_or_else(|| format!("invalid repository reference '{}'", rendered))
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Repository metadata as reported by the source host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    pub display_name: String,
    pub description: Option<String>,
    pub star_count: u64,
    pub primary_language: Option<String>,
    pub default_branch: String,
}

/// Tree entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    /// Submodule pointers and anything else the host reports
    #[serde(other)]
    Other,
}

/// One entry of the recursive tree listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCandidate {
    pub path: String,
    pub size_bytes: u64,
    pub kind: EntryKind,
}

impl FileCandidate {
    pub fn blob(path: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            size_bytes,
            kind: EntryKind::Blob,
        }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size_bytes: 0,
            kind: EntryKind::Tree,
        }
    }
}

/// A candidate that survived filtering, with its relevance score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredFile {
    pub candidate: FileCandidate,
    pub score: u32,
}

impl ScoredFile {
    pub fn path(&self) -> &str {
        &self.candidate.path
    }
}

/// Content of a successfully fetched file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedFile {
    pub path: String,
    pub content: String,
}

/// Bounded extraction result for one generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub reference: RepositoryReference,
    pub metadata: RepositoryMetadata,
    pub readme: String,
    pub files: Vec<FetchedFile>,
}

// =============================================================================
// Wire Format
// =============================================================================

/// Extraction response body (`{metadata, readme, files}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub metadata: MetadataSummary,
    pub readme: String,
    pub files: Vec<FetchedFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataSummary {
    pub name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub language: Option<String>,
}

impl From<&RepositorySnapshot> for SnapshotResponse {
    fn from(snapshot: &RepositorySnapshot) -> Self {
        Self {
            metadata: MetadataSummary {
                name: snapshot.metadata.display_name.clone(),
                description: snapshot.metadata.description.clone(),
                stars: snapshot.metadata.star_count,
                language: snapshot.metadata.primary_language.clone(),
            },
            readme: snapshot.readme.clone(),
            files: snapshot.files.clone(),
        }
    }
}
