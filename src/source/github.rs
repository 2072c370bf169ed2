//! GitHub Source Host
//!
//! Unauthenticated (or token-authenticated) read-only access to the GitHub
//! REST API and the raw-content endpoint. Single-shot: no retries here.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{HostError, HostResult, SourceHost};
use crate::config::SourceConfig;
use crate::constants;
use crate::types::{
    EntryKind, FileCandidate, RepositoryMetadata, RepositoryReference, Result, SkillError,
};

/// GitHub REST + raw-content client
pub struct GitHubHost {
    api_base: Url,
    raw_base: Url,
    token: Option<SecretString>,
    client: reqwest::Client,
}

impl std::fmt::Debug for GitHubHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubHost")
            .field("api_base", &self.api_base.as_str())
            .field("raw_base", &self.raw_base.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl GitHubHost {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let api_base = parse_base(&config.api_base)?;
        let raw_base = parse_base(&config.raw_base)?;

        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| SkillError::Config(format!("Invalid user_agent: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, user_agent);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let token = config
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|t| !t.is_empty())
            .map(SecretString::from);

        Ok(Self {
            api_base,
            raw_base,
            token,
            client,
        })
    }

    /// `<api_base>/repos/<owner>/<name>/<extra...>`
    fn api_url(&self, reference: &RepositoryReference, extra: &[&str]) -> HostResult<Url> {
        let mut segments = vec!["repos", reference.owner(), reference.name()];
        segments.extend_from_slice(extra);
        join_segments(&self.api_base, segments)
    }

    /// `<api_base>/repos/<owner>/<name>/git/trees/<branch>?recursive=1`
    fn tree_url(&self, reference: &RepositoryReference, branch: &str) -> HostResult<Url> {
        let mut extra = vec!["git", "trees"];
        extra.extend(branch.split('/'));
        let mut url = self.api_url(reference, &extra)?;
        url.query_pairs_mut().append_pair("recursive", "1");
        Ok(url)
    }

    /// `<raw_base>/<owner>/<name>/<branch>/<path>`
    fn raw_url(&self, reference: &RepositoryReference, branch: &str, path: &str) -> HostResult<Url> {
        let mut segments = vec![reference.owner(), reference.name()];
        segments.extend(branch.split('/'));
        segments.extend(path.split('/'));
        join_segments(&self.raw_base, segments)
    }

    async fn get(&self, url: Url, api: bool) -> HostResult<reqwest::Response> {
        debug!("GET {}", url);

        let mut request = self.client.get(url);
        if api {
            request = request.header(ACCEPT, constants::source::API_ACCEPT);
        }
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }

        let response = request
            .send()
            .await
            .map_err(|e| HostError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HostError::status(
                status.as_u16(),
                format!("{} returned {}", response.url(), status),
            ));
        }
        Ok(response)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> HostResult<T> {
        self.get(url, true)
            .await?
            .json()
            .await
            .map_err(|e| HostError::transport(format!("Failed to parse response: {}", e)))
    }
}

fn parse_base(base: &str) -> Result<Url> {
    let url = Url::parse(base)
        .map_err(|e| SkillError::Config(format!("Invalid base URL '{}': {}", base, e)))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(SkillError::Config(format!(
            "Base URL must be an http(s) URL: {}",
            base
        )));
    }
    Ok(url)
}

fn join_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> HostResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| HostError::transport(format!("Cannot extend base URL {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Decode a base64 content body as returned by the contents API
///
/// GitHub wraps the payload at 60 columns, so whitespace is stripped first.
pub fn decode_content(encoded: &str) -> HostResult<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| HostError::transport(format!("Invalid base64 content: {}", e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[async_trait]
impl SourceHost for GitHubHost {
    async fn repository(&self, reference: &RepositoryReference) -> HostResult<RepositoryMetadata> {
        let url = self.api_url(reference, &[])?;
        let repo: RepoResponse = self.get_json(url).await?;
        Ok(repo.into())
    }

    async fn readme(&self, reference: &RepositoryReference) -> HostResult<String> {
        let url = self.api_url(reference, &["readme"])?;
        let readme: ContentResponse = self.get_json(url).await?;
        decode_content(&readme.content)
    }

    async fn tree(
        &self,
        reference: &RepositoryReference,
        branch: &str,
    ) -> HostResult<Vec<FileCandidate>> {
        let url = self.tree_url(reference, branch)?;
        let tree: TreeResponse = self.get_json(url).await?;
        if tree.truncated {
            debug!("Tree listing for {} was truncated by the host", reference);
        }
        Ok(tree.tree.into_iter().map(FileCandidate::from).collect())
    }

    async fn raw_file(
        &self,
        reference: &RepositoryReference,
        branch: &str,
        path: &str,
    ) -> HostResult<String> {
        let url = self.raw_url(reference, branch, path)?;
        self.get(url, false)
            .await?
            .text()
            .await
            .map_err(|e| HostError::transport(e.to_string()))
    }
}

// Response types

#[derive(Debug, Deserialize)]
struct RepoResponse {
    name: String,
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    language: Option<String>,
    default_branch: String,
}

impl From<RepoResponse> for RepositoryMetadata {
    fn from(repo: RepoResponse) -> Self {
        Self {
            display_name: repo.name,
            description: repo.description,
            star_count: repo.stargazers_count,
            primary_language: repo.language,
            default_branch: repo.default_branch,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: EntryKind,
    #[serde(default)]
    size: u64,
}

impl From<TreeEntry> for FileCandidate {
    fn from(entry: TreeEntry) -> Self {
        Self {
            path: entry.path,
            size_bytes: entry.size,
            kind: entry.kind,
        }
    }
}
