//! Content Retriever
//!
//! Fetches the selected files through a bounded worker pool. Every fetch has
//! its own timeout and observes the request's cancellation token; a failure
//! drops that one file and never aborts the batch.

use futures::StreamExt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::SourceHost;
use crate::timeout::with_timeout_map;
use crate::types::{FetchedFile, RepositoryReference, ScoredFile};

/// Bounded, failure-isolated file fetcher
pub struct ContentRetriever<'a> {
    host: &'a dyn SourceHost,
    concurrency: usize,
    timeout: Duration,
}

impl<'a> ContentRetriever<'a> {
    pub fn new(host: &'a dyn SourceHost, concurrency: usize, timeout: Duration) -> Self {
        Self {
            host,
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    /// Fetch `selected` from `branch`, returning only the files that arrived.
    ///
    /// Completion order is not preserved.
    pub async fn retrieve(
        &self,
        reference: &RepositoryReference,
        branch: &str,
        selected: &[ScoredFile],
        cancel: &CancellationToken,
    ) -> Vec<FetchedFile> {
        let paths: Vec<String> = selected.iter().map(|f| f.path().to_string()).collect();
        let mut stream = futures::stream::iter(paths)
            .map(|path| self.fetch_one(reference, branch, path, cancel))
            .buffer_unordered(self.concurrency);

        let mut fetched = Vec::with_capacity(selected.len());
        while let Some(result) = stream.next().await {
            if let Some(file) = result {
                fetched.push(file);
            }
        }

        debug!(
            "Fetched {}/{} selected files for {}",
            fetched.len(),
            selected.len(),
            reference
        );
        fetched
    }

    async fn fetch_one(
        &self,
        reference: &RepositoryReference,
        branch: &str,
        path: String,
        cancel: &CancellationToken,
    ) -> Option<FetchedFile> {
        let call = with_timeout_map(
            self.timeout,
            self.host.raw_file(reference, branch, &path),
            "raw file fetch",
        );

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Skipping {}: request cancelled", path);
                return None;
            }
            outcome = call => outcome,
        };

        match outcome {
            Ok(Ok(content)) => Some(FetchedFile { path, content }),
            Ok(Err(e)) => {
                warn!("Dropping {}: {}", path, e);
                None
            }
            Err(e) => {
                warn!("Dropping {}: {}", path, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::MockHost;
    use crate::types::FileCandidate;
    use std::sync::atomic::Ordering;

    fn selected(paths: &[String]) -> Vec<ScoredFile> {
        paths
            .iter()
            .map(|p| ScoredFile {
                candidate: FileCandidate::blob(p.clone(), 10),
                score: 0,
            })
            .collect()
    }

    fn reference() -> RepositoryReference {
        RepositoryReference::new("acme", "widget").unwrap()
    }

    fn host_with(n: usize) -> (MockHost, Vec<String>) {
        let mut host = MockHost::with_metadata("widget");
        let mut paths = Vec::new();
        for i in 1..=n {
            let path = format!("src/file{}.rs", i);
            host = host.with_file(&path, 10, &format!("// {}", i));
            paths.push(path);
        }
        (host, paths)
    }

    #[tokio::test]
    async fn test_single_failure_drops_only_that_file() {
        let (mut host, paths) = host_with(15);
        host.failing_files.insert("src/file7.rs".to_string());

        let retriever = ContentRetriever::new(&host, 15, Duration::from_secs(5));
        let fetched = retriever
            .retrieve(&reference(), "main", &selected(&paths), &CancellationToken::new())
            .await;

        assert_eq!(fetched.len(), 14);
        assert!(fetched.iter().all(|f| f.path != "src/file7.rs"));
        let f3 = fetched.iter().find(|f| f.path == "src/file3.rs").unwrap();
        assert_eq!(f3.content, "// 3");
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let (mut host, paths) = host_with(12);
        host.file_delay = Some(Duration::from_millis(20));

        let retriever = ContentRetriever::new(&host, 3, Duration::from_secs(5));
        let fetched = retriever
            .retrieve(&reference(), "main", &selected(&paths), &CancellationToken::new())
            .await;

        assert_eq!(fetched.len(), 12);
        let peak = host.max_in_flight.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak in-flight was {}", peak);
        assert!(peak >= 2);
    }

    #[tokio::test]
    async fn test_slow_file_times_out_without_stalling_batch() {
        let (mut host, paths) = host_with(4);
        host.slow_files.insert("src/file2.rs".to_string());

        let retriever = ContentRetriever::new(&host, 4, Duration::from_millis(50));
        let fetched = retriever
            .retrieve(&reference(), "main", &selected(&paths), &CancellationToken::new())
            .await;

        assert_eq!(fetched.len(), 3);
        assert!(fetched.iter().all(|f| f.path != "src/file2.rs"));
    }

    #[tokio::test]
    async fn test_cancelled_request_fetches_nothing() {
        let (host, paths) = host_with(5);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let retriever = ContentRetriever::new(&host, 5, Duration::from_secs(5));
        let fetched = retriever
            .retrieve(&reference(), "main", &selected(&paths), &cancel)
            .await;

        assert!(fetched.is_empty());
    }

    #[tokio::test]
    async fn test_uses_given_branch() {
        let (host, paths) = host_with(1);
        let retriever = ContentRetriever::new(&host, 1, Duration::from_secs(5));
        retriever
            .retrieve(&reference(), "trunk", &selected(&paths), &CancellationToken::new())
            .await;

        assert_eq!(host.calls(), vec!["raw:trunk:src/file1.rs".to_string()]);
    }
}
