//! Unified Timeout Configuration
//!
//! Every network call in the pipeline goes through one of these helpers so a
//! single slow upstream cannot stall a request indefinitely.
//!
//! ## Usage
//!
//! ```ignore
//! use skillforge::timeout::{TimeoutConfig, with_timeout};
//!
//! let config = TimeoutConfig::default();
//! let text = with_timeout(config.llm_request, provider.generate(&request), "generation").await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::constants;
use crate::types::{Result, SkillError};

/// Timeouts for each class of outbound call
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Metadata, README, tree and raw-content requests
    pub source_request: Duration,
    /// One generation call
    pub llm_request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            source_request: Duration::from_secs(constants::source::TIMEOUT_SECS),
            llm_request: Duration::from_secs(constants::llm::TIMEOUT_SECS),
        }
    }
}

impl TimeoutConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_request: Duration::from_secs(config.source.timeout_secs),
            llm_request: Duration::from_secs(config.llm.timeout_secs),
        }
    }
}

/// Execute an async operation with a timeout
///
/// Returns a timeout error if the operation doesn't complete within the specified duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(SkillError::timeout(operation_name, timeout)),
    }
}

/// Execute an async operation with a timeout, mapping the inner result
///
/// This variant accepts futures whose output is not a crate `Result` and wraps them.
pub async fn with_timeout_map<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => Ok(result),
        Err(_) => Err(SkillError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_config_defaults() {
        let config = TimeoutConfig::default();
        assert_eq!(config.source_request.as_secs(), 30);
        assert_eq!(config.llm_request.as_secs(), 300);
    }

    #[test]
    fn test_timeout_config_from_config() {
        let mut config = Config::default();
        config.source.timeout_secs = 5;
        config.llm.timeout_secs = 60;
        let timeouts = TimeoutConfig::from_config(&config);
        assert_eq!(timeouts.source_request, Duration::from_secs(5));
        assert_eq!(timeouts.llm_request, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, SkillError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, SkillError>(42)
            },
            "slow operation",
        )
        .await;
        assert!(matches!(result.unwrap_err(), SkillError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_with_timeout_map_wraps_plain_output() {
        let result = with_timeout_map(Duration::from_secs(1), async { "done" }, "plain").await;
        assert_eq!(result.unwrap(), "done");
    }
}
