//! Configuration infrastructure
//!
//! Serde-backed application configuration with JSON persistence. Every field
//! has a default so a partial (or missing) config file still yields a usable
//! configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::infrastructure::http_client::HttpClientConfig;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub crawler: CrawlerConfig,
    pub logging: LoggingConfig,
}

/// Extraction-pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Ad links harvested per listing page when the caller gives no limit.
    pub default_ad_limit: usize,
    pub workers: WorkerConfig,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            default_ad_limit: 10,
            workers: WorkerConfig::default(),
        }
    }
}

/// Worker pool and outbound request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Vehicles extracted concurrently.
    pub max_concurrent: usize,
    /// Per-request timeout in seconds.
    pub request_timeout_seconds: u64,
    /// Outbound rate ceiling shared by all workers; 0 disables throttling.
    pub max_requests_per_second: u32,
    pub user_agent: String,
    pub follow_redirects: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        let http = HttpClientConfig::default();
        Self {
            max_concurrent: 4,
            request_timeout_seconds: http.timeout_seconds,
            max_requests_per_second: http.max_requests_per_second,
            user_agent: http.user_agent,
            follow_redirects: http.follow_redirects,
        }
    }
}

impl WorkerConfig {
    /// Projects the worker settings onto an HTTP client configuration.
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            max_requests_per_second: self.max_requests_per_second,
            timeout_seconds: self.request_timeout_seconds,
            user_agent: self.user_agent.clone(),
            follow_redirects: self.follow_redirects,
        }
    }
}

/// Logging output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset, e.g. "info".
    pub level: String,
    /// Emit JSON-structured lines instead of the human format.
    pub json_output: bool,
    pub log_to_file: bool,
    pub log_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_output: false,
            log_to_file: false,
            log_dir: "logs".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a JSON file, falling back to defaults when
    /// the file does not exist.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !fs::try_exists(path).await.unwrap_or(false) {
            info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Writes the configuration as pretty JSON.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self).context("serializing config")?;
        fs::write(path, raw)
            .await
            .with_context(|| format!("writing config file {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.crawler.default_ad_limit, 10);
        assert!(config.crawler.workers.max_concurrent >= 1);
        assert!(config.crawler.workers.request_timeout_seconds > 0);
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let config: AppConfig =
            serde_json::from_str(r#"{"crawler": {"default_ad_limit": 3}}"#).unwrap();
        assert_eq!(config.crawler.default_ad_limit, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[tokio::test]
    async fn round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.crawler.workers.max_concurrent = 8;
        config.save(&path).await.unwrap();

        let loaded = AppConfig::load_or_default(&path).await.unwrap();
        assert_eq!(loaded.crawler.workers.max_concurrent, 8);
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let loaded = AppConfig::load_or_default("/nonexistent/motorscout.json")
            .await
            .unwrap();
        assert_eq!(loaded.crawler.default_ad_limit, 10);
    }
}
