//! HTTP page fetcher with rate limiting and legacy-encoding transcoding
//!
//! The target site serves windows-1251 pages; every body is transcoded to
//! UTF-8 before it reaches a parser. Requests are throttled through one
//! shared token bucket so concurrent vehicle extractions cannot hammer the
//! site. Failed requests are not retried: the pipeline stays stateless and a
//! per-vehicle failure is isolated by the orchestrator instead.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use encoding_rs::WINDOWS_1251;
use reqwest::{Client, ClientBuilder};
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};
use tracing::debug;

/// Errors surfaced by a single page fetch.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure, timeout, or a non-2xx status.
    #[error("GET {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The body could not be transcoded from the site's legacy encoding.
    #[error("GET {url}: body is not valid {encoding} text")]
    Encoding { url: String, encoding: &'static str },

    /// The body is not usable markup (e.g. empty).
    #[error("GET {url}: {reason}")]
    Parse { url: String, reason: String },
}

/// Capability seam for page retrieval.
///
/// Implementations return the page markup already transcoded to UTF-8; the
/// parsing layer builds the document tree synchronously so parsed documents
/// never cross an await point. Tests substitute an in-memory fetcher.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Token-bucket request throttle shared by all concurrent extractions.
///
/// Capacity is one second of burst; a background task refills one permit per
/// interval. Acquired permits are forgotten so the bucket actually drains.
#[derive(Debug)]
pub struct RequestThrottle {
    semaphore: Arc<Semaphore>,
    rate_per_second: u32,
    refill: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl RequestThrottle {
    /// A rate of 0 disables throttling.
    pub fn new(rate_per_second: u32) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(rate_per_second as usize)),
            rate_per_second,
            refill: Mutex::new(None),
        }
    }

    /// Waits until a request token is available.
    pub async fn acquire(&self) {
        if self.rate_per_second == 0 {
            return;
        }

        self.ensure_refill_task().await;

        // The semaphore is never closed, so acquisition only fails during
        // shutdown; proceeding unthrottled is fine then.
        if let Ok(permit) = self.semaphore.acquire().await {
            permit.forget();
        }
    }

    /// Spawns the refill task lazily, on the first throttled acquire, so the
    /// throttle can be constructed outside a runtime.
    async fn ensure_refill_task(&self) {
        let mut slot = self.refill.lock().await;
        if slot.is_some() {
            return;
        }

        let semaphore = Arc::clone(&self.semaphore);
        let rate = self.rate_per_second;
        let refill_interval = Duration::from_millis(1000 / u64::from(rate.max(1)));
        debug!(rate, ?refill_interval, "starting request throttle refill task");

        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(refill_interval);
            loop {
                ticker.tick().await;
                if semaphore.available_permits() < rate as usize {
                    semaphore.add_permits(1);
                }
            }
        }));
    }
}

impl Drop for RequestThrottle {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.refill.try_lock() {
            if let Some(task) = slot.take() {
                task.abort();
            }
        }
    }
}

/// Configuration for HTTP client behavior.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum requests per second against the source site; 0 disables.
    pub max_requests_per_second: u32,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            max_requests_per_second: 4,
            timeout_seconds: 30,
            user_agent: "motorscout/0.3 (catalog research tool)".to_string(),
            follow_redirects: true,
        }
    }
}

/// HTTP client implementing [`PageFetcher`] against the live site.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    throttle: Arc<RequestThrottle>,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> anyhow::Result<Self> {
        let throttle = Arc::new(RequestThrottle::new(config.max_requests_per_second));
        Self::with_throttle(config, throttle)
    }

    /// Builds a client sharing an existing throttle with other clients.
    pub fn with_throttle(
        config: HttpClientConfig,
        throttle: Arc<RequestThrottle>,
    ) -> anyhow::Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()?;

        Ok(Self { client, throttle })
    }

    fn transcode(url: &str, body: &[u8]) -> Result<String, FetchError> {
        let (text, _, had_errors) = WINDOWS_1251.decode(body);
        if had_errors {
            return Err(FetchError::Encoding {
                url: url.to_string(),
                encoding: "windows-1251",
            });
        }
        Ok(text.into_owned())
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.throttle.acquire().await;
        debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        let markup = Self::transcode(url, &body)?;
        if markup.trim().is_empty() {
            return Err(FetchError::Parse {
                url: url.to_string(),
                reason: "empty response body".to_string(),
            });
        }

        Ok(markup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation_with_defaults() {
        let client = HttpClient::new(HttpClientConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn transcode_decodes_cyrillic() {
        // "бензин" in windows-1251
        let body = [0xE1, 0xE5, 0xED, 0xE7, 0xE8, 0xED];
        let text = HttpClient::transcode("http://example.test", &body).unwrap();
        assert_eq!(text, "бензин");
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_refills_over_time() {
        let throttle = RequestThrottle::new(2);

        // Burst capacity is consumed immediately.
        throttle.acquire().await;
        throttle.acquire().await;

        // The third token only exists after a refill tick; paused time
        // auto-advances, so this completes without real waiting.
        throttle.acquire().await;
    }

    #[tokio::test]
    async fn zero_rate_disables_throttling() {
        let throttle = RequestThrottle::new(0);
        for _ in 0..100 {
            throttle.acquire().await;
        }
    }
}
