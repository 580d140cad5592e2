//! HTTP fetcher implementation
//!
//! This module handles every resource download of a mirror run:
//! - Building HTTP clients with proper user agent strings
//! - Retry logic with exponential backoff
//! - Classification of terminal vs. retryable responses
//! - Persisting bodies to their mapped local path

use crate::config::{DownloaderConfig, UserAgentConfig};
use crate::crawler::stop::StopSignal;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Terminal result of downloading one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Body was written to `path`
    Downloaded {
        url: String,
        path: PathBuf,
        attempts: u32,
    },

    /// Nothing was written, but the resource is not considered broken
    /// (unexpected status codes, local directory in the way)
    Skipped {
        url: String,
        reason: String,
        attempts: u32,
    },

    /// Terminal HTTP error, or retries exhausted
    Failed {
        url: String,
        reason: String,
        attempts: u32,
    },
}

impl DownloadOutcome {
    pub fn url(&self) -> &str {
        match self {
            Self::Downloaded { url, .. } | Self::Skipped { url, .. } | Self::Failed { url, .. } => {
                url
            }
        }
    }

    /// Number of HTTP requests issued for this resource
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Downloaded { attempts, .. }
            | Self::Skipped { attempts, .. }
            | Self::Failed { attempts, .. } => *attempts,
        }
    }

    pub fn is_downloaded(&self) -> bool {
        matches!(self, Self::Downloaded { .. })
    }
}

/// Retry and backoff parameters for resource downloads
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts per resource, including the first
    pub max_attempts: u32,
    /// Base of the exponential backoff
    pub backoff_base: u32,
    /// Length of one backoff unit
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &DownloaderConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff_base: config.backoff_base.max(1),
            backoff_unit: Duration::from_millis(config.backoff_unit_ms),
        }
    }

    /// Delay after the failed attempt with 0-based index `attempt`
    ///
    /// With the defaults this gives 1s, 2s, 4s, ...
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = self.backoff_base.saturating_pow(attempt);
        self.backoff_unit.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&DownloaderConfig::default())
    }
}

/// Downloads one resource to one local path
///
/// Implementations never return errors: every problem is folded into the
/// [`DownloadOutcome`].
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, url: &Url, local_path: &Path) -> DownloadOutcome;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_mirror::config::UserAgentConfig;
/// use site_mirror::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// What went wrong on the most recent attempt
enum LastFailure {
    RateLimited,
    Unexpected(StatusCode),
    Network(String),
}

/// Resource fetcher backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
    stop: StopSignal,
}

impl HttpFetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self {
            client,
            policy,
            stop: StopSignal::new(),
        }
    }

    /// Abandons requests and backoff sleeps once `stop` fires
    ///
    /// A body that has already arrived is still written.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Requests `url` until a body arrives or the retry policy gives up
    async fn download(&self, url: &Url, url_str: &str) -> Result<(Vec<u8>, u32), DownloadOutcome> {
        let mut last = LastFailure::Network("no attempt made".to_string());
        let mut attempts = 0;

        while attempts < self.policy.max_attempts {
            let attempt = attempts;
            attempts += 1;

            match self.client.get(url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        match response.bytes().await {
                            Ok(body) => return Ok((body.to_vec(), attempts)),
                            Err(e) => {
                                tracing::warn!(
                                    "Attempt {}/{} reading {} failed: {}",
                                    attempts,
                                    self.policy.max_attempts,
                                    url_str,
                                    e
                                );
                                last = LastFailure::Network(e.to_string());
                            }
                        }
                    } else if status == StatusCode::FORBIDDEN || status == StatusCode::NOT_FOUND {
                        tracing::warn!("{} returned {}, giving up", url_str, status);
                        return Err(DownloadOutcome::Failed {
                            url: url_str.to_string(),
                            reason: format!("HTTP {}", status.as_u16()),
                            attempts,
                        });
                    } else if status == StatusCode::TOO_MANY_REQUESTS {
                        tracing::warn!(
                            "Attempt {}/{}: {} is rate limited",
                            attempts,
                            self.policy.max_attempts,
                            url_str
                        );
                        last = LastFailure::RateLimited;
                    } else {
                        tracing::warn!(
                            "Attempt {}/{}: unexpected HTTP {} for {}",
                            attempts,
                            self.policy.max_attempts,
                            status.as_u16(),
                            url_str
                        );
                        last = LastFailure::Unexpected(status);
                    }
                }
                Err(e) => {
                    let error = if e.is_timeout() {
                        "Request timeout".to_string()
                    } else if e.is_connect() {
                        format!("Connection failed: {}", e)
                    } else {
                        e.to_string()
                    };
                    tracing::warn!(
                        "Attempt {}/{} for {} failed: {}",
                        attempts,
                        self.policy.max_attempts,
                        url_str,
                        error
                    );
                    last = LastFailure::Network(error);
                }
            }

            if attempts < self.policy.max_attempts {
                let delay = self.policy.delay(attempt);
                tracing::debug!("Backing off {:?} before retrying {}", delay, url_str);
                tokio::time::sleep(delay).await;
            }
        }

        Err(match last {
            LastFailure::Unexpected(status) => DownloadOutcome::Skipped {
                url: url_str.to_string(),
                reason: format!("Unexpected HTTP {}", status.as_u16()),
                attempts,
            },
            LastFailure::RateLimited => DownloadOutcome::Failed {
                url: url_str.to_string(),
                reason: format!("Rate limited (HTTP 429) after {} attempts", attempts),
                attempts,
            },
            LastFailure::Network(error) => DownloadOutcome::Failed {
                url: url_str.to_string(),
                reason: format!("{} after {} attempts", error, attempts),
                attempts,
            },
        })
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    /// Fetches `url` with retry logic and writes the body to `local_path`
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Write body → Downloaded |
    /// | HTTP 403/404 | Immediate → Failed |
    /// | HTTP 429 | Backoff, retry; exhausted → Failed |
    /// | Network error / timeout | Backoff, retry; exhausted → Failed |
    /// | Any other status | Backoff, retry; exhausted → Skipped |
    /// | Local path is a directory | Immediate → Skipped, no request |
    async fn fetch(&self, url: &Url, local_path: &Path) -> DownloadOutcome {
        let url_str = url.to_string();

        if is_directory(local_path).await {
            tracing::warn!(
                "Not downloading {}: {} is a directory",
                url_str,
                local_path.display()
            );
            return DownloadOutcome::Skipped {
                url: url_str,
                reason: format!("{} is a directory", local_path.display()),
                attempts: 0,
            };
        }

        let downloaded = tokio::select! {
            biased;

            _ = self.stop.stopped() => {
                tracing::debug!("Abandoning {}: run is stopping", url_str);
                return DownloadOutcome::Skipped {
                    url: url_str,
                    reason: "Interrupted".to_string(),
                    attempts: 0,
                };
            }
            downloaded = self.download(url, &url_str) => downloaded,
        };

        match downloaded {
            Ok((body, attempts)) => write_body(url_str, local_path, &body, attempts).await,
            Err(outcome) => outcome,
        }
    }
}

async fn is_directory(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Creates parent directories and writes `body`, overwriting any existing file
async fn write_file(path: &Path, body: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    // A page written concurrently may have claimed the path as a directory.
    if is_directory(path).await {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} is a directory", path.display()),
        ));
    }
    tokio::fs::write(path, body).await
}

async fn write_body(url: String, path: &Path, body: &[u8], attempts: u32) -> DownloadOutcome {
    let result = write_file(path, body).await;

    match result {
        Ok(()) => {
            tracing::debug!("Saved {} to {}", url, path.display());
            DownloadOutcome::Downloaded {
                url,
                path: path.to_path_buf(),
                attempts,
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            tracing::warn!("Not writing {}: {}", url, e);
            DownloadOutcome::Skipped {
                url,
                reason: e.to_string(),
                attempts,
            }
        }
        Err(e) => {
            tracing::warn!("Failed to write {} to {}: {}", url, path.display(), e);
            DownloadOutcome::Failed {
                url,
                reason: format!("Write error: {}", e),
                attempts,
            }
        }
    }
}
