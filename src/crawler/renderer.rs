//! Page rendering
//!
//! The crawl only needs "the final HTML of a URL". Anything that can produce
//! it (a headless browser, a cache, a static map in tests) implements
//! [`Renderer`]. [`HttpRenderer`] is the built-in implementation: a plain GET.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a page could not be rendered
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Timed out rendering {url}")]
    Timeout { url: String },

    #[error("Network error rendering {url}: {message}")]
    Network { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} is not HTML (Content-Type: {content_type})")]
    NotHtml { url: String, content_type: String },
}

impl RenderError {
    /// True for failures of the transport rather than of the page
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Network { .. })
    }

    /// True if rendering the same URL again cannot succeed
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::NotHtml { .. } => true,
            Self::Status { status, .. } => matches!(status, 403 | 404 | 410),
            _ => false,
        }
    }
}

/// Produces the fully resolved HTML of a page
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &Url, timeout: Duration) -> Result<String, RenderError>;
}

/// Renderer that fetches the page body over HTTP
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &Url, timeout: Duration) -> Result<String, RenderError> {
        let url_str = url.to_string();

        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(&url_str, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                url: url_str,
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        // Servers that omit the header get the benefit of the doubt.
        if !content_type.is_empty() && !content_type.to_ascii_lowercase().contains("html") {
            return Err(RenderError::NotHtml {
                url: url_str,
                content_type,
            });
        }

        response
            .text()
            .await
            .map_err(|e| classify_error(&url_str, e))
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> RenderError {
    if error.is_timeout() {
        RenderError::Timeout {
            url: url.to_string(),
        }
    } else {
        RenderError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
