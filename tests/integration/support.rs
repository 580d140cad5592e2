//! Shared helpers for the integration tests

use async_trait::async_trait;
use site_mirror::config::{Config, MirrorJob};
use site_mirror::crawler::{Coordinator, RenderError, Renderer};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config with millisecond backoff so retry paths stay fast
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.downloader.backoff_unit_ms = 1;
    config.downloader.request_timeout_secs = 5;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

/// A job that writes under `output_root`, with sitemap and robots disabled
pub fn quiet_job(seed: &str, output_root: &Path) -> MirrorJob {
    MirrorJob::new(seed, output_root, 5)
        .expect("valid job")
        .skip_sitemap(true)
        .skip_robots(true)
}

pub fn coordinator(job: MirrorJob) -> Coordinator {
    Coordinator::new(job, fast_config()).expect("coordinator")
}

/// An HTML response
pub fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html; charset=utf-8")
}

/// Mounts `template` for GET `route`
pub async fn serve(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Host part of a mock server's URI, i.e. the mirror's directory name
pub fn host_of(server: &MockServer) -> String {
    Url::parse(&server.uri())
        .expect("server uri")
        .host_str()
        .expect("server host")
        .to_string()
}

/// Renderer serving a fixed set of pages and counting renders per URL
#[derive(Default)]
pub struct StaticSite {
    pages: HashMap<String, String>,
    renders: Mutex<HashMap<String, usize>>,
}

impl StaticSite {
    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn renders_of(&self, url: &str) -> usize {
        self.renders
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_renders(&self) -> usize {
        self.renders.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Renderer for StaticSite {
    async fn render(&self, url: &Url, _timeout: Duration) -> Result<String, RenderError> {
        *self
            .renders
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| RenderError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Renderer that never finishes
pub struct StalledRenderer;

#[async_trait]
impl Renderer for StalledRenderer {
    async fn render(&self, _url: &Url, _timeout: Duration) -> Result<String, RenderError> {
        std::future::pending().await
    }
}
