//! Crawler coordinator - main mirror orchestration logic
//!
//! This module contains the crawl loop that coordinates one mirror run:
//! - Bootstrapping the host directory
//! - The advisory robots.txt check
//! - Depth-first page visits with whole-page retries
//! - Handing each page's resources to the bounded downloader
//! - Feeding sitemap entries in as extra seeds

use crate::config::{Config, MirrorJob};
use crate::crawler::downloader::{Downloader, OutcomeLog};
use crate::crawler::fetcher::{build_http_client, HttpFetcher, ResourceFetcher, RetryPolicy};
use crate::crawler::paths::{map_path, mirror_key};
use crate::crawler::processor::process_page;
use crate::crawler::renderer::{HttpRenderer, Renderer};
use crate::crawler::sitemap;
use crate::crawler::stop::StopSignal;
use crate::output::{MirrorReport, RunStatus};
use crate::robots::{check_robots, RobotsAdvice};
use crate::state::{PageState, VisitedSet};
use crate::url::is_same_host;
use crate::MirrorError;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Main mirror coordinator structure
pub struct Coordinator {
    job: MirrorJob,
    config: Arc<Config>,
    client: Client,
    renderer: Arc<dyn Renderer>,
    downloader: Downloader,
    stop: StopSignal,
    visited: VisitedSet,
    /// Mirror keys already handed to the downloader in this run
    fetched: HashSet<String>,
    outcomes: OutcomeLog,
    page_failures: Vec<(String, String)>,
    robots: Option<RobotsAdvice>,
    config_hash: Option<String>,
    started_at: Option<DateTime<Utc>>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `job` - The operator's mirror job
    /// * `config` - Engine tuning
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run, with the HTTP renderer and fetcher
    /// * `Err(MirrorError)` - The HTTP client could not be built
    pub fn new(job: MirrorJob, config: Config) -> Result<Self, MirrorError> {
        let request_timeout = Duration::from_secs(config.downloader.request_timeout_secs);
        let client = build_http_client(&config.user_agent, request_timeout)?;

        let stop = StopSignal::new();
        let fetcher = HttpFetcher::new(client.clone(), RetryPolicy::from_config(&config.downloader))
            .with_stop_signal(stop.clone());
        let downloader = Downloader::new(
            Arc::new(fetcher),
            config.downloader.max_concurrent_downloads as usize,
        )
        .with_stop_signal(stop.clone());

        Ok(Self {
            job,
            config: Arc::new(config),
            renderer: Arc::new(HttpRenderer::new(client.clone())),
            client,
            downloader,
            stop,
            visited: VisitedSet::new(),
            fetched: HashSet::new(),
            outcomes: OutcomeLog::new(),
            page_failures: Vec::new(),
            robots: None,
            config_hash: None,
            started_at: None,
        })
    }

    /// Replaces the page renderer
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Replaces the resource fetcher, keeping the concurrency ceiling
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        self.downloader = Downloader::new(fetcher, self.downloader.max_concurrent())
            .with_stop_signal(self.stop.clone());
        self
    }

    /// Records the hash of the tuning file in the report
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn job(&self) -> &MirrorJob {
        &self.job
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Handle that winds down a running [`run`](Coordinator::run)
    ///
    /// Once fired, `run` stops issuing requests, lets writes already under
    /// way finish, and returns [`MirrorError::Interrupted`].
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Runs the mirror to completion
    ///
    /// 1. Create `outputRoot/<host>`
    /// 2. Check robots.txt (advisory)
    /// 3. Crawl from the seed
    /// 4. Crawl from every same-host sitemap entry
    ///
    /// Page and resource failures are absorbed and show up in the report.
    /// Only run-level failures are returned: an unreachable seed, an I/O
    /// error while creating the host directory, or the stop signal.
    pub async fn run(&mut self) -> Result<(), MirrorError> {
        self.started_at = Some(Utc::now());
        let start_time = Instant::now();
        let seed = self.job.seed_url().clone();

        if self.stop.is_stopped() {
            return Err(MirrorError::Interrupted);
        }

        tracing::info!(
            "Mirroring {} into {}",
            seed,
            self.job.host_dir().display()
        );
        tokio::fs::create_dir_all(self.job.host_dir()).await?;

        if !self.job.robots_skipped() {
            let advice = tokio::select! {
                biased;
                _ = self.stop.stopped() => return Err(MirrorError::Interrupted),
                advice = check_robots(
                    &self.client,
                    &seed,
                    &self.config.user_agent.crawler_name,
                ) => advice,
            };
            self.robots = Some(advice);
        }

        self.crawl_from(seed.clone(), true).await?;

        if !self.job.sitemap_skipped() {
            let entries = tokio::select! {
                biased;
                _ = self.stop.stopped() => return Err(MirrorError::Interrupted),
                entries = sitemap::expand(&self.client, &seed) => entries,
            };
            for entry in entries {
                if !is_same_host(&entry, &seed) {
                    tracing::warn!("Ignoring sitemap entry on another host: {}", entry);
                    continue;
                }
                self.crawl_from(entry, false).await?;
            }
        }

        tracing::info!(
            "Mirror complete: {} pages, {} resources downloaded, {} skipped, {} failed in {:.1}s",
            self.visited.count(PageState::Visited),
            self.outcomes.downloaded.len(),
            self.outcomes.skipped.len(),
            self.outcomes.failed.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(())
    }

    /// Builds the report for the run so far
    pub fn report(&self, status: RunStatus) -> MirrorReport {
        let mut report = MirrorReport::summarize(&self.outcomes);
        report.seed = self.job.seed_url().to_string();
        report.output_dir = self.job.host_dir();
        report.started_at = self.started_at;
        report.finished_at = Some(Utc::now());
        report.pages_visited = self.visited.count(PageState::Visited);
        report.page_failures = self.page_failures.clone();
        report.robots = self.robots.clone();
        report.config_hash = self.config_hash.clone();
        report.status = status;
        report
    }

    /// Depth-first crawl from `start`
    ///
    /// Links of a page are visited in document order, each subtree to
    /// completion before the next sibling. Already claimed URLs are skipped,
    /// which is what breaks cycles.
    async fn crawl_from(&mut self, start: Url, is_seed: bool) -> Result<(), MirrorError> {
        let host = self.job.host().to_string();
        let mut stack = vec![start];

        while let Some(url) = stack.pop() {
            if self.stop.is_stopped() {
                return Err(MirrorError::Interrupted);
            }

            let key = mirror_key(&host, &url);
            if !self.visited.begin(&key) {
                tracing::debug!("Already visited {}", url);
                continue;
            }

            match self.visit_with_retries(&url).await {
                Ok(links) => {
                    self.visited.finish(&key, PageState::Visited)?;
                    stack.extend(links.into_iter().rev());
                }
                Err(MirrorError::Interrupted) => {
                    self.visited.finish(&key, PageState::Failed)?;
                    return Err(MirrorError::Interrupted);
                }
                Err(e) => {
                    self.visited.finish(&key, PageState::Failed)?;

                    let is_seed_page = is_seed && key == mirror_key(&host, self.job.seed_url());
                    if is_seed_page && e.is_network() {
                        return Err(MirrorError::SeedUnreachable {
                            url: url.to_string(),
                            reason: e.to_string(),
                        });
                    }

                    tracing::warn!("Giving up on {}: {}", url, e);
                    self.page_failures.push((url.to_string(), e.to_string()));
                }
            }
        }

        Ok(())
    }

    /// Visits a page, retrying the whole visit up to `page-attempts` times
    ///
    /// Terminal render failures (404, non-HTML responses) are not retried.
    async fn visit_with_retries(&mut self, url: &Url) -> Result<Vec<Url>, MirrorError> {
        let attempts = self.config.crawler.page_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.visit(url).await {
                Ok(links) => return Ok(links),
                Err(MirrorError::Interrupted) => return Err(MirrorError::Interrupted),
                Err(MirrorError::Render(e)) if e.is_terminal() => {
                    return Err(MirrorError::Render(e));
                }
                Err(e) if attempt >= attempts => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        "Visit {}/{} of {} failed: {}",
                        attempt,
                        attempts,
                        url,
                        e
                    );
                    attempt += 1;
                }
            }
        }
    }

    /// Renders, rewrites, and writes one page, then downloads its resources
    ///
    /// Returns the page's internal links once every resource download has
    /// reached an outcome.
    async fn visit(&mut self, url: &Url) -> Result<Vec<Url>, MirrorError> {
        tracing::info!("Visiting {}", url);

        let html = tokio::select! {
            biased;
            _ = self.stop.stopped() => return Err(MirrorError::Interrupted),
            html = self.renderer.render(url, self.job.timeout()) => html?,
        };

        let page = process_page(
            url,
            &html,
            self.job.host(),
            self.job.output_root(),
            &self.config.filters,
        )?;

        let page_path = map_path(self.job.host(), url, self.job.output_root());
        write_page(&page_path, &page.html).await?;
        tracing::debug!(
            "Wrote {} ({})",
            page_path.display(),
            page.title.as_deref().unwrap_or("untitled")
        );

        // Pages already claimed by the crawl are never fetched raw, so a
        // rewritten page cannot be clobbered by its original.
        let host = self.job.host().to_string();
        let resources: Vec<Url> = page
            .resources
            .into_iter()
            .map(|resource| resource.url)
            .filter(|resource| {
                let key = mirror_key(&host, resource);
                !self.visited.contains(&key) && self.fetched.insert(key)
            })
            .collect();

        let output_root = self.job.output_root().to_path_buf();
        let batch = self
            .downloader
            .download_all(resources, |resource| {
                map_path(&host, resource, &output_root)
            })
            .await;

        tracing::debug!(
            "{}: {} downloaded, {} skipped, {} failed",
            url,
            batch.downloaded.len(),
            batch.skipped.len(),
            batch.failed.len()
        );
        self.outcomes.merge(batch);

        Ok(page.internal_links)
    }
}

/// Writes a rewritten page, refusing to replace a directory
async fn write_page(path: &Path, html: &str) -> Result<(), MirrorError> {
    if tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
    {
        return Err(MirrorError::DirectoryConflict {
            path: path.display().to_string(),
        });
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, html).await?;
    Ok(())
}
