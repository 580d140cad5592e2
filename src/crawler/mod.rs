//! Crawler module for mirroring a site
//!
//! This module contains the core mirroring logic, including:
//! - Resource classification and local path mapping
//! - HTTP downloads with retry logic under a concurrency ceiling
//! - HTML parsing and link rewriting
//! - Sitemap frontier expansion
//! - Overall crawl coordination and interrupt handling

mod classifier;
mod coordinator;
mod downloader;
mod fetcher;
mod parser;
mod paths;
mod processor;
mod renderer;
mod rewriter;
mod sitemap;
mod stop;

pub use classifier::{classify, looks_like_page, Classification};
pub use coordinator::Coordinator;
pub use downloader::{Downloader, OutcomeLog};
pub use fetcher::{build_http_client, DownloadOutcome, HttpFetcher, ResourceFetcher, RetryPolicy};
pub use parser::{parse_html, resolve_link, Candidate, ParsedPage, TagKind};
pub use paths::{map_path, mirror_key, relative_link, EXTERNAL_DIR, INDEX_FILE};
pub use processor::{process_page, ProcessedPage, ResourceUrl};
pub use renderer::{HttpRenderer, RenderError, Renderer};
pub use rewriter::rewrite_links;
pub use sitemap::{expand, parse_sitemap, sitemap_url, SitemapError, SITEMAP_NAMESPACE};
pub use stop::StopSignal;

use crate::output::{MirrorReport, RunStatus};
use crate::MirrorError;
use std::future::Future;
use std::path::Path;

/// Runs `coordinator` until it finishes or `shutdown` resolves
///
/// This is the main entry point for a mirror run. A run that does not
/// complete, whether interrupted or stopped by a run-level error, leaves
/// nothing behind: `outputRoot/<host>` is removed before returning.
///
/// On interrupt the run is not dropped mid-flight. Its stop signal fires and
/// the run is awaited until every started write has finished, so nothing can
/// recreate the directory after it is removed.
///
/// # Arguments
///
/// * `coordinator` - The configured coordinator
/// * `shutdown` - Resolves when the run should stop (e.g. Ctrl-C)
///
/// # Returns
///
/// The report of the run, whatever its status.
///
/// # Example
///
/// ```no_run
/// use site_mirror::config::{Config, MirrorJob};
/// use site_mirror::crawler::{mirror_until, Coordinator};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let job = MirrorJob::new("https://example.com", "sites", 30)?;
/// let mut coordinator = Coordinator::new(job, Config::default())?;
/// let report = mirror_until(&mut coordinator, async {
///     let _ = tokio::signal::ctrl_c().await;
/// })
/// .await;
/// println!("{}", report);
/// # Ok(())
/// # }
/// ```
pub async fn mirror_until<F>(coordinator: &mut Coordinator, shutdown: F) -> MirrorReport
where
    F: Future<Output = ()>,
{
    let stop = coordinator.stop_signal();
    let mut interrupted = false;

    let result = {
        let run = coordinator.run();
        tokio::pin!(run);
        tokio::pin!(shutdown);

        let finished = tokio::select! {
            // An interrupt that is already pending wins over further crawling
            biased;

            _ = &mut shutdown => None,
            result = &mut run => Some(result),
        };

        match finished {
            Some(result) => result,
            None => {
                tracing::warn!("Interrupted, waiting for in-flight writes");
                interrupted = true;
                stop.stop();
                run.await
            }
        }
    };

    let status = match result {
        _ if interrupted => RunStatus::Interrupted,
        Ok(()) => RunStatus::Completed,
        Err(MirrorError::Interrupted) => RunStatus::Interrupted,
        Err(e) => {
            tracing::error!("Mirror aborted: {}", e);
            RunStatus::Aborted(e.to_string())
        }
    };

    if status == RunStatus::Interrupted {
        tracing::warn!("Discarding partial mirror");
    }

    if !status.is_completed() {
        cleanup_host_dir(&coordinator.job().host_dir()).await;
    }

    coordinator.report(status)
}

/// Removes a partially written mirror
///
/// A directory that does not exist is not an error.
pub async fn cleanup_host_dir(host_dir: &Path) {
    match tokio::fs::remove_dir_all(host_dir).await {
        Ok(()) => tracing::info!("Removed {}", host_dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::error!("Failed to remove {}: {}", host_dir.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_cleanup_removes_tree() {
        let dir = TempDir::new().unwrap();
        let host_dir = dir.path().join("example.com");
        std::fs::create_dir_all(host_dir.join("img")).unwrap();
        std::fs::write(host_dir.join("img/logo.png"), b"png").unwrap();

        cleanup_host_dir(&host_dir).await;

        assert!(!host_dir.exists());
        assert!(dir.path().exists());
    }

    #[tokio::test]
    async fn test_cleanup_missing_dir() {
        let dir = TempDir::new().unwrap();
        cleanup_host_dir(&dir.path().join("never-created")).await;
    }
}
