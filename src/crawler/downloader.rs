//! Bounded concurrent downloader
//!
//! Fans a batch of resources out to [`ResourceFetcher`] tasks, at most
//! `max_concurrent` of them in flight. Extra tasks wait on the semaphore, so
//! a backing-off task holds its slot while it sleeps but never blocks other
//! tasks from running.
//!
//! A batch is always drained: once the run's [`StopSignal`] fires, queued
//! downloads are skipped, but tasks already writing are awaited rather than
//! aborted.

use crate::crawler::fetcher::{DownloadOutcome, ResourceFetcher};
use crate::crawler::stop::StopSignal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Downloaded / skipped / failed resources of a batch or a whole run
#[derive(Debug, Clone, Default)]
pub struct OutcomeLog {
    /// URLs written to disk
    pub downloaded: Vec<String>,
    /// (url, reason)
    pub skipped: Vec<(String, String)>,
    /// (url, reason)
    pub failed: Vec<(String, String)>,
}

impl OutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::Downloaded { url, .. } => self.downloaded.push(url),
            DownloadOutcome::Skipped { url, reason, .. } => self.skipped.push((url, reason)),
            DownloadOutcome::Failed { url, reason, .. } => self.failed.push((url, reason)),
        }
    }

    /// Appends every entry of `other`
    pub fn merge(&mut self, other: OutcomeLog) {
        self.downloaded.extend(other.downloaded);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
    }

    /// Total number of recorded outcomes
    pub fn total(&self) -> usize {
        self.downloaded.len() + self.skipped.len() + self.failed.len()
    }
}

/// Runs downloads concurrently under a fixed ceiling
pub struct Downloader {
    fetcher: Arc<dyn ResourceFetcher>,
    slots: Arc<Semaphore>,
    max_concurrent: usize,
    stop: StopSignal,
}

impl Downloader {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            fetcher,
            slots: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            stop: StopSignal::new(),
        }
    }

    /// Skips downloads that have not started once `stop` fires
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Downloads every resource and returns the batch's outcomes
    ///
    /// Returns only once every resource has reached a terminal outcome.
    /// Completion order is not preserved.
    pub async fn download_all<F>(&self, resources: Vec<Url>, local_path: F) -> OutcomeLog
    where
        F: Fn(&Url) -> PathBuf,
    {
        let mut log = OutcomeLog::new();
        if resources.is_empty() {
            return log;
        }

        tracing::debug!(
            "Downloading {} resources ({} at a time)",
            resources.len(),
            self.max_concurrent
        );

        let mut tasks = JoinSet::new();
        for url in resources {
            let path = local_path(&url);
            let fetcher = Arc::clone(&self.fetcher);
            let slots = Arc::clone(&self.slots);
            let stop = self.stop.clone();

            tasks.spawn(async move {
                let _permit = match slots.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return DownloadOutcome::Failed {
                            url: url.to_string(),
                            reason: "Download pool closed".to_string(),
                            attempts: 0,
                        }
                    }
                };
                if stop.is_stopped() {
                    return DownloadOutcome::Skipped {
                        url: url.to_string(),
                        reason: "Interrupted".to_string(),
                        attempts: 0,
                    };
                }
                fetcher.fetch(&url, &path).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => log.record(outcome),
                Err(e) => {
                    tracing::error!("Download task did not complete: {}", e);
                    log.failed
                        .push(("<unknown>".to_string(), format!("Task error: {}", e)));
                }
            }
        }

        log
    }
}
