//! Interrupts and run-level failures clean up the host directory

use crate::support::{coordinator, fast_config, quiet_job, StalledRenderer, StaticSite};
use async_trait::async_trait;
use site_mirror::crawler::{mirror_until, Coordinator, DownloadOutcome, ResourceFetcher};
use site_mirror::output::RunStatus;
use std::future::pending;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Notify;
use url::Url;

/// Fetcher whose write takes a while and ignores the stop signal
#[derive(Default)]
struct SlowWriter {
    started: Notify,
    finished: AtomicBool,
}

#[async_trait]
impl ResourceFetcher for SlowWriter {
    async fn fetch(&self, url: &Url, local_path: &Path) -> DownloadOutcome {
        self.started.notify_one();
        tokio::time::sleep(Duration::from_millis(150)).await;

        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent).await.unwrap();
        }
        tokio::fs::write(local_path, b"late bytes").await.unwrap();
        self.finished.store(true, Ordering::SeqCst);

        DownloadOutcome::Downloaded {
            url: url.to_string(),
            path: local_path.to_path_buf(),
            attempts: 1,
        }
    }
}

#[tokio::test]
async fn test_interrupt_before_first_page_removes_host_dir() {
    let out = TempDir::new().unwrap();
    let job = quiet_job("https://example.com/", out.path());
    let host_dir = job.host_dir();

    let mut coordinator = Coordinator::new(job, fast_config())
        .unwrap()
        .with_renderer(Arc::new(StalledRenderer));

    let report = mirror_until(&mut coordinator, async {
        // Long enough for the host directory to be created
        tokio::time::sleep(Duration::from_millis(200)).await;
    })
    .await;

    assert_eq!(report.status, RunStatus::Interrupted);
    assert_eq!(report.pages_visited, 0);
    assert!(!host_dir.exists());
    assert!(out.path().exists());
}

#[tokio::test]
async fn test_immediate_interrupt() {
    let out = TempDir::new().unwrap();
    let job = quiet_job("https://example.com/", out.path());
    let host_dir = job.host_dir();

    let mut coordinator = Coordinator::new(job, fast_config())
        .unwrap()
        .with_renderer(Arc::new(StalledRenderer));

    let report = mirror_until(&mut coordinator, async {}).await;

    assert_eq!(report.status, RunStatus::Interrupted);
    assert!(!host_dir.exists());
}

#[tokio::test]
async fn test_unreachable_seed_aborts_and_cleans_up() {
    let out = TempDir::new().unwrap();
    let job = quiet_job("http://127.0.0.1:1/", out.path());
    let host_dir = job.host_dir();

    let mut coordinator = coordinator(job);
    let report = mirror_until(&mut coordinator, pending()).await;

    match &report.status {
        RunStatus::Aborted(reason) => assert!(reason.contains("unreachable")),
        other => panic!("expected Aborted, got {:?}", other),
    }
    assert!(!host_dir.exists());
    // counts are still reported
    assert_eq!(report.downloaded, 0);
    assert_eq!(report.failed_count(), 0);
}

#[tokio::test]
async fn test_interrupt_waits_for_started_writes_before_cleanup() {
    let out = TempDir::new().unwrap();
    let job = quiet_job("http://example.com/", out.path());
    let host_dir = job.host_dir();

    let site = StaticSite::default().page("http://example.com/", r#"<img src="/img/slow.png">"#);
    let writer = Arc::new(SlowWriter::default());

    let mut coordinator = Coordinator::new(job, fast_config())
        .unwrap()
        .with_renderer(Arc::new(site))
        .with_fetcher(writer.clone());

    let started = writer.clone();
    let report = mirror_until(&mut coordinator, async move {
        started.started.notified().await;
    })
    .await;

    assert_eq!(report.status, RunStatus::Interrupted);
    // the write was allowed to finish, and only then was the tree removed
    assert!(writer.finished.load(Ordering::SeqCst));
    assert!(!host_dir.exists());

    // nothing shows up afterwards either
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!host_dir.exists());
}
