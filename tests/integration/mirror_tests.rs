//! End-to-end mirror runs against mock servers

use crate::support::{coordinator, fast_config, host_of, html, quiet_job, serve, StaticSite};
use site_mirror::config::MirrorJob;
use site_mirror::crawler::{mirror_until, Coordinator};
use site_mirror::output::{write_markdown_report, RunStatus};
use site_mirror::robots::RobotsAdvice;
use std::future::pending;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOME: &str = r#"<html>
<head><title>Home</title></head>
<body>
    <a href="/about">About</a>
    <img src="img/logo.png">
    <a href="https://facebook.com/example">Facebook</a>
</body>
</html>"#;

#[tokio::test]
async fn test_mirror_site_end_to_end() {
    let server = MockServer::start().await;
    serve(&server, "/", html(HOME)).await;
    serve(&server, "/about", html("<html><body><p>About us</p></body></html>")).await;
    serve(
        &server,
        "/img/logo.png",
        ResponseTemplate::new(200).set_body_bytes(b"\x89PNG".to_vec()),
    )
    .await;
    // robots.txt and sitemap.xml fall through to wiremock's 404

    let out = TempDir::new().unwrap();
    let job = MirrorJob::new(&server.uri(), out.path(), 5).unwrap();
    let mut coordinator = coordinator(job);

    let report = mirror_until(&mut coordinator, pending()).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.downloaded, 2);
    assert_eq!(report.skipped_count(), 0);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.robots, Some(RobotsAdvice::Missing));

    let site = out.path().join(host_of(&server));
    assert!(site.join("index.html").is_file());
    assert!(site.join("about/index.html").is_file());
    assert_eq!(std::fs::read(site.join("img/logo.png")).unwrap(), b"\x89PNG");

    let index = std::fs::read_to_string(site.join("index.html")).unwrap();
    assert!(index.contains(r#"href="about/index.html""#));
    assert!(index.contains(r#"src="img/logo.png""#));
    assert!(index.contains(r#"href="https://facebook.com/example""#));

    // The visited page replaces the raw copy fetched as a resource
    let about = std::fs::read_to_string(site.join("about/index.html")).unwrap();
    assert!(about.contains("About us"));
}

#[tokio::test]
async fn test_social_links_are_never_fetched() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/",
        html(r#"<a href="https://twitter.com/example">t</a><img src="/fonts/icon.svg">"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/fonts/icon.svg"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let mut coordinator = coordinator(quiet_job(&server.uri(), out.path()));
    let report = mirror_until(&mut coordinator, pending()).await;

    assert!(report.status.is_completed());
    assert_eq!(report.downloaded, 0);

    let index =
        std::fs::read_to_string(out.path().join(host_of(&server)).join("index.html")).unwrap();
    assert!(index.contains(r#"src="/fonts/icon.svg""#));
}

#[tokio::test]
async fn test_resource_outcomes_are_reported() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/",
        html(
            r#"<link rel="stylesheet" href="/gone.css">
               <script src="/flaky.js"></script>
               <img src="/busy.png">"#,
        ),
    )
    .await;
    serve(&server, "/gone.css", ResponseTemplate::new(404)).await;
    serve(&server, "/flaky.js", ResponseTemplate::new(500)).await;
    Mock::given(method("GET"))
        .and(path("/busy.png"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    serve(&server, "/busy.png", ResponseTemplate::new(200).set_body_bytes(b"png".to_vec())).await;

    let out = TempDir::new().unwrap();
    let mut coordinator = coordinator(quiet_job(&server.uri(), out.path()));
    let report = mirror_until(&mut coordinator, pending()).await;

    assert!(report.status.is_completed());
    assert_eq!(report.downloaded, 1);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.failed_count(), 1);
    assert!(report.failed[0].0.ends_with("/gone.css"));
    assert!(report.skipped[0].0.ends_with("/flaky.js"));

    let md_path = out.path().join("report.md");
    write_markdown_report(&report, &md_path).unwrap();
    let markdown = std::fs::read_to_string(md_path).unwrap();
    assert!(markdown.contains("| Resources downloaded | 1 |"));
    assert!(markdown.contains("## Failed Resources"));
}

#[tokio::test]
async fn test_cyclic_pages_are_rendered_once() {
    let site = Arc::new(
        StaticSite::default()
            .page(
                "https://example.com/",
                r#"<a href="/a">A</a><a href="/">self</a>"#,
            )
            .page("https://example.com/a", r#"<a href="/b">B</a>"#)
            .page(
                "https://example.com/b",
                r#"<a href="/a">back to A</a><a href="https://example.com/">home</a>"#,
            ),
    );

    let out = TempDir::new().unwrap();
    let job = quiet_job("https://example.com/", out.path());
    let mut coordinator = Coordinator::new(job, fast_config())
        .unwrap()
        .with_renderer(site.clone())
        .with_fetcher(Arc::new(NoopFetcher));

    let report = mirror_until(&mut coordinator, pending()).await;

    assert!(report.status.is_completed());
    assert_eq!(site.renders_of("https://example.com/"), 1);
    assert_eq!(site.renders_of("https://example.com/a"), 1);
    assert_eq!(site.renders_of("https://example.com/b"), 1);
    assert_eq!(site.total_renders(), 3);
    assert_eq!(report.pages_visited, 3);

    let b = std::fs::read_to_string(out.path().join("example.com/b/index.html")).unwrap();
    assert!(b.contains(r#"href="../a/index.html""#));
    assert!(b.contains(r#"href="../index.html""#));
}

#[tokio::test]
async fn test_robots_is_advisory() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/robots.txt",
        ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"),
    )
    .await;
    serve(&server, "/", html("<p>still mirrored</p>")).await;

    let out = TempDir::new().unwrap();
    let job = MirrorJob::new(&server.uri(), out.path(), 5)
        .unwrap()
        .skip_sitemap(true);
    let mut coordinator = coordinator(job);
    let report = mirror_until(&mut coordinator, pending()).await;

    assert!(report.status.is_completed());
    assert_eq!(
        report.robots,
        Some(RobotsAdvice::Restricted {
            rules: 1,
            seed_allowed: false
        })
    );
    assert!(out
        .path()
        .join(host_of(&server))
        .join("index.html")
        .is_file());
}

/// Fetcher for runs that should not touch the network for resources
struct NoopFetcher;

#[async_trait::async_trait]
impl site_mirror::crawler::ResourceFetcher for NoopFetcher {
    async fn fetch(
        &self,
        url: &url::Url,
        _local_path: &std::path::Path,
    ) -> site_mirror::crawler::DownloadOutcome {
        site_mirror::crawler::DownloadOutcome::Skipped {
            url: url.to_string(),
            reason: "not fetched in this test".to_string(),
            attempts: 0,
        }
    }
}
