//! Frontier expansion from sitemap.xml

use crate::support::{coordinator, host_of, html, serve};
use site_mirror::config::MirrorJob;
use site_mirror::crawler::mirror_until;
use std::future::pending;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sitemap(locs: &[String]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
    );
    for loc in locs {
        xml.push_str(&format!("\n  <url><loc>{}</loc></url>", loc));
    }
    xml.push_str("\n</urlset>");
    xml
}

#[tokio::test]
async fn test_sitemap_entries_are_crawled_as_seeds() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve(&server, "/", html("<p>home, links nowhere</p>")).await;
    serve(&server, "/orphan", html(r#"<a href="/orphan/child">child</a>"#)).await;
    serve(&server, "/orphan/child", html("<p>child</p>")).await;
    serve(
        &server,
        "/sitemap.xml",
        ResponseTemplate::new(200).set_body_raw(
            sitemap(&[
                format!("{}/", base),
                format!("{}/orphan", base),
                "https://elsewhere.example/page".to_string(),
            ]),
            "application/xml",
        ),
    )
    .await;

    let out = TempDir::new().unwrap();
    let job = MirrorJob::new(&base, out.path(), 5).unwrap().skip_robots(true);
    let mut coordinator = coordinator(job);
    let report = mirror_until(&mut coordinator, pending()).await;

    assert!(report.status.is_completed());
    // seed, orphan, and the child found from the orphan; the seed is not re-rendered
    assert_eq!(report.pages_visited, 3);

    let site = out.path().join(host_of(&server));
    assert!(site.join("orphan/index.html").is_file());
    assert!(site.join("orphan/child/index.html").is_file());
    assert!(!out.path().join("elsewhere.example").exists());
}

#[tokio::test]
async fn test_malformed_sitemap_is_not_fatal() {
    let server = MockServer::start().await;
    serve(&server, "/", html("<p>home</p>")).await;
    serve(
        &server,
        "/sitemap.xml",
        ResponseTemplate::new(200).set_body_string("<urlset><url><loc>broken"),
    )
    .await;

    let out = TempDir::new().unwrap();
    let job = MirrorJob::new(&server.uri(), out.path(), 5)
        .unwrap()
        .skip_robots(true);
    let mut coordinator = coordinator(job);
    let report = mirror_until(&mut coordinator, pending()).await;

    assert!(report.status.is_completed());
    assert_eq!(report.pages_visited, 1);
}

#[tokio::test]
async fn test_skip_sitemap_never_requests_it() {
    let server = MockServer::start().await;
    serve(&server, "/", html("<p>home</p>")).await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let job = MirrorJob::new(&server.uri(), out.path(), 5)
        .unwrap()
        .skip_robots(true)
        .skip_sitemap(true);
    let mut coordinator = coordinator(job);
    let report = mirror_until(&mut coordinator, pending()).await;

    assert!(report.status.is_completed());
}
