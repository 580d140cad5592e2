//! Sitemap frontier expansion
//!
//! Reads `<site-root>/sitemap.xml` and turns every `<loc>` of a
//! `<urlset>` in the sitemaps.org namespace into an extra seed. Any failure
//! here only means "no extra seeds".

use crate::url::parse_http_url;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use reqwest::Client;
use thiserror::Error;
use url::Url;

/// XML namespace of the sitemap protocol
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Failed to fetch sitemap: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Sitemap returned HTTP {0}")]
    Status(u16),

    #[error("Malformed sitemap XML: {0}")]
    Malformed(String),

    #[error("Sitemap has no <urlset> root in the sitemap namespace")]
    MissingUrlset,
}

/// Location of the sitemap for the site `seed` belongs to
pub fn sitemap_url(seed: &Url) -> Result<Url, url::ParseError> {
    seed.join("/sitemap.xml")
}

/// Fetches the sitemap of `seed`'s site and returns its page URLs
///
/// Never fails: fetch and parse errors are logged and yield an empty list.
/// Entries that are not absolute http(s) URLs are dropped.
pub async fn expand(client: &Client, seed: &Url) -> Vec<Url> {
    match fetch_sitemap(client, seed).await {
        Ok(locs) => {
            let urls: Vec<Url> = locs
                .into_iter()
                .filter_map(|loc| match parse_http_url(&loc) {
                    Ok(url) => Some(url),
                    Err(e) => {
                        tracing::warn!("Ignoring sitemap entry {:?}: {}", loc, e);
                        None
                    }
                })
                .collect();
            tracing::info!("Sitemap lists {} URLs", urls.len());
            urls
        }
        Err(e) => {
            tracing::warn!("No sitemap seeds for {}: {}", seed, e);
            Vec::new()
        }
    }
}

async fn fetch_sitemap(client: &Client, seed: &Url) -> Result<Vec<String>, SitemapError> {
    let url = sitemap_url(seed).map_err(|e| SitemapError::Malformed(e.to_string()))?;
    tracing::debug!("Fetching sitemap {}", url);

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SitemapError::Status(status.as_u16()));
    }

    let body = response.text().await?;
    parse_sitemap(&body)
}

/// Extracts the `<loc>` values of a sitemap document in document order
///
/// Only elements bound to [`SITEMAP_NAMESPACE`] count; the root must be a
/// `<urlset>`.
///
/// # Example
///
/// ```
/// use site_mirror::crawler::parse_sitemap;
///
/// let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///   <url><loc>https://example.com/page1</loc></url>
/// </urlset>"#;
/// assert_eq!(parse_sitemap(xml).unwrap(), vec!["https://example.com/page1"]);
/// ```
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>, SitemapError> {
    let mut reader = NsReader::from_str(xml);

    let mut locs = Vec::new();
    let mut saw_urlset = false;
    let mut current_loc: Option<String> = None;
    // quick-xml reports Eof without complaint inside open elements
    let mut depth = 0usize;

    loop {
        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| SitemapError::Malformed(e.to_string()))?;

        match event {
            Event::Start(e) => {
                depth += 1;
                let in_sitemap_ns = matches!(
                    ns,
                    ResolveResult::Bound(Namespace(ns)) if ns == SITEMAP_NAMESPACE.as_bytes()
                );
                if in_sitemap_ns {
                    match e.local_name().as_ref() {
                        b"urlset" => saw_urlset = true,
                        b"loc" if saw_urlset => current_loc = Some(String::new()),
                        _ => {}
                    }
                }
            }
            Event::Text(text) => {
                if let Some(loc) = current_loc.as_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| SitemapError::Malformed(e.to_string()))?;
                    loc.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(loc) = current_loc.as_mut() {
                    loc.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if e.local_name().as_ref() == b"loc" {
                    if let Some(loc) = current_loc.take() {
                        let loc = loc.trim();
                        if !loc.is_empty() {
                            locs.push(loc.to_string());
                        }
                    }
                }
            }
            Event::Eof if depth > 0 => {
                return Err(SitemapError::Malformed(format!(
                    "document ends with {} unclosed element(s)",
                    depth
                )));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_urlset {
        return Err(SitemapError::MissingUrlset);
    }

    Ok(locs)
}
