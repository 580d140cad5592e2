//! Page processing
//!
//! Turns one rendered page into:
//! - the rewritten HTML, with fetchable references pointing at local copies
//! - the resources to download
//! - the same-site pages to crawl next
//!
//! No I/O happens here; the output depends only on the inputs.

use crate::config::FilterConfig;
use crate::crawler::classifier::{classify, looks_like_page, Classification};
use crate::crawler::parser::{parse_html, TagKind};
use crate::crawler::paths::{map_path, mirror_key, relative_link};
use crate::crawler::rewriter::rewrite_links;
use crate::url::is_same_host;
use crate::MirrorError;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use url::Url;

/// A resource discovered on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUrl {
    /// Absolute URL without fragment
    pub url: Url,
    pub kind: TagKind,
}

/// Result of processing one page
#[derive(Debug, Clone)]
pub struct ProcessedPage {
    pub title: Option<String>,
    /// Page HTML with rewritten references
    pub html: String,
    /// Fetch-classified references, one per local file, in document order
    pub resources: Vec<ResourceUrl>,
    /// Same-host page links, deduplicated, in document order
    pub internal_links: Vec<Url>,
}

/// Processes the rendered HTML of `page_url`
///
/// # Arguments
///
/// * `page_url` - URL the HTML was rendered from
/// * `html` - Rendered HTML
/// * `base_host` - Host directory of the mirror
/// * `output_root` - Root directory of all mirrors
/// * `filters` - Deny-lists for the classifier
///
/// Anchors to other hosts are never rewritten or fetched: they stay links to
/// the live site. Same-host anchors that look like pages are reported as
/// internal links whatever their classification.
pub fn process_page(
    page_url: &Url,
    html: &str,
    base_host: &str,
    output_root: &Path,
    filters: &FilterConfig,
) -> Result<ProcessedPage, MirrorError> {
    let parsed = parse_html(html, page_url);
    let page_path = map_path(base_host, page_url, output_root);

    let mut plan: HashMap<String, String> = HashMap::new();
    let mut resources = Vec::new();
    let mut seen_resources = HashSet::new();
    let mut internal_links = Vec::new();
    let mut seen_links = HashSet::new();

    for candidate in parsed.candidates {
        let same_host = is_same_host(&candidate.url, page_url);

        if candidate.kind == TagKind::Anchor {
            if same_host && looks_like_page(&candidate.url) {
                let mut link = candidate.url.clone();
                link.set_fragment(None);
                if seen_links.insert(mirror_key(base_host, &link)) {
                    internal_links.push(link);
                }
            }

            if !same_host {
                tracing::debug!("Leaving external link {} as is", candidate.url);
                continue;
            }
        }

        let classification = classify(&candidate.url, page_url, filters);
        if classification != Classification::Fetch {
            tracing::debug!(
                "Skipping {} ({})",
                candidate.url,
                classification.as_str()
            );
            continue;
        }

        let target = map_path(base_host, &candidate.url, output_root);
        let href = relative_link(&page_path, &target, candidate.url.fragment());
        plan.insert(candidate.raw, href);

        let mut url = candidate.url;
        url.set_fragment(None);
        if seen_resources.insert(mirror_key(base_host, &url)) {
            resources.push(ResourceUrl {
                url,
                kind: candidate.kind,
            });
        }
    }

    let html = rewrite_links(html, &plan).map_err(|e| MirrorError::Rewrite {
        url: page_url.to_string(),
        message: e.to_string(),
    })?;

    Ok(ProcessedPage {
        title: parsed.title,
        html,
        resources,
        internal_links,
    })
}
