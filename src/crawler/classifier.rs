//! Resource classification
//!
//! Decides, without any I/O, whether a URL discovered on a page is worth
//! fetching. The checks run in a fixed order so that a social media link is
//! always reported as such, even when its extension would also be skipped.

use crate::config::FilterConfig;
use crate::url::{is_same_host, matches_domain};
use url::Url;

/// Extensions of documents that are crawled as pages rather than stored raw
const PAGE_EXTENSIONS: &[&str] = &[
    "html", "htm", "php", "asp", "aspx", "jsp", "shtml", "xhtml",
];

/// Outcome of classifying a discovered URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Download it and rewrite the reference to the local copy
    Fetch,
    /// Host is on the social media deny-list
    SkipSocial,
    /// Extension is on the skip list (fonts, icons)
    SkipAssetType,
    /// URL carries an analytics/tracking marker
    SkipTracking,
}

impl Classification {
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::SkipSocial => "social",
            Self::SkipAssetType => "asset-type",
            Self::SkipTracking => "tracking",
        }
    }
}

/// Classifies `candidate`, discovered on the page at `base`
///
/// # Rules (first match wins)
///
/// 1. Host on the social deny-list (and not the site being mirrored) → `SkipSocial`
/// 2. Path extension in the skip set → `SkipAssetType`
/// 3. URL contains a tracking marker → `SkipTracking`
/// 4. Otherwise → `Fetch`
pub fn classify(candidate: &Url, base: &Url, filters: &FilterConfig) -> Classification {
    if is_social(candidate, base, filters) {
        return Classification::SkipSocial;
    }

    if let Some(ext) = path_extension(candidate) {
        let skipped = filters
            .skip_extensions
            .iter()
            .any(|s| s.trim_start_matches('.').eq_ignore_ascii_case(&ext));
        if skipped {
            return Classification::SkipAssetType;
        }
    }

    let haystack = candidate.as_str().to_ascii_lowercase();
    if filters
        .tracking_markers
        .iter()
        .any(|marker| haystack.contains(&marker.to_ascii_lowercase()))
    {
        return Classification::SkipTracking;
    }

    Classification::Fetch
}

/// Returns true if `url` looks like an HTML document worth crawling
///
/// Paths without an extension (`/about`, `/blog/`) and paths with a server
/// page extension qualify; `/logo.png` or `/report.pdf` do not.
pub fn looks_like_page(url: &Url) -> bool {
    match path_extension(url) {
        None => true,
        Some(ext) => PAGE_EXTENSIONS.contains(&ext.as_str()),
    }
}

fn is_social(candidate: &Url, base: &Url, filters: &FilterConfig) -> bool {
    // Mirroring a social site itself must not skip its own pages.
    if is_same_host(candidate, base) {
        return false;
    }

    let Some(host) = candidate.host_str() else {
        return false;
    };

    filters
        .social_domains
        .iter()
        .any(|entry| matches_domain(entry, host))
}

/// Lowercase extension of the last path segment, if any
fn path_extension(url: &Url) -> Option<String> {
    let last = url.path_segments()?.last()?;
    let (stem, ext) = last.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
