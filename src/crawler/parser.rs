//! HTML parser for extracting link candidates and metadata
//!
//! This module handles parsing rendered HTML to extract:
//! - Every anchor, image, stylesheet, and script reference
//! - Page title

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Kind of tag a reference was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Anchor,
    Image,
    Stylesheet,
    Script,
}

impl TagKind {
    /// Attribute carrying the reference for this kind of tag
    pub fn attribute(&self) -> &'static str {
        match self {
            Self::Anchor | Self::Stylesheet => "href",
            Self::Image | Self::Script => "src",
        }
    }
}

/// A reference found on a page
#[derive(Debug, Clone)]
pub struct Candidate {
    pub kind: TagKind,
    /// Attribute value as written in the document (entities decoded)
    pub raw: String,
    /// `raw` resolved against the page URL
    pub url: Url,
}

/// What a page references, plus its title for logging
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// Whitespace-collapsed `<title>` text
    pub title: Option<String>,

    /// References in document order, grouped by tag kind
    pub candidates: Vec<Candidate>,
}

/// Parses HTML content and extracts link candidates and metadata
///
/// # Extraction Rules
///
/// **Include:**
/// - `<a href="...">`
/// - `<img src="...">`
/// - `<link rel="stylesheet" href="...">` and `<link rel="icon" href="...">`
/// - `<script src="...">`
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
/// - Anything that does not resolve to an http(s) URL
///
/// # Example
///
/// ```
/// use site_mirror::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.candidates.len(), 1);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document);

    let mut candidates = Vec::new();
    collect(&document, "a[href]", TagKind::Anchor, base_url, &mut candidates);
    collect(&document, "img[src]", TagKind::Image, base_url, &mut candidates);
    collect(&document, "link[href]", TagKind::Stylesheet, base_url, &mut candidates);
    collect(&document, "script[src]", TagKind::Script, base_url, &mut candidates);

    ParsedPage { title, candidates }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("head > title, title").ok()?;
    let title = document.select(&selector).next()?.text().collect::<String>();
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}

fn collect(
    document: &Html,
    selector: &str,
    kind: TagKind,
    base_url: &Url,
    out: &mut Vec<Candidate>,
) {
    let Ok(selector) = Selector::parse(selector) else {
        return;
    };

    for element in document.select(&selector) {
        if kind == TagKind::Stylesheet && !is_mirrored_link(&element) {
            continue;
        }

        if let Some(raw) = element.value().attr(kind.attribute()) {
            if let Some(url) = resolve_link(raw, base_url) {
                out.push(Candidate {
                    kind,
                    raw: raw.to_string(),
                    url,
                });
            }
        }
    }
}

/// `<link>` elements worth mirroring: stylesheets and icons
fn is_mirrored_link(element: &ElementRef) -> bool {
    element
        .value()
        .attr("rel")
        .map(|rel| {
            rel.split_ascii_whitespace().any(|token| {
                token.eq_ignore_ascii_case("stylesheet") || token.eq_ignore_ascii_case("icon")
            })
        })
        .unwrap_or(false)
}

/// Schemes that never point at something the mirror can store
const IGNORED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves `href` against the page it appears on
///
/// Gives `None` for same-page fragments (`#top`), pseudo-links
/// (`javascript:`, `mailto:`, `tel:`, `data:`), unparsable values, and
/// anything that does not end up http(s).
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let ignored = IGNORED_SCHEMES.iter().any(|scheme| {
        href.get(..scheme.len())
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case(scheme))
    });
    if ignored {
        return None;
    }

    base_url
        .join(href)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}
