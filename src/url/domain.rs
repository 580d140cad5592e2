use url::Url;

/// Extracts the lowercase host from a URL
///
/// Returns `None` for URLs without a host, which never happens for valid
/// http(s) URLs.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_mirror::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if both URLs point at the same host
///
/// Scheme and port are ignored: `http://example.com` and
/// `https://example.com:8443` belong to the same mirror.
pub fn is_same_host(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(ha), Some(hb)) => ha == hb,
        _ => false,
    }
}
