use crate::UrlError;
use url::Url;

/// Parses `input` as an absolute http(s) URL with a host
///
/// This is the gate every operator-supplied or sitemap-listed URL passes
/// before the crawl sees it. The URL is returned as parsed: query and
/// fragment are kept, since the server may need them to render the page.
/// Identity within a mirror is decided later, by the local path it maps to.
///
/// # Examples
///
/// ```
/// use site_mirror::url::parse_http_url;
///
/// let url = parse_http_url("  https://EXAMPLE.COM/page?ref=nav ").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page?ref=nav");
/// assert!(parse_http_url("ftp://example.com/file").is_err());
/// ```
pub fn parse_http_url(input: &str) -> Result<Url, UrlError> {
    let url = Url::parse(input.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::InvalidScheme(other.to_string())),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(parse_http_url("http://example.com").is_ok());
        assert!(parse_http_url("https://example.com:8443/a?b=c#d").is_ok());
    }

    #[test]
    fn test_query_and_fragment_kept() {
        let url = parse_http_url("https://example.com/list?page=2#results").unwrap();
        assert_eq!(url.query(), Some("page=2"));
        assert_eq!(url.fragment(), Some("results"));
    }

    #[test]
    fn test_host_is_folded() {
        let url = parse_http_url("https://Example.COM/About").unwrap();
        assert_eq!(url.as_str(), "https://example.com/About");
    }

    #[test]
    fn test_rejects_non_http() {
        assert!(matches!(
            parse_http_url("mailto:someone@example.com"),
            Err(UrlError::InvalidScheme(scheme)) if scheme == "mailto"
        ));
        assert!(matches!(
            parse_http_url("file:///etc/passwd"),
            Err(UrlError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(parse_http_url("not a url"), Err(UrlError::Parse(_))));
        assert!(matches!(parse_http_url(""), Err(UrlError::Parse(_))));
    }
}
