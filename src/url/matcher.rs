/// Checks if a host falls under a deny-list domain entry
///
/// An entry covers the domain itself and every subdomain beneath it, so
/// `facebook.com` matches `facebook.com`, `www.facebook.com` and
/// `m.facebook.com`. A leading `*.` is accepted and means the same thing.
/// Matching is on whole labels: `facebook.com` never matches `notfacebook.com`.
///
/// Both arguments are compared case-insensitively.
///
/// # Examples
///
/// ```
/// use site_mirror::url::matches_domain;
///
/// assert!(matches_domain("facebook.com", "www.facebook.com"));
/// assert!(matches_domain("*.twitter.com", "twitter.com"));
/// assert!(!matches_domain("x.com", "box.com"));
/// ```
pub fn matches_domain(entry: &str, host: &str) -> bool {
    let base = entry.strip_prefix("*.").unwrap_or(entry).to_lowercase();
    let host = host.to_lowercase();

    if base.is_empty() || host.is_empty() {
        return false;
    }

    host == base
        || host
            .strip_suffix(base.as_str())
            .map_or(false, |prefix| prefix.ends_with('.'))
}
