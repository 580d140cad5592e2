use serde::Deserialize;

/// Tuning configuration for site-mirror
///
/// Every table is optional; a missing file or table yields the defaults the
/// mirroring engine is specified with.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub downloader: DownloaderConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub filters: FilterConfig,
}

/// Resource download behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// Maximum number of resource fetches in flight at once
    #[serde(rename = "max-concurrent-downloads")]
    pub max_concurrent_downloads: u32,

    /// Attempts per resource, including the first one
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Base of the exponential backoff (delay = unit * base^attempt)
    #[serde(rename = "backoff-base")]
    pub backoff_base: u32,

    /// Length of one backoff unit (milliseconds)
    #[serde(rename = "backoff-unit-ms")]
    pub backoff_unit_ms: u64,

    /// Per-attempt request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: 10,
            max_attempts: 3,
            backoff_base: 2,
            backoff_unit_ms: 1000,
            request_timeout_secs: 30,
        }
    }
}

/// Page crawl behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// How many times a whole page is rendered and processed before it is
    /// marked failed
    #[serde(rename = "page-attempts")]
    pub page_attempts: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self { page_attempts: 3 }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the user agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SiteMirror".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/site-mirror/site-mirror".to_string(),
            contact_email: "mirror@example.com".to_string(),
        }
    }
}

/// Static deny-lists used by the resource classifier
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Social media domains; subdomains match as well
    #[serde(rename = "social-domains")]
    pub social_domains: Vec<String>,

    /// File extensions that are never fetched (fonts, icons)
    #[serde(rename = "skip-extensions")]
    pub skip_extensions: Vec<String>,

    /// Substrings that mark analytics/tracking URLs
    #[serde(rename = "tracking-markers")]
    pub tracking_markers: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();

        Self {
            social_domains: owned(&[
                "facebook.com",
                "twitter.com",
                "x.com",
                "instagram.com",
                "linkedin.com",
                "youtube.com",
                "pinterest.com",
                "tiktok.com",
                "reddit.com",
            ]),
            skip_extensions: owned(&["woff", "woff2", "ttf", "otf", "eot", "svg", "ico"]),
            tracking_markers: owned(&[
                "google-analytics",
                "googletagmanager",
                "gtag/js",
                "analytics.js",
                "doubleclick.net",
                "connect.facebook.net",
                "hotjar",
            ]),
        }
    }
}
